//! Run statistics and the end-of-run performance summary
//!
//! This module records how long each phase of a run took and how many items
//! flowed through it, and prints the summary shown when a run finishes.

use std::fmt;
use std::time::Duration;

/// Timed phases of a harvest run, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    BrowserStartup,
    SessionSetup,
    UrlCollection,
    ProductScraping,
    Export,
}

impl Phase {
    pub const ALL: [Phase; 5] = [
        Self::BrowserStartup,
        Self::SessionSetup,
        Self::UrlCollection,
        Self::ProductScraping,
        Self::Export,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::BrowserStartup => "Browser startup",
            Self::SessionSetup => "Session setup",
            Self::UrlCollection => "URL collection",
            Self::ProductScraping => "Product scraping",
            Self::Export => "Data export",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Wall-clock time spent per phase
#[derive(Debug, Clone, Default)]
pub struct PhaseTimings {
    entries: Vec<(Phase, Duration)>,
}

impl PhaseTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `elapsed` to `phase`
    pub fn record(&mut self, phase: Phase, elapsed: Duration) {
        match self.entries.iter_mut().find(|(p, _)| *p == phase) {
            Some((_, total)) => *total += elapsed,
            None => self.entries.push((phase, elapsed)),
        }
        tracing::info!("{}: {:.2}s", phase, elapsed.as_secs_f64());
    }

    /// Time recorded for `phase` (zero if it never ran)
    pub fn get(&self, phase: Phase) -> Duration {
        self.entries
            .iter()
            .find(|(p, _)| *p == phase)
            .map(|(_, d)| *d)
            .unwrap_or_default()
    }

    /// Sum of all recorded phases
    pub fn total(&self) -> Duration {
        self.entries.iter().map(|(_, d)| *d).sum()
    }
}

/// Counters and timings for one run
#[derive(Debug, Clone, Default)]
pub struct RunStatistics {
    /// Categories listed in the configuration
    pub categories_requested: usize,

    /// Categories that yielded at least one product URL
    pub categories_collected: usize,

    /// Unique product URLs across all categories
    pub urls_discovered: usize,

    /// Work items dispatched after truncation
    pub items_dispatched: usize,

    /// Valid records produced by extraction
    pub records_valid: usize,

    /// Rows written by the export sink
    pub records_written: usize,

    pub timings: PhaseTimings,

    /// Wall-clock time of the whole run
    pub total_elapsed: Duration,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Share of the total run time spent in `phase`, in percent
    pub fn phase_percentage(&self, phase: Phase) -> f64 {
        percentage(self.timings.get(phase), self.total_elapsed)
    }

    /// Mean scraping time per valid record, if any were produced
    pub fn average_per_product(&self) -> Option<Duration> {
        if self.records_valid == 0 {
            return None;
        }
        Some(self.timings.get(Phase::ProductScraping) / self.records_valid as u32)
    }

    /// Valid records per minute of scraping time
    pub fn products_per_minute(&self) -> Option<f64> {
        let average = self.average_per_product()?.as_secs_f64();
        if average <= 0.0 {
            return None;
        }
        Some(60.0 / average)
    }
}

fn percentage(part: Duration, total: Duration) -> f64 {
    if total.is_zero() {
        return 0.0;
    }
    part.as_secs_f64() / total.as_secs_f64() * 100.0
}

/// Prints the performance summary to stdout
///
/// # Arguments
///
/// * `stats` - Statistics of the finished run
pub fn print_statistics(stats: &RunStatistics) {
    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("Harvest Performance Summary");
    println!("{}\n", rule);

    let total = stats.total_elapsed.as_secs_f64();
    println!(
        "Total time: {:.2} seconds ({:.1} minutes)",
        total,
        total / 60.0
    );
    for phase in Phase::ALL {
        println!(
            "  {}: {:.2}s ({:.1}%)",
            phase,
            stats.timings.get(phase).as_secs_f64(),
            stats.phase_percentage(phase)
        );
    }
    println!();

    println!("Overview:");
    println!(
        "  Categories with products: {}/{}",
        stats.categories_collected, stats.categories_requested
    );
    println!("  Product URLs discovered: {}", stats.urls_discovered);
    println!("  Products scraped: {}", stats.items_dispatched);
    println!("  Valid products: {}", stats.records_valid);
    println!("  Rows exported: {}", stats.records_written);

    if let (Some(average), Some(per_minute)) =
        (stats.average_per_product(), stats.products_per_minute())
    {
        println!();
        println!("  Average time per product: {:.2}s", average.as_secs_f64());
        println!("  Products per minute: {:.1}", per_minute);
    }

    println!("{}", rule);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_accumulates() {
        let mut timings = PhaseTimings::new();
        timings.record(Phase::UrlCollection, Duration::from_secs(3));
        timings.record(Phase::UrlCollection, Duration::from_secs(2));
        timings.record(Phase::Export, Duration::from_millis(500));

        assert_eq!(timings.get(Phase::UrlCollection), Duration::from_secs(5));
        assert_eq!(timings.get(Phase::SessionSetup), Duration::ZERO);
        assert_eq!(timings.total(), Duration::from_millis(5500));
    }

    #[test]
    fn test_phase_percentage() {
        let mut stats = RunStatistics::new();
        stats.timings.record(Phase::ProductScraping, Duration::from_secs(30));
        stats.total_elapsed = Duration::from_secs(120);

        assert!((stats.phase_percentage(Phase::ProductScraping) - 25.0).abs() < 1e-9);
        assert_eq!(stats.phase_percentage(Phase::Export), 0.0);
    }

    #[test]
    fn test_percentage_of_zero_total() {
        let stats = RunStatistics::new();
        assert_eq!(stats.phase_percentage(Phase::BrowserStartup), 0.0);
    }

    #[test]
    fn test_throughput() {
        let mut stats = RunStatistics::new();
        assert!(stats.average_per_product().is_none());
        assert!(stats.products_per_minute().is_none());

        stats.timings.record(Phase::ProductScraping, Duration::from_secs(40));
        stats.records_valid = 4;
        assert_eq!(stats.average_per_product(), Some(Duration::from_secs(10)));
        assert!((stats.products_per_minute().unwrap() - 6.0).abs() < 1e-9);
    }
}
