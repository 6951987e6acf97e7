//! Full harvest runs against a small fixture catalog site

use catalog_harvest::bootstrap::{BootstrapFailure, BootstrapState};
use catalog_harvest::config::{parse_config, Config};
use catalog_harvest::orchestrator::DispatchMode;
use catalog_harvest::output::ExportError;
use catalog_harvest::session::FixtureSession;
use catalog_harvest::{HarvestError, Orchestrator};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;

const BASE: &str = "https://shop.example.com/";
const DASHBOARD: &str = "https://shop.example.com/app/dashboard";
const MEAT_LIST: &str = "https://shop.example.com/app/catalog/meat";

fn detail_url(n: u32) -> String {
    format!("https://shop.example.com/app/product-details/opco/{}", n)
}

fn create_test_config(
    categories: &[&str],
    max_products: usize,
    parallel: bool,
    out: &Path,
) -> Config {
    let categories = categories
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    parse_config(&format!(
        r#"
[site]
base-url = "{}"
location-code = "97035"

[scrape]
categories = [{}]
max-products = {}
throttle-ms = 100
page-load-timeout-ms = 5000
element-timeout-ms = 1000
parallel = {}
batch-size = 3

[output]
directory = "{}"
file-name = "products.csv"
"#,
        BASE,
        categories,
        max_products,
        parallel,
        out.display()
    ))
    .expect("test config should be valid")
}

/// Site header with the products menu; only "Meat" leads anywhere
fn header() -> String {
    format!(
        r#"<div class="nav-link">Products</div>
        <div class="products-menu-item" data-fixture-goto="{}">Meat</div>
        <div class="products-menu-item">Produce</div>"#,
        MEAT_LIST
    )
}

fn landing(with_guest_entry: bool) -> String {
    let guest = if with_guest_entry {
        r#"<button data-id="btn_login_continue_as_guest">Continue as Guest</button>"#
    } else {
        ""
    };
    format!(
        r#"<html><body>{}{}
        <div class="initial-zipcode-modal-input"><input type="text"></div>
        <button data-id="initial_zipcode_modal_start_shopping_button" data-fixture-goto="{}">Start Shopping</button>
        </body></html>"#,
        header(),
        guest,
        DASHBOARD
    )
}

fn listing() -> String {
    let links: String = (1..=3)
        .map(|n| {
            format!(
                r#"<a class="product-card-link" href="/app/product-details/opco/{}">Item {}</a>
                <a class="product-card-link" href="/app/product-details/opco/{}">Item {}</a>"#,
                n, n, n, n
            )
        })
        .collect();
    format!("<html><body>{}{}</body></html>", header(), links)
}

fn detail(n: u32) -> String {
    format!(
        r#"<html><body>
        <h1 data-id="product-name">Beef Cut {}</h1>
        <button data-id="product_brand_link">Sysco Classic</button>
        <div class="selectable-supc-label"><span>10{}</span></div>
        <span class="price-current">$1{}9.99 / case</span>
        <div data-id="product_description_text">Tender beef.</div>
        </body></html>"#,
        n, n, n
    )
}

fn empty_detail() -> String {
    "<html><body><p>Temporarily unavailable</p></body></html>".to_string()
}

fn fixture_site(with_guest_entry: bool, third_detail: String) -> FixtureSession {
    FixtureSession::builder()
        .page(BASE, landing(with_guest_entry))
        .page(DASHBOARD, format!("<html><body>{}</body></html>", header()))
        .page(MEAT_LIST, listing())
        .page(detail_url(1), detail(1))
        .page(detail_url(2), detail(2))
        .page(detail_url(3), third_detail)
        .build()
}

fn read_rows(path: &Path) -> Vec<csv::StringRecord> {
    csv::Reader::from_path(path)
        .expect("CSV should exist")
        .records()
        .map(|r| r.expect("CSV row should parse"))
        .collect()
}

#[tokio::test(start_paused = true)]
async fn test_limited_run_skips_unavailable_category() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&["Meat", "Frozen"], 2, false, dir.path());
    let session = fixture_site(true, detail(3));

    let orchestrator = Orchestrator::new(config, None);
    let report = orchestrator
        .run_with_session(&session, Duration::ZERO)
        .await
        .expect("run should succeed");

    assert_eq!(report.bootstrap, BootstrapState::Ready);
    assert_eq!(report.mode, DispatchMode::Sequential);
    assert_eq!(report.statistics.categories_requested, 2);
    assert_eq!(report.statistics.categories_collected, 1);
    assert_eq!(report.statistics.urls_discovered, 3);
    assert_eq!(report.statistics.items_dispatched, 2);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].url, detail_url(1));
    assert_eq!(report.records[0].category, "Meat");
    assert_eq!(report.records[1].price, "$129.99");

    let rows = read_rows(&report.output_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][1], "Beef Cut 1");
    assert_eq!(&rows[0][0], "Sysco Classic");
    assert_eq!(&rows[0][5], "PRODUCT: Tender beef.");
    assert_eq!(&rows[1][8], detail_url(2));

    // The third product was never visited
    assert!(!session.navigations().contains(&detail_url(3)));
}

#[tokio::test(start_paused = true)]
async fn test_empty_detail_page_is_not_exported() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&["Meat"], 0, false, dir.path());
    let session = fixture_site(true, empty_detail());

    let report = Orchestrator::new(config, None)
        .run_with_session(&session, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(report.statistics.items_dispatched, 3);
    assert_eq!(report.statistics.records_valid, 2);
    assert_eq!(report.statistics.records_written, 2);

    let rows = read_rows(&report.output_path);
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|row| &row[8] != detail_url(3).as_str()));
}

#[tokio::test(start_paused = true)]
async fn test_parallel_run_uses_one_tab_per_item() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&["Meat"], 0, true, dir.path());
    let session = fixture_site(true, detail(3));

    let report = Orchestrator::new(config, None)
        .run_with_session(&session, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(report.mode, DispatchMode::Parallel);
    assert_eq!(session.tabs_opened(), 3);

    let mut urls: Vec<&str> = report.records.iter().map(|r| r.url.as_str()).collect();
    urls.sort();
    assert_eq!(urls, vec![detail_url(1), detail_url(2), detail_url(3)]);
}

#[tokio::test(start_paused = true)]
async fn test_failed_bootstrap_does_not_stop_run() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&["Meat"], 1, false, dir.path());
    let session = fixture_site(false, detail(3));

    let report = Orchestrator::new(config, None)
        .run_with_session(&session, Duration::ZERO)
        .await
        .unwrap();

    assert_eq!(
        report.bootstrap,
        BootstrapState::Failed(BootstrapFailure::GuestEntryNotFound)
    );
    assert_eq!(report.records.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_no_product_urls_fails_before_dispatch() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&["Frozen", "Produce"], 0, false, dir.path());
    let session = fixture_site(true, detail(3));

    let result = Orchestrator::new(config.clone(), None)
        .run_with_session(&session, Duration::ZERO)
        .await;

    assert!(matches!(result, Err(HarvestError::NoProductUrls)));
    assert!(!config.output.path().exists());
    assert!(!session
        .navigations()
        .iter()
        .any(|url| url.contains("/product-details/")));
}

#[tokio::test(start_paused = true)]
async fn test_no_valid_records_fails_export() {
    let dir = TempDir::new().unwrap();
    let config = create_test_config(&["Meat"], 0, false, dir.path());
    let session = FixtureSession::builder()
        .page(BASE, landing(true))
        .page(DASHBOARD, format!("<html><body>{}</body></html>", header()))
        .page(MEAT_LIST, listing())
        .page(detail_url(1), empty_detail())
        .build();

    let result = Orchestrator::new(config.clone(), None)
        .run_with_session(&session, Duration::ZERO)
        .await;

    assert!(matches!(
        result,
        Err(HarvestError::Export(ExportError::NoValidRecords))
    ));
    assert!(!config.output.path().exists());
}
