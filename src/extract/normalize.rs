//! Text normalization for extracted fields
//!
//! Every function here is total: any input string (including the empty string)
//! produces an output string, never an error.

use regex::Regex;
use std::sync::OnceLock;

/// Maximum characters kept per description section
pub const SECTION_LIMIT: usize = 200;

/// Description sections, in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Product,
    Specifications,
    Features,
    CookingInstructions,
}

impl Section {
    pub const ORDER: [Section; 4] = [
        Self::Product,
        Self::Specifications,
        Self::Features,
        Self::CookingInstructions,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Product => "PRODUCT",
            Self::Specifications => "SPECIFICATIONS",
            Self::Features => "FEATURES",
            Self::CookingInstructions => "COOKING INSTRUCTIONS",
        }
    }

    fn index(&self) -> usize {
        match self {
            Self::Product => 0,
            Self::Specifications => 1,
            Self::Features => 2,
            Self::CookingInstructions => 3,
        }
    }

    /// Classifies a sentence; cooking beats specifications beats features
    pub fn classify(sentence: &str) -> Self {
        let lower = sentence.to_lowercase();
        let mentions = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if mentions(COOKING_KEYWORDS) {
            Self::CookingInstructions
        } else if mentions(SPECIFICATION_KEYWORDS) {
            Self::Specifications
        } else if mentions(FEATURE_KEYWORDS) {
            Self::Features
        } else {
            Self::Product
        }
    }
}

const COOKING_KEYWORDS: &[&str] = &[
    "cook",
    "bake",
    "fry",
    "grill",
    "heat",
    "temperature",
    "oven",
    "microwave",
    "preparation",
    "serve",
];

const SPECIFICATION_KEYWORDS: &[&str] = &[
    "weight",
    "size",
    "count",
    "piece",
    "lb",
    "oz",
    "gram",
    "dimension",
    "pack",
    "case",
    "unit",
];

const FEATURE_KEYWORDS: &[&str] = &[
    "feature", "benefit", "quality", "fresh", "premium", "natural", "organic", "grade", "cut",
    "style",
];

fn regex(cell: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(pattern).unwrap_or_else(|e| panic!("bad pattern {}: {}", pattern, e))
    })
}

fn whitespace() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\s+")
}

fn disallowed_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"[^\w\s\-.,!?()&/$€£¥°À-ÖØ-öø-ÿ]")
}

fn price_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    regex(&RE, r"\$-?[\d,]+\.?\d*")
}

/// Collapses whitespace runs to one space and trims
pub fn collapse_whitespace(text: &str) -> String {
    whitespace().replace_all(text.trim(), " ").into_owned()
}

/// General cleanup for short text fields (brand, name, packaging, sku, price)
///
/// Trims, collapses whitespace and drops characters outside word characters,
/// whitespace, common punctuation, currency symbols and Latin-1 letters.
pub fn clean_text_field(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let collapsed = collapse_whitespace(text);
    disallowed_chars().replace_all(&collapsed, "").into_owned()
}

/// Reduces a price string to its first `$` amount
///
/// # Examples
///
/// ```
/// use catalog_harvest::extract::normalize::clean_price;
///
/// assert_eq!(clean_price("  $1,234.56 each  "), "$1,234.56");
/// assert_eq!(clean_price("Call for price"), "Call for price");
/// ```
pub fn clean_price(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let collapsed = collapse_whitespace(text);
    match price_pattern().find(&collapsed) {
        Some(m) => m.as_str().to_string(),
        None => collapsed,
    }
}

/// Normalizes raw description text before sectioning
fn clean_description_text(text: &str) -> String {
    static BULLETS: OnceLock<Regex> = OnceLock::new();
    static DOTS: OnceLock<Regex> = OnceLock::new();
    static DASHES: OnceLock<Regex> = OnceLock::new();
    static SPACE_BEFORE: OnceLock<Regex> = OnceLock::new();
    static SPACE_AFTER: OnceLock<Regex> = OnceLock::new();

    let text = whitespace().replace_all(text, " ");
    let text = regex(&BULLETS, r"[•·▪▫◦‣⁃]\s*").replace_all(&text, "");
    let text = regex(&DOTS, r"\.{2,}").replace_all(&text, ".");
    let text = regex(&DASHES, r"-{2,}").replace_all(&text, "-");
    let text = regex(&SPACE_BEFORE, r"\s+([,.!?;:])").replace_all(&text, "$1");
    let text = regex(&SPACE_AFTER, r"([,.!?;:])\s+").replace_all(&text, "$1 ");
    text.trim().to_string()
}

/// Splits text into trimmed, non-empty sentences on runs of `.`, `!` or `?`
fn sentences(text: &str) -> Vec<&str> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Structures a raw description into labeled sections
///
/// Sentences are bucketed by keyword into PRODUCT, SPECIFICATIONS, FEATURES and
/// COOKING INSTRUCTIONS; non-empty buckets are emitted in that order as
/// `LABEL: content`, joined with `" | "`, each limited to [`SECTION_LIMIT`]
/// characters.
///
/// # Examples
///
/// ```
/// use catalog_harvest::extract::normalize::format_description;
///
/// let out = format_description("Tender beef. 10 lb case. Grill before serving.");
/// assert_eq!(
///     out,
///     "PRODUCT: Tender beef. | SPECIFICATIONS: 10 lb case. | COOKING INSTRUCTIONS: Grill before serving."
/// );
/// ```
pub fn format_description(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let cleaned = clean_description_text(raw);

    let mut buckets: [String; 4] = Default::default();
    for sentence in sentences(&cleaned) {
        let bucket = &mut buckets[Section::classify(sentence).index()];
        bucket.push_str(sentence);
        bucket.push_str(". ");
    }

    let parts: Vec<String> = Section::ORDER
        .iter()
        .filter_map(|section| {
            let content = buckets[section.index()].trim();
            (!content.is_empty()).then(|| {
                format!(
                    "{}: {}",
                    section.label(),
                    limit_section_length(content, SECTION_LIMIT)
                )
            })
        })
        .collect();

    if parts.is_empty() {
        buckets[Section::Product.index()].trim().to_string()
    } else {
        parts.join(" | ")
    }
}

/// Truncates `text` to at most `max` characters, preferring a sentence boundary
///
/// If the text fits it is returned unchanged. Otherwise the first `max`
/// characters are kept; when the last `.` among them sits beyond 70% of `max`
/// the text is cut just after it, else the cut is right-trimmed and `...`
/// appended. The result never exceeds `max + 3` characters.
pub fn limit_section_length(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }

    let truncated: String = text.chars().take(max).collect();
    let last_period = truncated.chars().rev().position(|c| c == '.').map(|from_end| {
        // Character index of the period within `truncated`
        max - 1 - from_end
    });

    match last_period {
        Some(index) if index as f64 > max as f64 * 0.7 => text.chars().take(index + 1).collect(),
        _ => format!("{}...", truncated.trim_end()),
    }
}
