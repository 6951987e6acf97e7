//! Configuration loading from files on disk

use catalog_harvest::config::{compute_config_hash, load_config, load_config_with_hash};
use catalog_harvest::ConfigError;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_bundled_config_is_valid() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("harvest.toml");
    let config = load_config(&path).expect("bundled harvest.toml should load");

    assert_eq!(config.scrape.categories.len(), 3);
    assert_eq!(config.scrape.product_limit(), Some(10));
    assert!(config.browser.headless);
    assert!(config.browser.block_resources);
}

#[test]
fn test_hash_follows_file_content() {
    let base = r#"
[site]
base-url = "https://shop.example.com"
location-code = "97035"

[scrape]
categories = ["Dairy & Eggs"]

[output]
directory = "out"
file-name = "products.csv"
"#;
    let first = write_config(base);
    let same = write_config(base);
    let changed = write_config(&base.replace("97035", "10001"));

    let (_, hash) = load_config_with_hash(first.path()).unwrap();
    assert_eq!(hash.len(), 64);
    assert_eq!(hash, compute_config_hash(same.path()).unwrap());
    assert_ne!(hash, compute_config_hash(changed.path()).unwrap());
}

#[test]
fn test_invalid_file_is_rejected() {
    let file = write_config(
        r#"
[site]
base-url = "ftp://shop.example.com"
location-code = "97035"

[scrape]
categories = ["Dairy & Eggs"]

[output]
directory = "out"
file-name = "products.csv"
"#,
    );
    assert!(matches!(
        load_config(file.path()),
        Err(ConfigError::InvalidUrl(_))
    ));

    assert!(matches!(
        load_config(Path::new("/nonexistent/harvest.toml")),
        Err(ConfigError::Io(_))
    ));
}
