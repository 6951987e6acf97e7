//! End-to-end tests for Catalog-Harvest
//!
//! These tests run the full harvest flow against `FixtureSession`, a browser
//! double serving static HTML, so no real browser is needed.

mod config_tests;
mod harvest_tests;
