//! Site selector chains
//!
//! Candidate locators for every logical element the harvester touches, most
//! specific first. The site ships several markup generations at once, so each
//! chain covers `data-id` hooks, class names and generic fallbacks.

use super::Locator;

// Session bootstrap

pub static GUEST_BUTTON: &[Locator] = &[
    Locator::present("button[data-id=\"btn_login_continue_as_guest\"]"),
    Locator::present("button").containing("Continue as Guest"),
    Locator::present(".btn-secondary").containing("Continue as Guest"),
    Locator::present("[data-id=\"btn_login_continue_as_guest\"]"),
];

pub static LOCATION_INPUT: &[Locator] = &[
    Locator::present("input[data-id=\"initial_zipcode_modal_input\"]"),
    Locator::present(".initial-zipcode-modal-input input"),
    Locator::present(".input-lg input[type=\"text\"]"),
    Locator::present("input[aria-labelledby*=\"foundation-text-input\"]"),
];

pub static LOCATION_CONFIRM: &[Locator] = &[
    Locator::present("button[data-id=\"initial_zipcode_modal_start_shopping_button\"]"),
    Locator::present("button").containing("Start Shopping"),
    Locator::present(".initial-zipcode-modal-button"),
    Locator::present(".btn-primary").containing("Start Shopping"),
    Locator::present("button.btn-primary[type=\"primary\"]"),
];

// Category navigation

pub static PRODUCTS_MENU: &[Locator] = &[
    Locator::present("div.nav-link.active").containing("Products"),
    Locator::present("div.nav-link").containing("Products"),
    Locator::present(".nav-link").containing("Products"),
];

/// Menu entries; the category name is matched at runtime
pub static MENU_ITEM: &[Locator] = &[
    Locator::present("div.products-menu-item"),
    Locator::present(".products-menu-item"),
    Locator::present("[class*=\"menu-item\"]"),
    Locator::present("div"),
];

/// Entries listed when a category cannot be found
pub static MENU_LISTING: &[Locator] = &[
    Locator::text("div.products-menu-item"),
    Locator::text(".products-menu-item"),
    Locator::text("[class*=\"menu-item\"]"),
    Locator::text(".dropdown-menu div"),
    Locator::text(".nav-dropdown div"),
];

// Listing pages

/// Every locator contributes; see [`super::Resolver::resolve_union`]
pub static PRODUCT_LINK: &[Locator] = &[
    Locator::attr("a.product-card-link", "href"),
    Locator::attr("a[href*=\"/app/product-details/\"]", "href"),
    Locator::attr("a[class*=\"product-card\"]", "href"),
    Locator::attr("a[href*=\"/product/\"]", "href"),
    Locator::attr("a[href*=\"/item/\"]", "href"),
    Locator::attr("a[href*=\"/detail/\"]", "href"),
    Locator::attr(".product-link", "href"),
    Locator::attr("[class*=\"product\"] a", "href"),
    Locator::attr("[class*=\"item\"] a", "href"),
    Locator::attr(".product-card a", "href"),
    Locator::attr("a[data-product-id]", "href"),
    Locator::attr("article a", "href"),
    Locator::attr(".grid-item a", "href"),
    Locator::attr(".tile a", "href"),
];

pub static NEXT_PAGE: &[Locator] = &[
    Locator::present("a").containing("Next"),
    Locator::present("a[aria-label=\"Next\"]"),
    Locator::present(".pagination .next"),
    Locator::present(".pager .next"),
    Locator::present("button").containing("Next"),
];

// Product detail

pub static BRAND: &[Locator] = &[
    Locator::text(".brand"),
    Locator::text("div.brand"),
    Locator::text("button[data-id=\"product_brand_link\"]"),
    Locator::text(".product-brand"),
    Locator::text("[class*=\"brand\"]"),
];

pub static NAME: &[Locator] = &[
    Locator::text(".product-name"),
    Locator::text("div.product-name"),
    Locator::text("h1[data-id=\"product-name\"]"),
    Locator::text("h1.product-name"),
    Locator::text("h1"),
    Locator::text(".product-title h1"),
    Locator::text("[class*=\"product-name\"]"),
];

pub static PACKAGING: &[Locator] = &[Locator::text("div[data-id=\"pack_size\"]")];

pub static SKU: &[Locator] = &[
    Locator::text(".selectable-supc-label span"),
    Locator::text("div[data-id*=\"selectable-supc-label\"] span"),
    Locator::text("div[data-id=\"product_id\"]"),
    Locator::text(".product-id"),
    Locator::text(".sku"),
    Locator::text("[class*=\"supc-label\"] span"),
    Locator::text("[data-id*=\"product\"] span"),
];

pub static IMAGE: &[Locator] = &[
    Locator::attr(".product-card-image-v2 img", "src"),
    Locator::attr("div[data-id*=\"product_card_image\"] img", "src"),
    Locator::attr("img[data-id=\"main-product-img-v2\"]", "src"),
    Locator::attr(".product-image img", "src"),
    Locator::attr(".product-card img", "src"),
    Locator::attr("img[alt*=\"product\"]", "src"),
    Locator::attr(".row.product-image img", "src"),
];

pub static PRICE: &[Locator] = &[
    Locator::text(".price-current"),
    Locator::text(".product-price"),
    Locator::text(".price"),
    Locator::text("[data-id=\"product-price\"]"),
    Locator::text(".cost"),
    Locator::text(".pricing"),
    Locator::text("[class*=\"price\"]"),
    Locator::text(".price-wrapper"),
    Locator::text(".price-display"),
];

pub static READ_MORE: &[Locator] =
    &[Locator::present("button[data-id=\"ellipsis-read-more-button\"]")];

pub static DESCRIPTION_EXPANDED: &[Locator] = &[Locator::text(".description-detail-wrapper")];

pub static DESCRIPTION: &[Locator] = &[Locator::text("div[data-id=\"product_description_text\"]")];
