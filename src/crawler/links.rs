//! Product link filtering and resolution

use url::Url;

/// Path fragments that mark a product detail page
pub const DETAIL_PATH_MARKERS: &[&str] = &[
    "/product/",
    "/item/",
    "/detail/",
    "/p/",
    "/app/product-details/",
];

/// Resolves an `href` against the site root
///
/// Skips empty, fragment-only and non-navigational links (`javascript:`,
/// `mailto:`, `tel:`, `data:`). Only HTTP(S) results are returned, without a
/// fragment.
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    absolute.set_fragment(None);
    Some(absolute)
}

/// Returns true if the URL path looks like a product detail page
pub fn is_detail_path(url: &Url) -> bool {
    let path = url.path();
    DETAIL_PATH_MARKERS.iter().any(|marker| path.contains(marker))
}

/// Resolves `href` and keeps it only if it points at a product detail page
///
/// # Arguments
///
/// * `href` - Raw `href` attribute value, absolute or relative
/// * `base_url` - Site root used for relative links
///
/// # Returns
///
/// * `Some(String)` - Absolute detail URL
/// * `None` - Not a usable detail link
pub fn detail_url(href: &str, base_url: &Url) -> Option<String> {
    resolve_link(href, base_url)
        .filter(is_detail_path)
        .map(String::from)
}
