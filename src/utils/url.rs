// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve an `href` found on `base` into an absolute crawlable URL.
///
/// Returns `None` for anchors, non-HTTP schemes and unparseable links.
///
/// # Examples
/// ```
/// use search_engine::utils::url::resolve_link;
///
/// let base = url::Url::parse("https://example.com/path/").unwrap();
/// assert_eq!(
///     resolve_link(&base, "page.html"),
///     Some("https://example.com/path/page.html".to_string())
/// );
/// assert_eq!(resolve_link(&base, "mailto:someone@example.com"), None);
/// ```
pub fn resolve_link(base: &Url, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

/// Canonical form of a URL used to recognise repeat visits.
///
/// Drops the fragment; falls back to the trimmed input when it does not parse.
pub fn normalize(url: &str) -> String {
    match Url::parse(url.trim()) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.trim().to_string(),
    }
}

/// Extract domain from a URL.
pub fn get_domain(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}
