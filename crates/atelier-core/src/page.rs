//! Page chrome helpers: nav link matching and scroll-reveal timing.

/// Strip fragment and query so nav matching compares paths only.
pub fn normalize_href(href: &str) -> &str {
    href.split(['#', '?']).next().unwrap_or(href)
}

/// Whether a nav link points at the page named by `<body data-page>`.
///
/// The home page is special-cased to `index.html`; every other page
/// matches on `<page>.html` appearing in the path.
pub fn is_link_active(page: &str, href: &str) -> bool {
    if page.is_empty() {
        return false;
    }
    let path = normalize_href(href);
    if page == "home" {
        path.ends_with("index.html")
    } else {
        path.contains(&format!("{page}.html"))
    }
}

/// Parse a `data-delay` millisecond value into seconds for the reveal
/// transition, clamped at zero. Unparseable input yields `None` and the
/// element keeps its stylesheet default.
pub fn reveal_delay_seconds(raw: Option<&str>) -> Option<f64> {
    let millis = raw.unwrap_or("0").trim().parse::<i64>().ok()?;
    Some(millis.max(0) as f64 / 1000.0)
}
