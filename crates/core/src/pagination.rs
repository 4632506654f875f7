//! Page-number pagination rules for list endpoints.
//!
//! Clients send a 1-based `page` and an optional `pageSize`. Values are
//! clamped here so repositories only ever see a sane `LIMIT`/`OFFSET`.

/// Page size used when the client does not send one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Upper bound on the page size a client may request.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Resolved `LIMIT`/`OFFSET` pair for a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub limit: i64,
    pub offset: i64,
}

/// Clamp a requested page size into `1..=MAX_PAGE_SIZE`.
pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    match page_size {
        Some(size) if size >= 1 => size.min(MAX_PAGE_SIZE),
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Turn a 1-based page number and page size into a [`PageWindow`].
///
/// Pages below 1 are treated as page 1.
pub fn page_window(page: Option<i64>, page_size: Option<i64>) -> PageWindow {
    let limit = clamp_page_size(page_size);
    let page = page.unwrap_or(1).max(1);
    PageWindow {
        limit,
        offset: (page - 1).saturating_mul(limit),
    }
}

/// Interpret the `active` query flag.
///
/// `None` or an empty string means "do not filter". `true`, `1` and `yes`
/// (any case) mean active; any other value means inactive.
pub fn parse_active_flag(raw: Option<&str>) -> Option<bool> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    Some(matches!(
        raw.to_ascii_lowercase().as_str(),
        "true" | "1" | "yes"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_defaults_and_caps() {
        assert_eq!(clamp_page_size(None), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(0)), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(-5)), DEFAULT_PAGE_SIZE);
        assert_eq!(clamp_page_size(Some(35)), 35);
        assert_eq!(clamp_page_size(Some(1000)), MAX_PAGE_SIZE);
    }

    #[test]
    fn page_window_is_one_based() {
        assert_eq!(
            page_window(None, None),
            PageWindow { limit: 20, offset: 0 }
        );
        assert_eq!(
            page_window(Some(3), Some(10)),
            PageWindow { limit: 10, offset: 20 }
        );
        assert_eq!(page_window(Some(0), Some(10)).offset, 0);
        assert_eq!(page_window(Some(-2), Some(10)).offset, 0);
    }

    #[test]
    fn active_flag_parsing() {
        assert_eq!(parse_active_flag(None), None);
        assert_eq!(parse_active_flag(Some("")), None);
        assert_eq!(parse_active_flag(Some("  ")), None);
        assert_eq!(parse_active_flag(Some("true")), Some(true));
        assert_eq!(parse_active_flag(Some("TRUE")), Some(true));
        assert_eq!(parse_active_flag(Some("1")), Some(true));
        assert_eq!(parse_active_flag(Some("Yes")), Some(true));
        assert_eq!(parse_active_flag(Some("false")), Some(false));
        assert_eq!(parse_active_flag(Some("no")), Some(false));
        assert_eq!(parse_active_flag(Some("banana")), Some(false));
    }
}
