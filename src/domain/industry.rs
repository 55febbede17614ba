//! Portfolio industry labels and the public filter list.

/// Filters offered on the public portfolio page, in display order.
pub const PORTFOLIO_FILTERS: [&str; 6] = [
    "All",
    "Construction",
    "Healthcare",
    "E-Commerce",
    "Consulting",
    "Real Estate",
];

/// Collapse spelling variants so free-text industries group under one filter.
pub fn normalize_industry(value: &str) -> String {
    let trimmed = value.trim();
    let lowered = trimmed.to_ascii_lowercase();
    if lowered == "e-commerce" || lowered == "ecommerce" {
        return "E-Commerce".to_string();
    }
    trimmed.to_string()
}

/// Whether a project with `industry` is shown under the `filter` tab.
pub fn matches_filter(industry: &str, filter: &str) -> bool {
    let filter = filter.trim();
    if filter.is_empty() || filter.eq_ignore_ascii_case("all") {
        return true;
    }
    normalize_industry(industry).eq_ignore_ascii_case(&normalize_industry(filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_ecommerce_variants() {
        assert_eq!(normalize_industry("ecommerce"), "E-Commerce");
        assert_eq!(normalize_industry(" E-commerce "), "E-Commerce");
        assert_eq!(normalize_industry("Healthcare"), "Healthcare");
    }

    #[test]
    fn all_filter_matches_everything() {
        assert!(matches_filter("Construction", "All"));
        assert!(matches_filter("Construction", ""));
        assert!(matches_filter("ecommerce", "E-Commerce"));
        assert!(!matches_filter("Healthcare", "Real Estate"));
    }
}
