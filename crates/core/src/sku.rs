//! SKU rules.
//!
//! SKUs are unique case-insensitively. Lookups always compare
//! `LOWER(sku)`; the CSV importer additionally stores SKUs lower-cased.

/// Maximum stored length of a SKU, matching the `products.sku` check.
pub const MAX_SKU_LEN: usize = 255;

/// Canonical form used for case-insensitive comparison and CSV imports.
pub fn normalize_sku(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize_sku("  AbC-001 "), "abc-001");
        assert_eq!(normalize_sku("ÄBC"), "äbc");
    }
}
