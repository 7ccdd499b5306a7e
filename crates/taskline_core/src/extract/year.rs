//! Two-digit year normalization.

/// Expands a two-digit year: `"00"`..`"49"` land in the 2000s, `"50"`..`"99"`
/// in the 1900s. Any other input is returned unchanged.
///
/// The comparison is lexicographic on the two-character string, so it is
/// only meaningful for zero-padded input.
pub fn normalize_year(year: &str) -> String {
    if year.len() != 2 {
        return year.to_string();
    }
    if year < "50" {
        format!("20{year}")
    } else {
        format!("19{year}")
    }
}

/// Normalizes and parses a 2- or 4-digit year token.
pub fn resolve_year(token: &str) -> Option<i32> {
    normalize_year(token).parse().ok()
}
