//! Lookup key normalization shared by reference tables and model artifacts

/// Normalize a brand, model or mode name: trimmed, lowercase, inner
/// whitespace replaced by underscores
pub fn normalize_key(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("  Honda Click 125i "), "honda_click_125i");
        assert_eq!(normalize_key("YAMAHA"), "yamaha");
        assert_eq!(normalize_key("idle"), "idle");
    }
}
