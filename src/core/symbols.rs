//! Display symbols for currency codes, as HTML-safe strings.

use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::warn;

static SYMBOLS: OnceLock<HashMap<String, String>> = OnceLock::new();

fn symbols() -> &'static HashMap<String, String> {
    SYMBOLS.get_or_init(|| {
        serde_json::from_str(include_str!("../../assets/symbols.json")).unwrap_or_else(|e| {
            warn!("Failed to parse embedded currency symbols: {}", e);
            HashMap::new()
        })
    })
}

pub fn symbol(code: &str) -> Option<&'static str> {
    symbols().get(code).map(String::as_str)
}

/// The symbol for `code`, or the code itself when no symbol is known.
pub fn symbol_or_code(code: &str) -> &str {
    symbol(code).unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_symbols_parse() {
        assert!(symbols().len() > 40);
    }

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(symbol("USD"), Some("$"));
        assert_eq!(symbol("EUR"), Some("&euro;"));
        assert_eq!(symbol("BAM"), Some("KM"));
        assert_eq!(symbol("VUV"), Some("Vt"));
        assert_eq!(symbol("FFF"), None);
    }

    #[test]
    fn test_symbol_falls_back_to_code() {
        assert_eq!(symbol_or_code("GBP"), "&pound;");
        assert_eq!(symbol_or_code("XAU"), "XAU");
    }
}
