//! Ticker symbol normalization

use crate::error::{Result, StockError};

const MAX_SYMBOL_LEN: usize = 12;

/// Trim and uppercase an untrusted ticker, rejecting strings that cannot be one
///
/// Accepts ASCII letters, digits, `.` and `-` (e.g. `BRK.B`, `RDS-A`).
pub fn normalize_symbol(raw: &str) -> Result<String> {
    let symbol = raw.trim().to_ascii_uppercase();

    if symbol.is_empty() {
        return Err(StockError::InvalidSymbol("symbol is empty".to_string()));
    }

    if symbol.len() > MAX_SYMBOL_LEN
        || !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(StockError::InvalidSymbol(raw.trim().to_string()));
    }

    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalizes_case_and_whitespace() {
        assert_eq!(normalize_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("brk.b").unwrap(), "BRK.B");
        assert_eq!(normalize_symbol("NOTASYMBOL").unwrap(), "NOTASYMBOL");
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(normalize_symbol("   "), Err(StockError::InvalidSymbol(_))));
        assert!(matches!(
            normalize_symbol("AAPL&apikey=x"),
            Err(StockError::InvalidSymbol(_))
        ));
        assert!(matches!(
            normalize_symbol("WAYTOOLONGSYMBOL"),
            Err(StockError::InvalidSymbol(_))
        ));
    }
}
