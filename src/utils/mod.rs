// Input validation shared by the store facade and the HTTP layer.

pub mod validation {
    use rust_decimal::Decimal;

    /// Longest symbol the catalog column accepts
    pub const MAX_SYMBOL_LEN: usize = 16;

    /// Validate that a price is positive
    pub fn is_valid_price(price: Decimal) -> bool {
        price > Decimal::ZERO
    }

    /// Validate that a (trimmed) symbol is non-empty, short enough and only
    /// uses characters a ticker can carry (e.g. "AAPL", "BRK.B", "RDS-A")
    pub fn is_valid_symbol(symbol: &str) -> bool {
        !symbol.is_empty()
            && symbol.len() <= MAX_SYMBOL_LEN
            && symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    }

}
