use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Pip unit for 5-digit majors (e.g. EUR/USD, GBP/USD).
const MAJOR_PIP: Decimal = dec!(0.0001);

/// Pip unit for 3-digit JPY crosses (e.g. USD/JPY, EUR/JPY).
const JPY_PIP: Decimal = dec!(0.01);

/// Looks up the pip unit for a symbol. Unknown symbols fall back to the
/// major-pair convention and log a warning, since the core has no
/// authoritative instrument registry of its own (that lives with the
/// caller's market-data feed).
pub fn pip_value(symbol: &str) -> Decimal {
    let normalized = symbol.to_ascii_uppercase();
    if normalized.ends_with("JPY") || normalized.contains("JPY") {
        return JPY_PIP;
    }
    if KNOWN_MAJORS.contains(&normalized.as_str()) {
        return MAJOR_PIP;
    }
    tracing::warn!(symbol = %symbol, "unknown symbol, defaulting to major pip convention");
    MAJOR_PIP
}

const KNOWN_MAJORS: &[&str] = &[
    "EURUSD", "GBPUSD", "AUDUSD", "NZDUSD", "USDCAD", "USDCHF", "EURGBP", "EURCHF", "EURAUD",
    "GBPCHF", "GBPAUD", "AUDCAD", "AUDCHF", "AUDNZD", "NZDCAD", "NZDCHF", "CADCHF",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majors_use_four_decimal_pip() {
        assert_eq!(pip_value("EURUSD"), MAJOR_PIP);
    }

    #[test]
    fn jpy_crosses_use_two_decimal_pip() {
        assert_eq!(pip_value("USDJPY"), JPY_PIP);
        assert_eq!(pip_value("EURJPY"), JPY_PIP);
    }

    #[test]
    fn unknown_symbol_falls_back_to_major() {
        assert_eq!(pip_value("XAUUSD"), MAJOR_PIP);
    }
}
