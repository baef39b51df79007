//! Exchange symbol parsing helpers.
//!
//! Exchanges spell pairs differently: `ETH-USDT`, `KRW-ETH`, `PEPEUSDT`,
//! `BTC-USDT-SWAP`. These helpers recover `(base, quote)` from such strings.

/// Quote currencies recognised when splitting a concatenated symbol.
pub const KNOWN_QUOTES: &[&str] = &[
    "USDT", "USDC", "FDUSD", "TUSD", "BUSD", "USD", "EUR", "KRW", "BTC", "ETH", "BNB", "TRY",
    "GBP", "JPY", "BRL",
];

const SEPARATORS: &[char] = &['-', '_', '/'];

const PERP_SUFFIXES: &[&str] = &["-USDT-PERP", "-USD-PERP", "-PERP", "_PERP", "PERP", "-SWAP", "SWAP"];

/// How a separated symbol orders its two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolStyle {
    /// `BASE-QUOTE`, e.g. `ETH/USDT`.
    BaseQuote,
    /// `QUOTE-BASE`, e.g. Upbit's `KRW-ETH`.
    QuoteBase,
    /// Unknown order; guessed from [`KNOWN_QUOTES`].
    Guess,
}

/// Split a symbol into uppercase `(base, quote)`.
///
/// Separated symbols are split according to `style`. Concatenated symbols are
/// split on the longest known quote suffix.
#[must_use]
pub fn split(symbol: &str, style: SymbolStyle) -> Option<(String, String)> {
    let upper = symbol.trim().to_uppercase();

    if upper.contains(SEPARATORS) {
        let parts: Vec<&str> = upper.split(SEPARATORS).collect();
        let [first, second] = parts.as_slice() else {
            return None;
        };
        if first.is_empty() || second.is_empty() {
            return None;
        }
        let (base, quote) = match style {
            SymbolStyle::BaseQuote => (*first, *second),
            SymbolStyle::QuoteBase => (*second, *first),
            SymbolStyle::Guess => {
                if !is_known_quote(second) && is_known_quote(first) {
                    (*second, *first)
                } else {
                    (*first, *second)
                }
            }
        };
        return Some((base.to_string(), quote.to_string()));
    }

    split_known_quote(&upper)
}

/// Split a concatenated symbol (`PEPEUSDT`) on the longest known quote suffix.
///
/// Perpetual suffixes are stripped first. Numeric prefixes such as `1000PEPE`
/// are kept as part of the base.
#[must_use]
pub fn split_known_quote(symbol: &str) -> Option<(String, String)> {
    let upper = symbol.trim().to_uppercase();
    let (core, _) = trim_perp_suffix(&upper);

    let mut quotes: Vec<&str> = KNOWN_QUOTES.to_vec();
    quotes.sort_by_key(|q| std::cmp::Reverse(q.len()));

    quotes.into_iter().find_map(|quote| {
        core.strip_suffix(quote)
            .filter(|base| !base.is_empty())
            .map(|base| (base.to_string(), quote.to_string()))
    })
}

/// Strip a perpetual-contract suffix, reporting whether one was present.
#[must_use]
pub fn trim_perp_suffix(symbol: &str) -> (&str, bool) {
    for suffix in PERP_SUFFIXES {
        if let Some(core) = symbol.strip_suffix(suffix) {
            if !core.is_empty() {
                return (core, true);
            }
        }
    }
    (symbol, false)
}

fn is_known_quote(s: &str) -> bool {
    KNOWN_QUOTES.contains(&s)
}
