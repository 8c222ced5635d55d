use std::collections::HashMap;
use std::sync::Arc;

use rust_decimal::Decimal;

/// Immutable table of currency-to-base-currency multipliers.
///
/// Built once before the run starts and injected into the stages that need
/// it. Clones share the underlying map, so the table can be handed to every
/// worker task without copying entries or taking locks.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: Arc<HashMap<String, Decimal>>
}

impl RateTable {
    /// The built-in rates against USD.
    //NOTE: In a production deployment these would be fetched from a
    //      market-data service before the batch is kicked off.
    pub fn builtin() -> Self {
        Self::from_rates([
            ("USD", Decimal::ONE),
            ("EUR", Decimal::new(108, 2)),
            ("GBP", Decimal::new(127, 2)),
            ("JPY", Decimal::new(67, 4)),
            ("CNY", Decimal::new(14, 2))
        ])
    }

    pub fn from_rates<S, I>(rates: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (S, Decimal)>,
    {
        Self {
            rates: Arc::new(rates.into_iter().map(|(code, rate)| (code.into(), rate)).collect())
        }
    }

    /// Whether the currency has a known rate.
    pub fn supports(&self, currency: &str) -> bool {
        self.rates.contains_key(currency)
    }

    /// Multiplier for the given currency.
    ///
    /// Unknown codes convert at identity so every record acquires a numeric
    /// base-currency amount and downstream aggregation stays total.
    pub fn rate_for(&self, currency: &str) -> Decimal {
        self.rates.get(currency).copied().unwrap_or(Decimal::ONE)
    }
}

impl Default for RateTable {
    fn default() -> Self {
        Self::builtin()
    }
}
