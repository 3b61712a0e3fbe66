//! Price records: the immutable value objects the registry maps item ids to.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::ItemId;

/// Default quote perturbation, in percent, when a catalog entry does not set
/// its own.
pub const DEFAULT_FLUCTUATION: f64 = 10.0;

/// Floor for a perturbed quote that would otherwise round to zero or below.
const QUOTE_FLOOR: f64 = 0.01;

/// One item's price entry.
///
/// Records are immutable once built; a later loader or the runtime modifier
/// replaces the whole registry entry rather than mutating fields. A side with
/// its prohibit flag set is not tradable at all — distinct from a zero price.
/// A record with both sides prohibited is valid and is how a catalog
/// explicitly suppresses an inherited default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRecord {
    pub id: ItemId,
    pub buy: f64,
    pub sell: f64,
    pub fluctuation: f64,
    pub prohibit_buy: bool,
    pub prohibit_sell: bool,
}

impl PriceRecord {
    /// Create a record. Negative prices or fluctuation are a programmer
    /// fault, not a recoverable condition: catalog parsing degrades bad
    /// numbers to prohibited sides long before this point.
    pub fn new(
        id: ItemId,
        buy: f64,
        sell: f64,
        fluctuation: f64,
        prohibit_buy: bool,
        prohibit_sell: bool,
    ) -> Self {
        assert!(
            buy >= 0.0 && sell >= 0.0 && fluctuation >= 0.0,
            "negative price data for {id}: buy={buy} sell={sell} fluctuation={fluctuation}"
        );
        Self {
            id,
            buy,
            sell,
            fluctuation,
            prohibit_buy,
            prohibit_sell,
        }
    }

    /// A record with both sides disabled (a known-but-untradeable item).
    pub fn prohibited(id: ItemId) -> Self {
        Self::new(id, 0.0, 0.0, DEFAULT_FLUCTUATION, true, true)
    }

    /// Whether the item can currently be bought from the shop side.
    pub fn buyable(&self) -> bool {
        !self.prohibit_buy
    }

    /// Whether the item can currently be sold to the shop side.
    pub fn sellable(&self) -> bool {
        !self.prohibit_sell
    }

    /// A buy quote with fresh random fluctuation applied. Re-derived on
    /// every call; repeated calls are expected to vary.
    pub fn buy_quote(&self) -> f64 {
        self.fluctuated(self.buy)
    }

    /// A sell quote with fresh random fluctuation applied.
    pub fn sell_quote(&self) -> f64 {
        self.fluctuated(self.sell)
    }

    fn fluctuated(&self, base: f64) -> f64 {
        if base == 0.0 {
            return 0.0;
        }
        let mut rng = rand::thread_rng();
        let delta = base * (rng.gen_range(0.0..=self.fluctuation) / 100.0);
        let quoted = if rng.gen_bool(0.5) {
            base + delta
        } else {
            base - delta
        };
        let quoted = if quoted <= 0.0 { QUOTE_FLOOR } else { quoted };
        (quoted * 100.0).round() / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gem() -> ItemId {
        "core:gem".parse().unwrap()
    }

    #[test]
    fn quotes_stay_within_fluctuation_band() {
        let record = PriceRecord::new(gem(), 100.0, 50.0, 10.0, false, false);
        for _ in 0..200 {
            let buy = record.buy_quote();
            assert!((90.0..=110.0).contains(&buy), "buy quote {buy} out of band");
            // 2-decimal rounding
            assert_eq!(buy, (buy * 100.0).round() / 100.0);

            let sell = record.sell_quote();
            assert!((45.0..=55.0).contains(&sell), "sell quote {sell} out of band");
        }
    }

    #[test]
    fn zero_base_never_quotes() {
        let record = PriceRecord::new(gem(), 0.0, 0.0, 10.0, false, false);
        for _ in 0..20 {
            assert_eq!(record.buy_quote(), 0.0);
            assert_eq!(record.sell_quote(), 0.0);
        }
    }

    #[test]
    fn zero_fluctuation_pins_the_quote() {
        let record = PriceRecord::new(gem(), 12.5, 6.25, 0.0, false, false);
        for _ in 0..20 {
            assert_eq!(record.buy_quote(), 12.5);
            assert_eq!(record.sell_quote(), 6.25);
        }
    }

    #[test]
    fn tiny_base_clamps_to_floor_instead_of_zero() {
        // 100% fluctuation can push a 0.01 base to 0 or below; quotes must
        // floor at 0.01 rather than disappear.
        let record = PriceRecord::new(gem(), 0.01, 0.01, 100.0, false, false);
        for _ in 0..200 {
            assert!(record.buy_quote() >= 0.01);
        }
    }

    #[test]
    #[should_panic]
    fn negative_price_is_a_fault() {
        let _ = PriceRecord::new(gem(), -1.0, 0.0, 10.0, false, false);
    }

    #[test]
    fn prohibited_record_is_valid_and_untradeable() {
        let record = PriceRecord::prohibited(gem());
        assert!(!record.buyable());
        assert!(!record.sellable());
        assert_eq!(record.buy, 0.0);
        assert_eq!(record.sell, 0.0);
    }
}
