//! The price definition grammar shared by every catalog source.
//!
//! A definition is the JSON value mapped from an item name inside a catalog
//! file. Three shapes are accepted:
//!
//! - a bare number: the buy price; sell defaults to half of it
//! - an object `{"buy": _, "sell": _, "fluctuation": _}` with any subset of
//!   keys; a missing side is mirrored from the other at half/double, an
//!   explicit `null` (or `false`, the form the override writer emits)
//!   prohibits that side
//! - `null`: both sides prohibited
//!
//! Bad numbers never abort a catalog: a negative or unparsable price
//! degrades to a prohibited side. Only a definition that names neither side
//! (and is not literally `null`) is rejected outright.

use serde_json::Value;

use crate::catalog::ItemId;
use crate::price::record::{PriceRecord, DEFAULT_FLUCTUATION};

/// How one side of a definition resolved before mirroring.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Side {
    /// Key not present; fill from the other side.
    Absent,
    /// Key present but disabled (`null`, `false`, negative, unparsable).
    Prohibited,
    /// A usable non-negative price.
    Price(f64),
}

impl Side {
    /// Mirror for a missing side: half/double of a priced side, prohibited
    /// if the priced side is itself prohibited.
    fn mirrored(other: Side, factor: f64) -> Side {
        match other {
            Side::Price(p) => Side::Price(p * factor),
            _ => Side::Prohibited,
        }
    }
}

/// Read one side's value out of a definition object.
fn side_value(value: Option<&Value>) -> Side {
    match value {
        None => Side::Absent,
        Some(Value::Null) | Some(Value::Bool(false)) => Side::Prohibited,
        Some(v) => match numeric(v) {
            Some(n) if n >= 0.0 => Side::Price(n),
            _ => Side::Prohibited,
        },
    }
}

/// Accept JSON numbers and numeric strings; anything else is unparsable.
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        _ => None,
    }
}

/// Parse one definition into a record, or an invalid-entry diagnostic.
pub fn record_from_definition(id: &ItemId, value: &Value) -> Result<PriceRecord, String> {
    match value {
        Value::Null => Ok(PriceRecord::prohibited(id.clone())),
        Value::Number(_) | Value::String(_) => {
            let buy = match numeric(value) {
                Some(n) if n >= 0.0 => Side::Price(n),
                _ => Side::Prohibited,
            };
            build(id, buy, Side::mirrored(buy, 0.5), DEFAULT_FLUCTUATION)
        }
        Value::Object(fields) => {
            if !fields.contains_key("buy") && !fields.contains_key("sell") {
                return Err(format!("{id}: definition supplies neither buy nor sell"));
            }
            let mut buy = side_value(fields.get("buy"));
            let mut sell = side_value(fields.get("sell"));
            if buy == Side::Absent {
                buy = Side::mirrored(sell, 2.0);
            }
            if sell == Side::Absent {
                sell = Side::mirrored(buy, 0.5);
            }

            let fluctuation = fields
                .get("fluctuation")
                .and_then(numeric)
                .filter(|f| *f >= 0.0)
                .unwrap_or(DEFAULT_FLUCTUATION);

            build(id, buy, sell, fluctuation)
        }
        other => Err(format!(
            "{id}: expected number, object or null, got {}",
            type_name(other)
        )),
    }
}

fn build(id: &ItemId, buy: Side, sell: Side, fluctuation: f64) -> Result<PriceRecord, String> {
    let (buy_price, prohibit_buy) = match buy {
        Side::Price(p) => (p, false),
        _ => (0.0, true),
    };
    let (sell_price, prohibit_sell) = match sell {
        Side::Price(p) => (p, false),
        _ => (0.0, true),
    };
    Ok(PriceRecord::new(
        id.clone(),
        buy_price,
        sell_price,
        fluctuation,
        prohibit_buy,
        prohibit_sell,
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
