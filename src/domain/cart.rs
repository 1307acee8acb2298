use crate::error::{HubError, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::str::FromStr;

pub const ITEM_QTY: &str = "quantity";
pub const ITEM_PRICE: &str = "price";
pub const ITEM_TAX: &str = "tax";
pub const ITEM_TAXABLE: &str = "taxable";

/// Options attached to a cart line item.
///
/// The four well-known options are typed and validated on write. Anything else
/// lands in `extra`, which keeps keys sorted. An option that was never set
/// reads as absent through [`get`](Self::get) and [`contains`](Self::contains);
/// the typed accessors fall back to quantity 1, price 0 and taxable.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartItemOptions {
    #[serde(default)]
    quantity: Option<Decimal>,
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    tax: Option<Decimal>,
    #[serde(default)]
    taxable: Option<bool>,
    #[serde(default)]
    extra: BTreeMap<String, Value>,
}

impl CartItemOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity.unwrap_or(Decimal::ONE)
    }

    pub fn price(&self) -> Decimal {
        self.price.unwrap_or(Decimal::ZERO)
    }

    pub fn tax(&self) -> Option<Decimal> {
        self.tax
    }

    pub fn taxable(&self) -> bool {
        self.taxable.unwrap_or(true)
    }

    pub fn extra(&self) -> &BTreeMap<String, Value> {
        &self.extra
    }

    pub fn set_quantity(&mut self, quantity: Decimal) -> Result<()> {
        if quantity <= Decimal::ZERO {
            return Err(HubError::InvalidQuantity(
                "quantity must be a valid number greater than zero".to_string(),
            ));
        }
        self.quantity = Some(quantity);
        Ok(())
    }

    pub fn set_price(&mut self, price: Decimal) {
        self.price = Some(price);
    }

    pub fn set_tax(&mut self, tax: Option<Decimal>) {
        self.tax = tax;
    }

    pub fn set_taxable(&mut self, taxable: bool) {
        self.taxable = Some(taxable);
    }

    /// Sets an option from a loosely typed value.
    ///
    /// Well-known keys are validated and converted; other keys are stored as is.
    /// `tax` accepts a number or any empty value (null, `false`, `""`, `[]`),
    /// the latter clearing it.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        match key {
            ITEM_QTY => {
                let quantity = numeric(&value).ok_or_else(|| {
                    HubError::InvalidQuantity(
                        "quantity must be a valid number greater than zero".to_string(),
                    )
                })?;
                self.set_quantity(quantity)
            }
            ITEM_PRICE => {
                let price = numeric(&value).ok_or_else(|| {
                    HubError::InvalidPrice("price must be a valid number".to_string())
                })?;
                self.set_price(price);
                Ok(())
            }
            ITEM_TAX => {
                let tax = match numeric(&value) {
                    Some(tax) => Some(tax),
                    None if is_empty_value(&value) => None,
                    None => {
                        return Err(HubError::InvalidTaxable("tax must be a number".to_string()));
                    }
                };
                self.set_tax(tax);
                Ok(())
            }
            ITEM_TAXABLE => {
                let taxable = flag(&value).ok_or_else(|| {
                    HubError::InvalidTaxable("taxable option must be a boolean".to_string())
                })?;
                self.set_taxable(taxable);
                Ok(())
            }
            _ => {
                self.extra.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    /// The value stored under `key`, or `None` if it was never set.
    pub fn get(&self, key: &str) -> Option<Value> {
        match key {
            ITEM_QTY => self.quantity.and_then(|q| serde_json::to_value(q).ok()),
            ITEM_PRICE => self.price.and_then(|p| serde_json::to_value(p).ok()),
            ITEM_TAX => self.tax.and_then(|tax| serde_json::to_value(tax).ok()),
            ITEM_TAXABLE => self.taxable.map(Value::Bool),
            _ => self.extra.get(key).cloned(),
        }
    }

    /// True when the option was set to a non-empty value.
    ///
    /// Zero, `false`, `""`, `"0"`, null and empty collections all count as empty.
    pub fn contains(&self, key: &str) -> bool {
        match key {
            ITEM_QTY => self.quantity.is_some_and(|q| !q.is_zero()),
            ITEM_PRICE => self.price.is_some_and(|p| !p.is_zero()),
            ITEM_TAX => self.tax.is_some_and(|tax| !tax.is_zero()),
            ITEM_TAXABLE => self.taxable == Some(true),
            _ => self.extra.get(key).is_some_and(|value| !is_empty_value(value)),
        }
    }

    /// Clears an option and returns its previous value.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let previous = self.get(key);
        match key {
            ITEM_QTY => self.quantity = None,
            ITEM_PRICE => self.price = None,
            ITEM_TAX => self.tax = None,
            ITEM_TAXABLE => self.taxable = None,
            _ => {
                self.extra.remove(key);
            }
        }
        previous
    }
}

fn numeric(value: &Value) -> Option<Decimal> {
    let raw = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .ok()
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(flag) => Some(*flag),
        other => match numeric(other) {
            Some(n) if n.is_zero() => Some(false),
            Some(n) if n == Decimal::ONE => Some(true),
            _ => None,
        },
    }
}

/// Loose emptiness: null, `false`, zero, `""`, `"0"` and empty collections.
pub(crate) fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
