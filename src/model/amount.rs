//! Money values for the expense sheets.
//!
//! Cells hold whatever the user typed, so this module provides two ways in: a strict `FromStr`
//! that reports bad input, and [`Amount::lenient`] which turns anything unparsable into zero. The
//! aggregation code only ever uses the lenient form.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how an amount should be written out.
///
/// # Examples
///  - `AmountFormat::CURRENCY` -> `-$60,000.00`
///  - `AmountFormat::GROUPED` -> `-60,000.00`
///  - `AmountFormat::RAW` -> `-60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a currency sign is written.
    dollar: bool,
    /// Whether commas are written as thousands separators.
    commas: bool,
}

impl AmountFormat {
    pub const CURRENCY: AmountFormat = AmountFormat {
        dollar: true,
        commas: true,
    };

    pub const GROUPED: AmountFormat = AmountFormat {
        dollar: false,
        commas: true,
    };

    pub const RAW: AmountFormat = AmountFormat {
        dollar: false,
        commas: false,
    };
}

impl Default for AmountFormat {
    fn default() -> Self {
        AmountFormat::GROUPED
    }
}

/// A money value together with the way it should be displayed.
///
/// ```
/// # use expense_tracker::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("1,250.5").unwrap();
/// assert_eq!(amount.to_string(), "1,250.50");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    value: Decimal,
    format: AmountFormat,
}

impl Amount {
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: AmountFormat::GROUPED,
        }
    }

    pub const fn new_with_format(value: Decimal, format: AmountFormat) -> Self {
        Self { value, format }
    }

    /// Parses a cell value for summation. Blank, absent and non-numeric input is zero.
    /// A leading `$` and thousands commas are accepted; exponent notation such as `1e3` is not.
    ///
    /// ```
    /// # use expense_tracker::model::Amount;
    /// # use rust_decimal::Decimal;
    /// assert_eq!(Amount::lenient("85.00"), Decimal::new(85, 0));
    /// assert_eq!(Amount::lenient("$1,000"), Decimal::new(1000, 0));
    /// assert_eq!(Amount::lenient("lunch"), Decimal::ZERO);
    /// assert_eq!(Amount::lenient(""), Decimal::ZERO);
    /// ```
    pub fn lenient(s: &str) -> Decimal {
        Amount::from_str(s).map(|a| a.value).unwrap_or_default()
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value.is_sign_negative()
    }
}

/// An error that can occur when a cell does not hold a number.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed),
        };
        let (dollar, digits) = match unsigned.strip_prefix('$') {
            Some(rest) => (true, rest),
            None => (false, unsigned),
        };

        let without_commas = digits.replace(',', "");
        let commas = without_commas.len() < digits.len();

        let mut value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        if negative {
            value.set_sign_negative(true);
        }
        Ok(Amount {
            value,
            format: AmountFormat { dollar, commas },
        })
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let num = self.value.abs();
        let dol = if self.format.dollar { "$" } else { "" };

        if self.format.commas {
            write!(
                f,
                "{sign}{dol}{}",
                format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
            )
        } else {
            write!(f, "{sign}{dol}{:.2}", num)
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}
