//! List quantities.
//!
//! A quantity is valid when it is present, a whole number and strictly
//! positive. Anything else is rejected with `Error::InvalidQuantity`.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// A validated, strictly positive whole quantity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Quantity(u32);

impl Quantity {
    /// Validate a numeric quantity.
    ///
    /// # Errors
    ///
    /// `Error::InvalidQuantity` if `value % 1 != 0` (this includes NaN and
    /// infinities), if `value <= 0`, or if it does not fit in a `u32`.
    pub fn new(value: f64) -> Result<Self> {
        if value % 1.0 != 0.0 {
            return Err(Error::InvalidQuantity(format!(
                "{} is not a whole number",
                value
            )));
        }
        if value <= 0.0 {
            return Err(Error::InvalidQuantity(format!(
                "{} is negative or zero",
                value
            )));
        }
        if value > u32::MAX as f64 {
            return Err(Error::InvalidQuantity(format!("{} is too large", value)));
        }
        Ok(Quantity(value as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Add two quantities.
    ///
    /// # Errors
    ///
    /// `Error::InvalidQuantity` on overflow.
    pub fn checked_add(self, other: Quantity) -> Result<Self> {
        self.0
            .checked_add(other.0)
            .map(Quantity)
            .ok_or_else(|| {
                Error::InvalidQuantity(format!("{} + {} overflows", self.0, other.0))
            })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Conversion into a validated [`Quantity`].
///
/// Implemented for integers, floats, `Option`s of those (where `None` is the
/// missing-quantity case) and `Quantity` itself.
pub trait IntoQuantity {
    fn into_quantity(self) -> Result<Quantity>;
}

impl IntoQuantity for Quantity {
    fn into_quantity(self) -> Result<Quantity> {
        Ok(self)
    }
}

impl IntoQuantity for f64 {
    fn into_quantity(self) -> Result<Quantity> {
        Quantity::new(self)
    }
}

impl IntoQuantity for f32 {
    fn into_quantity(self) -> Result<Quantity> {
        Quantity::new(f64::from(self))
    }
}

macro_rules! impl_into_quantity_for_int {
    ($($ty:ty),*) => {
        $(
            impl IntoQuantity for $ty {
                fn into_quantity(self) -> Result<Quantity> {
                    u32::try_from(self)
                        .ok()
                        .filter(|q| *q > 0)
                        .map(Quantity)
                        .ok_or_else(|| {
                            Error::InvalidQuantity(format!(
                                "{} is negative, zero or too large",
                                self
                            ))
                        })
                }
            }
        )*
    };
}

impl_into_quantity_for_int!(i32, i64, u32, u64, usize);

impl<T: IntoQuantity> IntoQuantity for Option<T> {
    fn into_quantity(self) -> Result<Quantity> {
        match self {
            Some(value) => value.into_quantity(),
            None => Err(Error::InvalidQuantity("null quantity".to_string())),
        }
    }
}
