use std::{fmt::Display, iter::Sum, ops::Add};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

//--------------------------------------       Weight        ---------------------------------------------------------
/// A laundry load weight in integer grams.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Weight(i64);

impl Add for Weight {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Weight {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in grams: {0}")]
pub struct WeightConversionError(String);

impl From<i64> for Weight {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Weight {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Weight {}

impl TryFrom<u64> for Weight {
    type Error = WeightConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(WeightConversionError(format!("Value {} is too large to convert to Weight", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kg = self.0 as f64 / 1000.0;
        write!(f, "{kg:0.2}kg")
    }
}

impl Weight {
    pub fn grams(&self) -> i64 {
        self.0
    }

    pub fn from_kg(kg: i64) -> Self {
        Self(kg * 1000)
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_formats_kilograms() {
        assert_eq!(Weight::from_kg(5).to_string(), "5.00kg");
        assert_eq!(Weight::from(4250).to_string(), "4.25kg");
    }

    #[test]
    fn sums() {
        let total: Weight = [Weight::from_kg(1), Weight::from(500)].into_iter().sum();
        assert_eq!(total, Weight::from(1500));
    }
}
