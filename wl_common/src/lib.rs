mod helpers;
mod money;
mod weight;

pub use helpers::parse_boolean_flag;
pub use money::{Money, MoneyConversionError};
pub use weight::{Weight, WeightConversionError};
