pub mod halstead;
pub mod loc_counter;
pub mod maintainability;
pub mod text;

pub use halstead::Halstead;
pub use loc_counter::{LineKind, LocCount, LocCounter};

/// Round to a fixed number of decimals
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
