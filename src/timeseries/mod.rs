//! Time-series adapters feeding the optimizer.
//!
//! Everything here is data preparation: reading CSV tables, normalizing
//! intra-day profiles and expanding daily totals. The result is a single
//! aligned [`HourlyInputs`] value.

pub mod inputs;
pub mod provider;
pub mod table;

pub use inputs::*;
pub use provider::*;
pub use table::*;
