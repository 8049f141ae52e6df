pub mod battery;
pub mod grid;
pub mod hydrogen;
pub mod types;

pub use battery::*;
pub use grid::*;
pub use hydrogen::*;
pub use types::*;
