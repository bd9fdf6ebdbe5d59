pub mod chart;
pub mod risk;
pub mod signals;

pub use chart::*;
pub use risk::*;
pub use signals::*;
