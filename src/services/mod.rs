pub mod preprocess;
pub mod risk;
pub mod signals;

pub use preprocess::RawTable;
pub use risk::{position_size, RiskError};
pub use signals::{
    analyze_csv, analyze_image, analyze_series, analyze_tabular, FixedPriceSource, PriceSource,
    UniformPriceSource,
};
