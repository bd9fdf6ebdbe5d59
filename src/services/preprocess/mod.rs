//! Input preprocessing: tabular OHLCV rows and chart images.

pub mod image;
pub mod tabular;

pub use self::image::{
    classify_segments, detect_segments, extract_patterns, HoughParams, LineSegment,
};
pub use tabular::{build_series, normalize_header, RawTable, REQUIRED_COLUMNS};
