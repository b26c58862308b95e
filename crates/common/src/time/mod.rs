//! Time utilities and abstractions
//!
//! - **[`clock`]**: real and mock wall clocks
//! - **[`format`]**: wall-clock timestamp formatting and parsing

pub mod clock;
pub mod format;

pub use clock::{Clock, MockClock, SystemClock};
pub use format::{
    format_wall_clock, hour_bucket, parse_wall_clock, HOUR_BUCKET_FORMAT, WALL_CLOCK_FORMAT,
};
