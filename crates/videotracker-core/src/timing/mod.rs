//! Wall-clock timing
//!
//! - Clock sources, real and manual ([`clock`])
//! - Time-since attribute table ([`since`])
//!
//! Intervals are measured between two instants the tracker observed, in
//! whole milliseconds.

pub mod clock;
pub mod since;

use chrono::{DateTime, Utc};

/// Milliseconds from `from` to `to`
///
/// Saturates at zero when the wall clock stepped backwards.
pub fn elapsed_ms(from: DateTime<Utc>, to: DateTime<Utc>) -> i64 {
    (to - from).num_milliseconds().max(0)
}
