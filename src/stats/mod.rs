//! Trade statistics module
//!
//! Round-trip matching and realized profit

mod recorder;
mod round_trip;

pub use recorder::{Stats, StatsRecorder};
pub use round_trip::{RoundTrip, RoundTripMatcher};
