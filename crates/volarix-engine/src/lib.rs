pub mod gates;
pub mod rejection;
pub mod session;
pub mod setup;
pub mod sr;
pub mod trend;

pub use gates::{confidence_gate, trend_alignment_gate, AlignmentOutcome};
pub use sr::cluster_tolerance;
pub use trend::Trend;
