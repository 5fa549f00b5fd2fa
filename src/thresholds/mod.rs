pub mod registry;
pub mod severity;
pub mod spec;

pub use registry::ThresholdRegistry;
pub use severity::Severity;
pub use spec::{Direction, ThresholdSpec, TierBound};
