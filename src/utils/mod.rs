pub mod constants;
pub mod logging;
pub mod progress;

pub use constants::*;
pub use progress::ProgressReporter;
