pub mod integrity_checker;
pub mod parallel_processor;

pub use integrity_checker::{IntegrityChecker, IntegrityReport, IntegrityViolation, ViolationType};
pub use parallel_processor::ParallelDetector;
