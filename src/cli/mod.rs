pub mod args;
pub mod commands;

pub use args::{Cli, Commands, SeverityArg};
pub use commands::run;
