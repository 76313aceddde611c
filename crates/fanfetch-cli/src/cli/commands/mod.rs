//! CLI command handlers. Each command is in its own file.

mod fetch_one;
mod run;

pub use fetch_one::run_fetch_one;
pub use run::run_passes;
