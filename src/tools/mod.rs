//! External programs: lookup, captured execution and the code runner.

pub mod process;
pub mod runner;
pub mod toolchain;

pub use runner::Runner;
