//! snip: a lovechild of grep and sed
//!
//! One pattern-compilation and one stream-scanning discipline behind three
//! commands: match (filter), replace (substitute), split (field selection).
//! This library exposes the engine for the `snip` binary and for the
//! property-based test suite.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logger;
pub mod pattern;
pub mod scanner;
pub mod transform;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{Result, SnipError};
pub use input::{enumerate_inputs, SourceSpec};
pub use pattern::{compile, RegexFlags};
pub use scanner::{run, scan, OutputWriter, RunConfig, ScanMode};
pub use transform::{Command, Transformer};
