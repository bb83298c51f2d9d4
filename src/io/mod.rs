//! Table I/O: a format-agnostic reader for consumption tables and a buffering writer
//! for per-building output tables.

pub mod reader;
pub mod writer;

pub use reader::{InputRow, InputTable, read_table};
pub use writer::{OutputFormat, OutputWriter};
