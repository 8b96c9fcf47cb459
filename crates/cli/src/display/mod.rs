pub mod formatter;

pub use formatter::{ConsoleSink, format_message, format_unit, yes_no};
