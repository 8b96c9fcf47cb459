use enhancer_runner_core::{MessageLevel, MessageSink, MetadataUnit};

/// Prints pass messages to stdout, one `[LEVEL] text` line each.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl MessageSink for ConsoleSink {
    fn emit(&self, level: MessageLevel, text: &str) {
        println!("{}", format_message(level, text));
    }
}

pub fn format_message(level: MessageLevel, text: &str) -> String {
    let tag = match level {
        MessageLevel::Info => "[INFO]",
        MessageLevel::Warning => "[WARN]",
        MessageLevel::Error => "[ERROR]",
    };
    format!("{tag} {text}")
}

/// One row of the metadata listing: file or annotated class, where it was
/// found, and the classes it covers.
pub fn format_unit(unit: &MetadataUnit) -> String {
    if unit.is_annotation_based_only() {
        let name = unit.class_names().first().map(String::as_str).unwrap_or("");
        return format!("  @ {name}");
    }

    let location = unit.display_path();
    let file = if location.is_empty() {
        unit.display_name()
    } else {
        format!("{}/{}", location, unit.display_name())
    };
    let classes: Vec<String> = unit
        .class_names()
        .iter()
        .zip(unit.class_files())
        .map(|(name, file)| match file {
            Some(_) => name.clone(),
            None => format!("{name} (not compiled)"),
        })
        .collect();
    format!("  {file}: {}", classes.join(", "))
}

pub fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}
