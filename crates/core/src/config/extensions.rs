use serde::{Deserialize, Serialize};

/// Metadata file extensions, either as a list or as a pattern string like `"*.jdo; *.orm"`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetadataExtensions {
    Pattern(String),
    List(Vec<String>),
}

impl MetadataExtensions {
    /// Normalized extensions: wildcards and dots stripped, trimmed, empties and
    /// duplicates dropped, first occurrence order kept.
    pub fn to_list(&self) -> Vec<String> {
        match self {
            MetadataExtensions::Pattern(pattern) => parse_pattern(pattern),
            MetadataExtensions::List(items) => {
                let mut out = Vec::new();
                for item in items {
                    push_unique(&mut out, clean(item));
                }
                out
            }
        }
    }
}

impl Default for MetadataExtensions {
    fn default() -> Self {
        MetadataExtensions::List(vec!["jdo".to_string(), "orm".to_string()])
    }
}

/// Parses `"*.jdo; *.orm"` into `["jdo", "orm"]`.
pub fn parse_pattern(pattern: &str) -> Vec<String> {
    let mut out = Vec::new();
    for raw in pattern.split(';') {
        push_unique(&mut out, clean(raw));
    }
    out
}

/// Renders extensions back into the pattern form.
pub fn to_pattern(extensions: &[String]) -> String {
    extensions.join("; ")
}

fn clean(raw: &str) -> String {
    raw.replace(['*', '.'], "").trim().to_string()
}

fn push_unique(out: &mut Vec<String>, extension: String) {
    if !extension.is_empty() && !out.contains(&extension) {
        out.push(extension);
    }
}
