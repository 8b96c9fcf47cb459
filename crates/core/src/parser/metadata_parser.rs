//! Extracts declared type names from XML persistence metadata
//!
//! Two dialects are recognized and tried in order; the first one that yields any
//! name wins and the dialects are never merged:
//!
//! - nested: `<jdo|orm> <package name="a.b"> <class name="Foo"/>` gives `a.b.Foo`
//! - flat: `<entity-mappings> <entity|mapped-superclass|embeddable class="a.b.Foo"/>`

use std::path::Path;

use roxmltree::{Document, Node, ParsingOptions};
use tracing::debug;

use crate::error::{Error, Result};

/// Root elements of the nested package/class dialect.
pub const NESTED_ROOT_ELEMENTS: [&str; 2] = ["jdo", "orm"];

/// Root element of the flat dialect.
pub const FLAT_ROOT_ELEMENT: &str = "entity-mappings";

/// Children of the flat root that carry a `class` attribute.
pub const FLAT_TYPE_ELEMENTS: [&str; 3] = ["entity", "mapped-superclass", "embeddable"];

pub struct MetadataParser;

impl MetadataParser {
    /// Unique type names declared by the document, in document order.
    pub fn parse_qualified_class_names(
        xml: &str,
    ) -> std::result::Result<Vec<String>, roxmltree::Error> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;

        let nested = Self::parse_nested(&doc);
        if !nested.is_empty() {
            return Ok(nested);
        }
        Ok(Self::parse_flat(&doc))
    }

    /// Reads and parses one metadata file.
    pub fn parse_file(path: &Path) -> Result<Vec<String>> {
        let xml = std::fs::read_to_string(path).map_err(|e| Error::Discovery {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let names = Self::parse_qualified_class_names(&xml).map_err(|e| Error::Discovery {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("{} declares {} types", path.display(), names.len());
        Ok(names)
    }

    fn parse_nested(doc: &Document) -> Vec<String> {
        let mut names = Vec::new();

        for root_name in NESTED_ROOT_ELEMENTS {
            for root in doc
                .descendants()
                .filter(|node| is_element_named(node, root_name))
            {
                for package in root.children().filter(|n| is_element_named(n, "package")) {
                    let Some(package_name) = package.attribute("name") else {
                        continue;
                    };
                    for class in package.children().filter(|n| is_element_named(n, "class")) {
                        if let Some(class_name) = class.attribute("name") {
                            push_unique(&mut names, format!("{package_name}.{class_name}"));
                        }
                    }
                }
            }
        }

        names
    }

    fn parse_flat(doc: &Document) -> Vec<String> {
        let root = doc.root_element();
        if !is_element_named(&root, FLAT_ROOT_ELEMENT) {
            return Vec::new();
        }

        let mut names = Vec::new();
        for type_element in FLAT_TYPE_ELEMENTS {
            for node in root.children().filter(|n| is_element_named(n, type_element)) {
                if let Some(class_name) = node.attribute("class") {
                    push_unique(&mut names, class_name.to_string());
                }
            }
        }
        names
    }
}

fn is_element_named(node: &Node, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name
}

fn push_unique(names: &mut Vec<String>, name: String) {
    if !names.contains(&name) {
        names.push(name);
    }
}
