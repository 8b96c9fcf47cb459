use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::host::ModuleRef;

pub const CLASS_FILE_EXTENSION: &str = "class";

/// Dot-separated Java identifiers, like `a.b.Foo` or `a.Outer$Inner`.
pub fn is_valid_class_name(class_name: &str) -> bool {
    !class_name.is_empty()
        && class_name.split('.').all(|segment| {
            let mut chars = segment.chars();
            chars
                .next()
                .is_some_and(|c| c.is_alphabetic() || c == '_' || c == '$')
                && chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
        })
}

/// Expected compiled-class path of a fully-qualified type below `output_dir`.
/// `None` when `class_name` is not a valid class name, so nothing outside
/// `output_dir` is ever addressed.
pub fn class_file_path(output_dir: &Path, class_name: &str) -> Option<PathBuf> {
    if !is_valid_class_name(class_name) {
        return None;
    }
    let mut path = output_dir.to_path_buf();
    let mut segments = class_name.split('.').peekable();
    while let Some(segment) = segments.next() {
        if segments.peek().is_some() {
            path.push(segment);
        } else {
            path.push(format!("{segment}.{CLASS_FILE_EXTENSION}"));
        }
    }
    Some(path)
}

/// First existing compiled-class file of `class_name` across `output_dirs`.
pub fn resolve_class_file(output_dirs: &[PathBuf], class_name: &str) -> Option<PathBuf> {
    output_dirs
        .iter()
        .filter_map(|dir| class_file_path(dir, class_name))
        .find(|path| path.is_file())
}

/// One discovered artifact: a declarative metadata file or a single annotated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataUnit {
    module: ModuleRef,
    annotation_based_only: bool,
    file: PathBuf,
    search_root: PathBuf,
    class_names: Vec<String>,
    /// Parallel to `class_names`; `None` when the type has no compiled output yet.
    class_files: Vec<Option<PathBuf>>,
}

impl MetadataUnit {
    /// Unit for a metadata file found under `search_root`. Names that are not
    /// valid class names are dropped. `None` when no type is left.
    pub fn declarative(
        module: ModuleRef,
        file: PathBuf,
        search_root: PathBuf,
        mut class_names: Vec<String>,
        output_dirs: &[PathBuf],
    ) -> Option<Self> {
        class_names.retain(|name| {
            let valid = is_valid_class_name(name);
            if !valid {
                debug!("Ignoring invalid class name {:?} in {}", name, file.display());
            }
            valid
        });
        if class_names.is_empty() {
            return None;
        }
        let class_files = class_names
            .iter()
            .map(|name| resolve_class_file(output_dirs, name))
            .collect();
        Some(Self {
            module,
            annotation_based_only: false,
            file,
            search_root,
            class_names,
            class_files,
        })
    }

    /// Unit for an annotated type. `None` unless the type has a compiled class
    /// file in one of `output_dirs`.
    pub fn annotated(module: ModuleRef, class_name: String, output_dirs: &[PathBuf]) -> Option<Self> {
        let (search_root, class_file) = output_dirs.iter().find_map(|dir| {
            let path = class_file_path(dir, &class_name)?;
            path.is_file().then(|| (dir.clone(), path))
        })?;
        Some(Self {
            module,
            annotation_based_only: true,
            file: class_file.clone(),
            search_root,
            class_names: vec![class_name],
            class_files: vec![Some(class_file)],
        })
    }

    pub fn module(&self) -> &ModuleRef {
        &self.module
    }

    pub fn is_annotation_based_only(&self) -> bool {
        self.annotation_based_only
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    pub fn class_names(&self) -> &[String] {
        &self.class_names
    }

    pub fn class_files(&self) -> &[Option<PathBuf>] {
        &self.class_files
    }

    /// Declared types that have a compiled class file, with that file.
    pub fn resolved_classes(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.class_names
            .iter()
            .zip(&self.class_files)
            .filter_map(|(name, file)| file.as_deref().map(|file| (name.as_str(), file)))
    }

    /// File name shown in listings.
    pub fn display_name(&self) -> String {
        self.file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Directory of the file relative to where it was found.
    pub fn display_path(&self) -> String {
        let relative = self
            .file
            .strip_prefix(&self.search_root)
            .unwrap_or(&self.file);
        relative
            .parent()
            .map(|parent| parent.to_string_lossy().replace('\\', "/"))
            .unwrap_or_default()
    }
}
