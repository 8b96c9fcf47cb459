use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::host::ModuleRef;

/// Last-modified time of a target, captured when the unit is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
    modified: Option<SystemTime>,
}

impl Fingerprint {
    /// `None` inside when the file is missing or the platform has no mtime.
    pub fn capture(path: &Path) -> Self {
        let modified = std::fs::metadata(path).and_then(|m| m.modified()).ok();
        Self { modified }
    }

    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    MetadataFile,
    ClassFile,
}

/// A single tracked (target file, fingerprint) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingUnit {
    pub module: ModuleRef,
    pub target: PathBuf,
    pub kind: TargetKind,
    /// Set for class targets.
    pub class_name: Option<String>,
    /// The unit came from an annotated type rather than a metadata file.
    pub annotation_based: bool,
    pub fingerprint: Fingerprint,
}

impl ProcessingUnit {
    pub fn metadata_file(module: ModuleRef, target: PathBuf) -> Self {
        let fingerprint = Fingerprint::capture(&target);
        Self {
            module,
            target,
            kind: TargetKind::MetadataFile,
            class_name: None,
            annotation_based: false,
            fingerprint,
        }
    }

    pub fn class_file(
        module: ModuleRef,
        target: PathBuf,
        class_name: String,
        annotation_based: bool,
    ) -> Self {
        let fingerprint = Fingerprint::capture(&target);
        Self {
            module,
            target,
            kind: TargetKind::ClassFile,
            class_name: Some(class_name),
            annotation_based,
            fingerprint,
        }
    }

    /// Fingerprint of the target as it is on disk now.
    pub fn current_fingerprint(&self) -> Fingerprint {
        Fingerprint::capture(&self.target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_fingerprint_follows_mtime() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Foo.class");
        std::fs::write(&path, b"v1").unwrap();

        let unit = ProcessingUnit::class_file(ModuleRef::new("core"), path.clone(), "Foo".into(), false);
        assert_eq!(unit.fingerprint, unit.current_fingerprint());

        let later = SystemTime::now() + Duration::from_secs(60);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(later)
            .unwrap();
        assert_ne!(unit.fingerprint, unit.current_fingerprint());
    }

    #[test]
    fn test_missing_file_has_empty_fingerprint() {
        assert_eq!(Fingerprint::capture(Path::new("/no/such/file")).modified(), None);
    }
}
