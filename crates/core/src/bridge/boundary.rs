//! Per-module disposable execution boundary.

use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tempfile::TempDir;
use tracing::debug;

use crate::error::{Error, Result};
use crate::host::ModuleRef;
use crate::types::class_file_path;

const ARCHIVE_EXTENSIONS: [&str; 2] = ["jar", "zip"];

static NEXT_BOUNDARY_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one boundary; never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BoundaryId(u64);

impl BoundaryId {
    fn next() -> Self {
        Self(NEXT_BOUNDARY_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BoundaryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "boundary-{}", self.0)
    }
}

/// The classpath the enhancer sees for one module: runtime entries, the module's
/// compiled output and its library archives. Nothing else from the build is visible.
///
/// Built for a single module and a single enhancement, then dropped. Not `Clone`.
#[derive(Debug)]
pub struct IsolationBoundary {
    id: BoundaryId,
    module: ModuleRef,
    runtime: Vec<PathBuf>,
    output_dirs: Vec<PathBuf>,
    libraries: Vec<PathBuf>,
    scratch: TempDir,
}

impl IsolationBoundary {
    /// `library_classpath` may contain anything the host reports; directories and
    /// other non-archive entries are dropped.
    pub fn new(
        module: ModuleRef,
        runtime: Vec<PathBuf>,
        output_dirs: Vec<PathBuf>,
        library_classpath: Vec<PathBuf>,
    ) -> Result<Self> {
        let mut libraries = Vec::new();
        for entry in library_classpath {
            if is_archive(&entry) && !libraries.contains(&entry) {
                libraries.push(entry);
            } else {
                debug!("{}: dropping classpath entry {}", module, entry.display());
            }
        }

        let scratch = tempfile::Builder::new()
            .prefix("enhancer-runner-")
            .tempdir()?;
        let id = BoundaryId::next();
        debug!(
            "{} for module {}: {} runtime, {} output, {} library entries",
            id,
            module,
            runtime.len(),
            output_dirs.len(),
            libraries.len()
        );

        Ok(Self {
            id,
            module,
            runtime,
            output_dirs,
            libraries,
            scratch,
        })
    }

    pub fn id(&self) -> BoundaryId {
        self.id
    }

    pub fn module(&self) -> &ModuleRef {
        &self.module
    }

    pub fn output_dirs(&self) -> &[PathBuf] {
        &self.output_dirs
    }

    pub fn libraries(&self) -> &[PathBuf] {
        &self.libraries
    }

    /// Private temp directory handed to the enhancer process.
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Runtime entries, then module output, then libraries.
    pub fn classpath(&self) -> Vec<&Path> {
        self.runtime
            .iter()
            .chain(&self.output_dirs)
            .chain(&self.libraries)
            .map(PathBuf::as_path)
            .collect()
    }

    /// The classpath joined with the platform separator.
    pub fn classpath_string(&self) -> Result<OsString> {
        std::env::join_paths(self.classpath()).map_err(|e| {
            Error::invocation(self.module.name(), format!("invalid classpath entry: {e}"))
        })
    }

    /// Whether `class_name` can be loaded from inside the boundary.
    pub fn contains_type(&self, class_name: &str) -> bool {
        let entry_name = format!("{}.class", class_name.replace('.', "/"));
        self.classpath().into_iter().any(|entry| {
            if entry.is_dir() {
                class_file_path(entry, class_name).is_some_and(|path| path.is_file())
            } else if is_archive(entry) {
                archive_contains(entry, &entry_name)
            } else {
                false
            }
        })
    }

    /// Removes the scratch directory.
    pub fn teardown(self) -> Result<()> {
        debug!("Tearing down {} for module {}", self.id, self.module);
        self.scratch.close()?;
        Ok(())
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
        && !path.is_dir()
}

fn archive_contains(archive: &Path, entry_name: &str) -> bool {
    let Ok(file) = File::open(archive) else {
        return false;
    };
    match zip::ZipArchive::new(file) {
        Ok(zip) => zip.file_names().any(|name| name == entry_name),
        Err(e) => {
            debug!("Unreadable archive {}: {}", archive.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_jar(path: &Path, entries: &[&str]) {
        let file = File::create(path).unwrap();
        let mut jar = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Stored);
        for entry in entries {
            jar.start_file(*entry, options).unwrap();
            jar.write_all(b"\xca\xfe\xba\xbe").unwrap();
        }
        jar.finish().unwrap();
    }

    #[test]
    fn test_library_directories_are_dropped() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let other_output = temp_dir.path().join("other/classes");
        std::fs::create_dir_all(&other_output)?;
        let jar = temp_dir.path().join("lib.jar");
        write_jar(&jar, &[]);

        let boundary = IsolationBoundary::new(
            ModuleRef::new("core"),
            vec![],
            vec![temp_dir.path().join("core/classes")],
            vec![other_output, jar.clone(), jar.clone()],
        )?;
        assert_eq!(boundary.libraries(), [jar]);
        assert_eq!(boundary.classpath().len(), 2);
        Ok(())
    }

    #[test]
    fn test_contains_type_in_directories_and_jars() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let output = temp_dir.path().join("classes");
        std::fs::create_dir_all(output.join("a"))?;
        std::fs::write(output.join("a/Foo.class"), "")?;
        let jar = temp_dir.path().join("openjpa.jar");
        write_jar(&jar, &["org/apache/openjpa/enhance/PCEnhancer.class"]);

        let boundary =
            IsolationBoundary::new(ModuleRef::new("core"), vec![], vec![output], vec![jar])?;
        assert!(boundary.contains_type("a.Foo"));
        assert!(boundary.contains_type("org.apache.openjpa.enhance.PCEnhancer"));
        assert!(!boundary.contains_type("org.apache.openjpa.enhance.Missing"));
        Ok(())
    }

    #[test]
    fn test_each_boundary_is_distinct_and_torn_down() -> Result<()> {
        let first = IsolationBoundary::new(ModuleRef::new("a"), vec![], vec![], vec![])?;
        let second = IsolationBoundary::new(ModuleRef::new("a"), vec![], vec![], vec![])?;
        assert_ne!(first.id(), second.id());
        assert_ne!(first.scratch_dir(), second.scratch_dir());

        let scratch = first.scratch_dir().to_path_buf();
        assert!(scratch.is_dir());
        first.teardown()?;
        assert!(!scratch.exists());
        Ok(())
    }
}
