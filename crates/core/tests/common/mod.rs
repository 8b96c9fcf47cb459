//! Fake host collaborators shared by the integration tests.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use enhancer_runner_core::bridge::{Invocation, LaunchOutput, Launcher, context};
use enhancer_runner_core::enhancer::openjpa::OPENJPA_ENHANCER_CLASS;
use enhancer_runner_core::{BuildScope, CancelFlag, ModuleRef, Result, TypeSearch, class_file_path};
use tempfile::TempDir;

pub const ORM_FOO: &str = r#"<orm><package name="a.b"><class name="Foo"/></package></orm>"#;

#[derive(Default)]
struct FakeModule {
    output: Option<PathBuf>,
    test_output: Option<PathBuf>,
    libraries: Vec<PathBuf>,
    annotated: Vec<String>,
}

/// A multi-module build laid out in a temp directory.
pub struct Workspace {
    temp_dir: TempDir,
    order: Vec<String>,
    modules: HashMap<String, FakeModule>,
    affected: Option<Vec<String>>,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            order: Vec::new(),
            modules: HashMap::new(),
            affected: None,
        }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Adds a module with an output directory at `<root>/<name>/classes`.
    pub fn module(&mut self, name: &str) -> PathBuf {
        let output = self.root().join(name).join("classes");
        std::fs::create_dir_all(&output).unwrap();
        self.order.push(name.to_string());
        self.modules.insert(
            name.to_string(),
            FakeModule {
                output: Some(output.clone()),
                ..Default::default()
            },
        );
        output
    }

    /// Adds a module the host reports without any output directory.
    pub fn module_without_output(&mut self, name: &str) {
        self.order.push(name.to_string());
        self.modules.insert(name.to_string(), FakeModule::default());
    }

    pub fn output(&self, module: &str) -> PathBuf {
        self.modules[module].output.clone().unwrap()
    }

    /// Puts a jar with the enhancer entry point on the module's library classpath.
    pub fn with_enhancer(&mut self, module: &str) -> PathBuf {
        let jar = self.root().join("lib").join("openjpa.jar");
        if !jar.exists() {
            std::fs::create_dir_all(jar.parent().unwrap()).unwrap();
            let entry = format!("{}.class", OPENJPA_ENHANCER_CLASS.replace('.', "/"));
            write_jar(&jar, &[entry.as_str()]);
        }
        self.add_library(module, jar.clone());
        jar
    }

    pub fn add_library(&mut self, module: &str, entry: PathBuf) {
        self.modules.get_mut(module).unwrap().libraries.push(entry);
    }

    pub fn write_class(&self, module: &str, class_name: &str) -> PathBuf {
        let path = class_file_path(&self.output(module), class_name).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("bytecode of {class_name}")).unwrap();
        path
    }

    pub fn write_file(&self, module: &str, relative: &str, contents: &str) -> PathBuf {
        let path = self.output(module).join(relative);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Marks `class_name` as carrying `@javax.persistence.Entity` in `module`.
    pub fn annotate(&mut self, module: &str, class_name: &str) {
        self.modules
            .get_mut(module)
            .unwrap()
            .annotated
            .push(class_name.to_string());
    }

    pub fn set_affected(&mut self, modules: &[&str]) {
        self.affected = Some(modules.iter().map(|m| m.to_string()).collect());
    }
}

impl BuildScope for Workspace {
    fn affected_modules(&self) -> Vec<ModuleRef> {
        self.affected
            .as_ref()
            .unwrap_or(&self.order)
            .iter()
            .map(ModuleRef::new)
            .collect()
    }

    fn output_directory(&self, module: &ModuleRef, tests: bool) -> Option<PathBuf> {
        let fake = self.modules.get(module.name())?;
        if tests {
            fake.test_output.clone()
        } else {
            fake.output.clone()
        }
    }

    fn library_classpath(&self, module: &ModuleRef) -> Vec<PathBuf> {
        self.modules
            .get(module.name())
            .map(|m| m.libraries.clone())
            .unwrap_or_default()
    }
}

impl TypeSearch for Workspace {
    fn find_annotated_types(&self, module: &ModuleRef, annotation: &str) -> Result<Vec<String>> {
        if annotation != "javax.persistence.Entity" {
            return Ok(Vec::new());
        }
        Ok(self
            .modules
            .get(module.name())
            .map(|m| m.annotated.clone())
            .unwrap_or_default())
    }
}

pub fn write_jar(path: &Path, entries: &[&str]) {
    let mut jar = zip::ZipWriter::new(File::create(path).unwrap());
    let options =
        zip::write::SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
    for entry in entries {
        jar.start_file(*entry, options).unwrap();
        jar.write_all(b"\xca\xfe\xba\xbe").unwrap();
    }
    jar.finish().unwrap();
}

/// One recorded launch.
#[derive(Debug, Clone)]
pub struct Launch {
    pub invocation: Invocation,
    pub classpath: Vec<PathBuf>,
    pub had_context: bool,
}

impl Launch {
    pub fn args(&self) -> Vec<String> {
        self.invocation.arg_strings()
    }

    /// Arguments after the enhancer entry point.
    pub fn tool_args(&self) -> Vec<String> {
        let args = self.args();
        let start = args
            .iter()
            .position(|a| a == OPENJPA_ENHANCER_CLASS)
            .map(|i| i + 1)
            .unwrap_or(args.len());
        args[start..].to_vec()
    }
}

/// Stands in for the JVM: rewrites every class file named on the command line
/// that lives in a classpath directory, or fails for scripted modules.
#[derive(Default)]
pub struct RecordingLauncher {
    pub launches: RefCell<Vec<Launch>>,
    failures: RefCell<Vec<(PathBuf, LaunchOutput)>>,
    cancel_after_launch: Option<CancelFlag>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails every launch whose classpath contains `output_dir`.
    pub fn fail_for(self, output_dir: PathBuf, output: LaunchOutput) -> Self {
        self.failures.borrow_mut().push((output_dir, output));
        self
    }

    pub fn cancel_after_launch(mut self, flag: CancelFlag) -> Self {
        self.cancel_after_launch = Some(flag);
        self
    }

    pub fn count(&self) -> usize {
        self.launches.borrow().len()
    }

    pub fn launch_at(&self, index: usize) -> Launch {
        self.launches.borrow()[index].clone()
    }
}

impl Launcher for RecordingLauncher {
    fn launch(&self, invocation: &Invocation) -> io::Result<LaunchOutput> {
        let args = invocation.args.clone();
        let classpath: Vec<PathBuf> = args
            .iter()
            .position(|a| a == "-cp")
            .and_then(|i| args.get(i + 1))
            .map(|cp| std::env::split_paths(cp).collect())
            .unwrap_or_default();

        self.launches.borrow_mut().push(Launch {
            invocation: invocation.clone(),
            classpath: classpath.clone(),
            had_context: context::current().is_some(),
        });
        if let Some(flag) = &self.cancel_after_launch {
            flag.cancel();
        }

        for (dir, output) in self.failures.borrow().iter() {
            if classpath.contains(dir) {
                return Ok(output.clone());
            }
        }

        for arg in invocation.arg_strings() {
            for entry in classpath.iter().filter(|e| e.is_dir()) {
                let class_file = class_file_path(entry, &arg);
                if let Some(class_file) = class_file.filter(|p| p.is_file()) {
                    let mut bytes = std::fs::read(&class_file)?;
                    bytes.extend_from_slice(b" +enhanced");
                    std::fs::write(&class_file, bytes)?;
                }
            }
        }
        Ok(LaunchOutput::succeeded())
    }
}
