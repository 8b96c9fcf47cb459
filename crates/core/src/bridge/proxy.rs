use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use super::EnhancerProxy;
use super::boundary::IsolationBoundary;
use super::context;
use super::dispatch::Dispatcher;
use super::launcher::{Invocation, Launcher};
use crate::config::{EnhancerOptions, LauncherSettings};
use crate::enhancer::{EnhancerDescriptor, Member, Operation, PersistenceApi};
use crate::error::{Error, Result};
use crate::types::resolve_class_file;

/// Enhancer bound to one boundary. Collects registrations, then launches once.
pub struct IsolatedEnhancer<'a> {
    descriptor: Arc<EnhancerDescriptor>,
    boundary: IsolationBoundary,
    launcher: &'a dyn Launcher,
    settings: &'a LauncherSettings,
    entry_point: Member,
    api_property: Option<String>,
    metadata_files: Vec<PathBuf>,
    classes: Vec<String>,
    option_args: Vec<String>,
}

impl<'a> IsolatedEnhancer<'a> {
    /// Fails with [`Error::ClasspathMissing`] when the enhancer cannot be loaded
    /// inside `boundary`. `api` is handed to the tool when the integration binds it.
    pub fn open(
        descriptor: Arc<EnhancerDescriptor>,
        boundary: IsolationBoundary,
        api: PersistenceApi,
        launcher: &'a dyn Launcher,
        settings: &'a LauncherSettings,
    ) -> Result<Self> {
        let (entry_point, api_property) = {
            let dispatcher = Dispatcher::new(&descriptor, &boundary);
            let entry_point = dispatcher.entry_point()?.clone();
            let api_property = dispatcher
                .resolve_option(Operation::SelectApi)
                .map(|member| format!("-D{}={}", member.name, api.name()));
            (entry_point, api_property)
        };
        debug!(
            "{} enhancer ({}) for module {} in {}",
            descriptor.name(),
            api,
            boundary.module(),
            boundary.id()
        );
        Ok(Self {
            descriptor,
            boundary,
            launcher,
            settings,
            entry_point,
            api_property,
            metadata_files: Vec::new(),
            classes: Vec::new(),
            option_args: Vec::new(),
        })
    }

    pub fn boundary(&self) -> &IsolationBoundary {
        &self.boundary
    }

    fn dispatcher(&self) -> Dispatcher<'_> {
        Dispatcher::new(&self.descriptor, &self.boundary)
    }

    fn is_empty(&self) -> bool {
        self.metadata_files.is_empty() && self.classes.is_empty()
    }

    fn invocation(&self) -> Result<Invocation> {
        let classpath = self.boundary.classpath_string()?;
        let mut tmp_dir = OsString::from("-Djava.io.tmpdir=");
        tmp_dir.push(self.boundary.scratch_dir());

        Ok(Invocation::new(&self.settings.java)
            .args(&self.settings.jvm_args)
            .arg(tmp_dir)
            .args(&self.api_property)
            .arg("-cp")
            .arg(classpath)
            .arg(&self.entry_point.name)
            .args(&self.option_args)
            .args(&self.metadata_files)
            .args(&self.classes)
            .with_working_dir(self.boundary.scratch_dir().to_path_buf()))
    }

    fn run(&self) -> Result<usize> {
        let module = self.boundary.module().name().to_string();
        let class_files: Vec<PathBuf> = self
            .classes
            .iter()
            .filter_map(|name| resolve_class_file(self.boundary.output_dirs(), name))
            .collect();
        let before: Vec<Option<String>> = class_files.iter().map(|path| digest(path)).collect();

        let invocation = self.invocation()?;
        let launched = {
            let _context = context::enter(self.boundary.id());
            self.launcher.launch(&invocation)
        };

        let output = launched.map_err(|e| Error::EnhancerInvocation {
            module: module.clone(),
            detail: format!("could not start {}", invocation.program.display()),
            source: Some(Box::new(e)),
        })?;
        if !output.success {
            return Err(self.dispatcher().classify_failure(&self.entry_point, &output));
        }
        if !output.stdout.trim().is_empty() {
            debug!("{} output:\n{}", self.descriptor.name(), output.stdout.trim_end());
        }

        let enhanced = class_files
            .iter()
            .zip(before)
            .filter(|(path, before)| digest(path) != *before)
            .count();
        info!("Module {}: {} of {} classes enhanced", module, enhanced, class_files.len());
        Ok(enhanced)
    }
}

impl EnhancerProxy for IsolatedEnhancer<'_> {
    fn add_metadata_files(&mut self, paths: &[&Path]) -> Result<()> {
        self.dispatcher().resolve(Operation::AddMetadataFiles)?;
        for path in paths {
            if !self.metadata_files.iter().any(|p| p == path) {
                self.metadata_files.push(path.to_path_buf());
            }
        }
        Ok(())
    }

    fn add_classes(&mut self, class_names: &[&str]) -> Result<()> {
        self.dispatcher().resolve(Operation::AddClasses)?;
        for name in class_names {
            if !self.classes.iter().any(|c| c == name) {
                self.classes.push(name.to_string());
            }
        }
        Ok(())
    }

    fn configure(&mut self, options: &EnhancerOptions) {
        let toggles = [
            (Operation::AddDefaultConstructor, options.add_default_constructor),
            (
                Operation::EnforcePropertyRestrictions,
                options.enforce_property_restrictions,
            ),
            (Operation::UseTemporaryLoader, options.use_temporary_loader),
        ];

        let mut args = Vec::new();
        {
            let dispatcher = self.dispatcher();
            for (operation, value) in toggles {
                if let Some(member) = dispatcher.resolve_option(operation) {
                    args.push(member.name.clone());
                    args.push(value.to_string());
                }
            }
        }
        self.option_args = args;
    }

    fn enhance(self) -> Result<usize> {
        if self.is_empty() {
            debug!("Nothing registered for module {}", self.boundary.module());
            self.boundary.teardown()?;
            return Ok(0);
        }

        let result = self.run();
        let teardown = self.boundary.teardown();
        let count = result?;
        teardown?;
        Ok(count)
    }
}

fn digest(path: &Path) -> Option<String> {
    let contents = std::fs::read(path).ok()?;
    Some(format!("{:x}", md5::compute(contents)))
}
