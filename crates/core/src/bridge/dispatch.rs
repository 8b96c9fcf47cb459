//! Resolves contract operations to enhancer members and classifies failures.

use tracing::debug;

use super::boundary::IsolationBoundary;
use super::launcher::LaunchOutput;
use crate::enhancer::{EnhancerDescriptor, Member, Operation};
use crate::error::{Error, Result};

const MISSING_MAIN_CLASS: [&str; 2] = [
    "could not find or load main class",
    "java.lang.classnotfoundexception",
];
const MISSING_MEMBER: [&str; 2] = ["java.lang.nosuchmethoderror", "java.lang.nosuchfielderror"];

/// Diagnostic output of a failed enhancer run, kept as the error source.
#[derive(Debug, thiserror::Error)]
#[error("{text}")]
pub struct ToolDiagnostics {
    pub text: String,
}

/// Name and signature lookup for one descriptor inside one boundary.
pub struct Dispatcher<'a> {
    descriptor: &'a EnhancerDescriptor,
    boundary: &'a IsolationBoundary,
}

impl<'a> Dispatcher<'a> {
    pub fn new(descriptor: &'a EnhancerDescriptor, boundary: &'a IsolationBoundary) -> Self {
        Self {
            descriptor,
            boundary,
        }
    }

    fn module(&self) -> String {
        self.boundary.module().name().to_string()
    }

    /// The entry point, after checking that the enhancer's types are loadable
    /// inside the boundary.
    pub fn entry_point(&self) -> Result<&'a Member> {
        let member = self.resolve(Operation::Enhance)?;
        let required = self
            .descriptor
            .enhancer_class_names()
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(member.name.as_str()));

        for type_name in required {
            if !self.boundary.contains_type(type_name) {
                return Err(Error::ClasspathMissing {
                    module: self.module(),
                    type_name: type_name.to_string(),
                });
            }
        }
        Ok(member)
    }

    /// The member bound to `operation`, which must have the expected signature.
    pub fn resolve(&self, operation: Operation) -> Result<&'a Member> {
        let Some(member) = self.descriptor.bindings().get(operation) else {
            return Err(Error::IntegrationMismatch {
                module: self.module(),
                member: operation.to_string(),
                reason: format!("{} has no binding", self.descriptor.name()),
            });
        };

        let expected = operation.expected_signature();
        if member.signature != expected {
            return Err(Error::IntegrationMismatch {
                module: self.module(),
                member: operation.to_string(),
                reason: format!("expected {:?} member, found {:?}", expected, member.signature),
            });
        }
        Ok(member)
    }

    /// Like [`Self::resolve`] but for best-effort options: any mismatch means the
    /// option is skipped.
    pub fn resolve_option(&self, operation: Operation) -> Option<&'a Member> {
        match self.resolve(operation) {
            Ok(member) => Some(member),
            Err(e) => {
                debug!("Ignoring option {}: {}", operation, e);
                None
            }
        }
    }

    /// Maps a failed run to the error taxonomy.
    pub fn classify_failure(&self, entry_point: &Member, output: &LaunchOutput) -> Error {
        let stderr = output.stderr.to_lowercase();

        if MISSING_MAIN_CLASS.iter().any(|marker| stderr.contains(marker)) {
            return Error::ClasspathMissing {
                module: self.module(),
                type_name: entry_point.name.clone(),
            };
        }

        if let Some(line) = output
            .stderr
            .lines()
            .find(|line| MISSING_MEMBER.iter().any(|m| line.to_lowercase().contains(m)))
        {
            return Error::IntegrationMismatch {
                module: self.module(),
                member: entry_point.name.clone(),
                reason: line.trim().to_string(),
            };
        }

        let detail = match output.code {
            Some(code) => format!("exit status {code}"),
            None => "terminated by signal".to_string(),
        };
        let text = if output.stderr.trim().is_empty() {
            output.stdout.trim().to_string()
        } else {
            output.stderr.trim().to_string()
        };
        let source: Option<Box<dyn std::error::Error + Send + Sync>> = if text.is_empty() {
            None
        } else {
            Some(Box::new(ToolDiagnostics { text }))
        };
        Error::EnhancerInvocation {
            module: self.module(),
            detail,
            source,
        }
    }
}
