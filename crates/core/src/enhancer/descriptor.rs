//! Describes one supported enhancer integration and how its members are bound.

use std::collections::HashMap;
use std::fmt;

use super::api::PersistenceApi;

/// Operations of the enhancer contract that resolve to a tool member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    AddMetadataFiles,
    AddClasses,
    Enhance,
    AddDefaultConstructor,
    EnforcePropertyRestrictions,
    UseTemporaryLoader,
    SelectApi,
}

impl Operation {
    /// Shape a member must have to be callable for this operation.
    pub fn expected_signature(&self) -> Signature {
        match self {
            Operation::AddMetadataFiles | Operation::AddClasses => Signature::Positional,
            Operation::Enhance => Signature::EntryPoint,
            Operation::AddDefaultConstructor
            | Operation::EnforcePropertyRestrictions
            | Operation::UseTemporaryLoader => Signature::KeyValue,
            Operation::SelectApi => Signature::SystemProperty,
        }
    }

    pub fn is_option(&self) -> bool {
        self.expected_signature() == Signature::KeyValue
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operation::AddMetadataFiles => "addMetadataFiles",
            Operation::AddClasses => "addClasses",
            Operation::Enhance => "enhance",
            Operation::AddDefaultConstructor => "addDefaultConstructor",
            Operation::EnforcePropertyRestrictions => "enforcePropertyRestrictions",
            Operation::UseTemporaryLoader => "tmpClassLoader",
            Operation::SelectApi => "persistenceApi",
        };
        f.write_str(name)
    }
}

/// How arguments reach a tool member.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signature {
    /// Values appended as plain arguments.
    Positional,
    /// `<name> <value>` pairs.
    KeyValue,
    /// Fully-qualified type launched inside the boundary.
    EntryPoint,
    /// `-D<name>=<value>` handed to the JVM before the entry point.
    SystemProperty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub signature: Signature,
}

impl Member {
    pub fn positional() -> Self {
        Self {
            name: String::new(),
            signature: Signature::Positional,
        }
    }

    pub fn key_value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: Signature::KeyValue,
        }
    }

    pub fn system_property(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            signature: Signature::SystemProperty,
        }
    }

    pub fn entry_point(type_name: impl Into<String>) -> Self {
        Self {
            name: type_name.into(),
            signature: Signature::EntryPoint,
        }
    }
}

/// Operation to member table of one integration.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    members: HashMap<Operation, Member>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, operation: Operation, member: Member) -> Self {
        self.members.insert(operation, member);
        self
    }

    pub fn unbind(mut self, operation: Operation) -> Self {
        self.members.remove(&operation);
        self
    }

    pub fn get(&self, operation: Operation) -> Option<&Member> {
        self.members.get(&operation)
    }
}

#[derive(Debug, Clone)]
pub struct EnhancerDescriptor {
    id: String,
    name: String,
    apis: Vec<PersistenceApi>,
    enhancer_class_names: Vec<String>,
    bindings: Bindings,
}

impl EnhancerDescriptor {
    /// `apis` must not be empty; its first element is the default API.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        apis: Vec<PersistenceApi>,
        enhancer_class_names: Vec<String>,
        bindings: Bindings,
    ) -> Self {
        let apis = if apis.is_empty() {
            vec![PersistenceApi::Jpa]
        } else {
            apis
        };
        Self {
            id: id.into(),
            name: name.into(),
            apis,
            enhancer_class_names,
            bindings,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn persistence_apis(&self) -> &[PersistenceApi] {
        &self.apis
    }

    pub fn is_supported(&self, api: PersistenceApi) -> bool {
        self.apis.contains(&api)
    }

    pub fn default_api(&self) -> PersistenceApi {
        self.apis[0]
    }

    /// Types whose presence on a module's classpath means the enhancer is available there.
    pub fn enhancer_class_names(&self) -> &[String] {
        &self.enhancer_class_names
    }

    /// Marker annotations of every supported API, in API order.
    pub fn annotation_names(&self) -> Vec<String> {
        let mut names = Vec::new();
        for api in &self.apis {
            for annotation in api.annotation_names() {
                if !names.iter().any(|n| n == annotation) {
                    names.push(annotation.to_string());
                }
            }
        }
        names
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }
}

impl PartialEq for EnhancerDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(apis: Vec<PersistenceApi>) -> EnhancerDescriptor {
        EnhancerDescriptor::new("TEST", "Test", apis, vec![], Bindings::new())
    }

    #[test]
    fn test_first_api_is_default() {
        let d = descriptor(vec![PersistenceApi::Hibernate, PersistenceApi::Jpa]);
        assert_eq!(d.default_api(), PersistenceApi::Hibernate);
        assert!(d.is_supported(PersistenceApi::Jpa));
    }

    #[test]
    fn test_annotation_names_union_supported_apis() {
        let d = descriptor(vec![PersistenceApi::Jpa, PersistenceApi::Hibernate]);
        assert_eq!(
            d.annotation_names(),
            vec![
                "javax.persistence.Entity",
                "javax.persistence.MappedSuperclass",
                "javax.persistence.Embeddable"
            ]
        );
        assert!(descriptor(vec![PersistenceApi::Hibernate])
            .annotation_names()
            .is_empty());
    }

    #[test]
    fn test_option_operations_expect_key_value() {
        assert!(Operation::UseTemporaryLoader.is_option());
        assert!(!Operation::AddClasses.is_option());
        assert_eq!(Operation::Enhance.expected_signature(), Signature::EntryPoint);
        assert!(!Operation::SelectApi.is_option());
        assert_eq!(
            Operation::SelectApi.expected_signature(),
            Signature::SystemProperty
        );
    }
}
