//! Registry of supported enhancer integrations
//!
//! Descriptors are registered once at startup and looked up by id afterwards.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use super::descriptor::EnhancerDescriptor;
use super::openjpa;

/// Registry for enhancer descriptors
#[derive(Clone)]
pub struct EnhancerRegistry {
    descriptors: HashMap<String, Arc<EnhancerDescriptor>>,
    order: Vec<String>,
    default: Arc<EnhancerDescriptor>,
}

impl std::fmt::Debug for EnhancerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnhancerRegistry")
            .field("descriptors", &self.order)
            .field("default", &self.default.id())
            .finish()
    }
}

impl EnhancerRegistry {
    /// Create a new registry with the built-in descriptor registered
    pub fn new() -> Self {
        let default = Arc::new(openjpa::descriptor());
        let mut registry = Self {
            descriptors: HashMap::new(),
            order: Vec::new(),
            default: default.clone(),
        };
        registry.register(default);
        registry
    }

    /// Register a descriptor, replacing any previous one with the same id
    pub fn register(&mut self, descriptor: Arc<EnhancerDescriptor>) {
        let id = descriptor.id().to_string();
        if self.descriptors.insert(id.clone(), descriptor).is_none() {
            self.order.push(id);
        }
    }

    pub fn unregister(&mut self, id: &str) -> Option<Arc<EnhancerDescriptor>> {
        self.order.retain(|registered| registered != id);
        self.descriptors.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<Arc<EnhancerDescriptor>> {
        self.descriptors.get(id).cloned()
    }

    pub fn is_registered(&self, id: &str) -> bool {
        self.descriptors.contains_key(id)
    }

    /// The built-in descriptor; stays available even when unregistered.
    pub fn default_descriptor(&self) -> Arc<EnhancerDescriptor> {
        self.default.clone()
    }

    /// Registered descriptors in registration order
    pub fn descriptors(&self) -> Vec<Arc<EnhancerDescriptor>> {
        self.order
            .iter()
            .filter_map(|id| self.descriptors.get(id).cloned())
            .collect()
    }
}

impl Default for EnhancerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Process-wide registry, initialized with the built-in descriptor on first access.
pub fn global() -> &'static RwLock<EnhancerRegistry> {
    static GLOBAL: OnceLock<RwLock<EnhancerRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| RwLock::new(EnhancerRegistry::new()))
}

/// Copy of the process-wide registry for read-mostly use.
pub fn snapshot() -> EnhancerRegistry {
    match global().read() {
        Ok(registry) => registry.clone(),
        Err(poisoned) => poisoned.into_inner().clone(),
    }
}
