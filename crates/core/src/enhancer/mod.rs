//! Enhancer integrations: persistence APIs, descriptors and their registry

pub mod api;
pub mod descriptor;
pub mod openjpa;
pub mod registry;

pub use api::PersistenceApi;
pub use descriptor::{Bindings, EnhancerDescriptor, Member, Operation, Signature};
pub use registry::EnhancerRegistry;
