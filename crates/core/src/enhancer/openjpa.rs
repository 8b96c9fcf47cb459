//! Built-in OpenJPA integration.

use super::api::PersistenceApi;
use super::descriptor::{Bindings, EnhancerDescriptor, Member, Operation};

pub const OPENJPA_ID: &str = "OPENJPA";
pub const OPENJPA_NAME: &str = "OpenJpa";
pub const OPENJPA_ENHANCER_CLASS: &str = "org.apache.openjpa.enhance.PCEnhancer";
pub const OPENJPA_API_PROPERTY: &str = "openjpa.enhancer.PersistenceApi";

pub fn descriptor() -> EnhancerDescriptor {
    // PCEnhancer takes metadata files and class names as plain arguments and
    // options as `-name value` pairs. The selected API travels as a JVM property.
    let bindings = Bindings::new()
        .bind(Operation::Enhance, Member::entry_point(OPENJPA_ENHANCER_CLASS))
        .bind(Operation::AddMetadataFiles, Member::positional())
        .bind(Operation::AddClasses, Member::positional())
        .bind(
            Operation::AddDefaultConstructor,
            Member::key_value("-addDefaultConstructor"),
        )
        .bind(
            Operation::EnforcePropertyRestrictions,
            Member::key_value("-enforcePropertyRestrictions"),
        )
        .bind(Operation::UseTemporaryLoader, Member::key_value("-tmpClassLoader"))
        .bind(Operation::SelectApi, Member::system_property(OPENJPA_API_PROPERTY));

    EnhancerDescriptor::new(
        OPENJPA_ID,
        OPENJPA_NAME,
        vec![PersistenceApi::Jpa, PersistenceApi::Hibernate],
        vec![OPENJPA_ENHANCER_CLASS.to_string()],
        bindings,
    )
}
