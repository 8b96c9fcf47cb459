use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

pub const ANNOTATION_JPA_ENTITY: &str = "javax.persistence.Entity";
pub const ANNOTATION_JPA_MAPPED_SUPERCLASS: &str = "javax.persistence.MappedSuperclass";
pub const ANNOTATION_JPA_EMBEDDABLE: &str = "javax.persistence.Embeddable";

/// Persistence APIs an enhancer can be driven with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PersistenceApi {
    Hibernate,
    Jpa,
}

impl PersistenceApi {
    pub const ALL: [PersistenceApi; 2] = [PersistenceApi::Hibernate, PersistenceApi::Jpa];

    /// Annotations that mark a type as persistence relevant for this API.
    pub fn annotation_names(&self) -> &'static [&'static str] {
        match self {
            PersistenceApi::Hibernate => &[],
            PersistenceApi::Jpa => &[
                ANNOTATION_JPA_ENTITY,
                ANNOTATION_JPA_MAPPED_SUPERCLASS,
                ANNOTATION_JPA_EMBEDDABLE,
            ],
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PersistenceApi::Hibernate => "HIBERNATE",
            PersistenceApi::Jpa => "JPA",
        }
    }
}

impl fmt::Display for PersistenceApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PersistenceApi {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "HIBERNATE" => Ok(PersistenceApi::Hibernate),
            "JPA" => Ok(PersistenceApi::Jpa),
            other => Err(Error::ConfigError(format!(
                "Unknown persistence api: {other}"
            ))),
        }
    }
}
