//! Configuration errors
//!
//! Loading catalogs and scenarios is the only fallible surface of the crate.
//! Runtime failures are values ([`crate::abilities::CastRejection`]) or silent
//! no-ops, never errors.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: String, message: String },

    #[error("duplicate ability id `{0}`")]
    DuplicateAbility(String),

    #[error("duplicate upgrade id `{0}`")]
    DuplicateUpgrade(String),

    #[error("ability `{id}`: {reason}")]
    InvalidAbility { id: String, reason: String },

    #[error("unknown ability `{0}`")]
    UnknownAbility(String),

    #[error("upgrade `{upgrade}` requires unknown upgrade `{missing}`")]
    UnknownPrerequisite { upgrade: String, missing: String },

    #[error("unknown upgrade `{0}`")]
    UnknownUpgrade(String),

    #[error("invalid scenario: {0}")]
    Scenario(String),
}

impl ConfigError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn parse(what: impl Into<String>, message: impl ToString) -> Self {
        ConfigError::Parse {
            what: what.into(),
            message: message.to_string(),
        }
    }
}
