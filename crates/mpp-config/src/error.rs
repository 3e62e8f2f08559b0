//! Configuration errors.

use std::error::Error;
use std::fmt;
use std::path::PathBuf;

use mpp_core::Severity;

/// Errors from reading field tables, diagnostics tables and the init
/// environment.
///
/// All of them are found locally and are recoverable: the caller can fix
/// the input and load again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A file could not be read.
    Io {
        /// The file.
        path: PathBuf,
        /// The OS error, rendered.
        message: String,
    },
    /// The text is not valid YAML, or does not fit a typed section.
    Yaml {
        /// Parser message.
        message: String,
    },
    /// A required key is absent.
    MissingKey {
        /// The key.
        key: &'static str,
        /// Where it was expected, e.g. `field_table[0].modlist[1]`.
        context: String,
    },
    /// A key is present with an unusable value.
    InvalidValue {
        /// The key.
        key: String,
        /// Where it was found.
        context: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    /// Severity of this error; always [`Severity::Warning`].
    pub fn severity(&self) -> Severity {
        Severity::Warning
    }

    pub(crate) fn invalid(key: impl Into<String>, context: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            context: context.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {}: {message}", path.display()),
            Self::Yaml { message } => write!(f, "malformed YAML: {message}"),
            Self::MissingKey { key, context } => {
                write!(f, "missing required key '{key}' in {context}")
            }
            Self::InvalidValue {
                key,
                context,
                reason,
            } => write!(f, "invalid value for '{key}' in {context}: {reason}"),
        }
    }
}

impl Error for ConfigError {}

impl From<serde_yaml::Error> for ConfigError {
    fn from(e: serde_yaml::Error) -> Self {
        Self::Yaml {
            message: e.to_string(),
        }
    }
}
