//! Configuration surfaces for mpp.
//!
//! Three inputs are read here: the field table (per-model tracer and
//! field metadata), the diagnostics table (output files and variable
//! bindings) and the initialization environment. Tables are YAML and are
//! walked key by key so a missing or malformed entry is reported by name
//! and position. Nothing in this crate acts on the tables.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod diag_table;
pub mod error;
pub mod field_table;
pub mod init;
mod yaml;

pub use diag_table::{DiagFile, DiagTable, DiagVar, Frequency, Reduction, TimeUnit, VarKind};
pub use error::ConfigError;
pub use field_table::{Attribute, FieldEntry, FieldTable};
pub use init::{CalendarType, InitConfig};
