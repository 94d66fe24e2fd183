//! Core library for `SpecDock`.
//!
//! Contains the spec identifier type, the JSON/YAML document parser, the
//! shallow OpenAPI validator, and the [`SpecRegistry`](registry::SpecRegistry)
//! that ties them to a storage backend. This crate depends on
//! `specdock-storage` for the backend trait and knows nothing about HTTP.

pub mod document;
pub mod error;
pub mod registry;
pub mod spec_id;
pub mod validate;

pub use document::{SpecFormat, parse_document};
pub use error::{DocumentError, RegistryError, SpecIdError};
pub use registry::{SpecListing, SpecRecord, SpecRegistry};
pub use spec_id::SpecId;
pub use validate::{check_plausible_spec, is_plausible_spec};
