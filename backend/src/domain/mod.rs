//! # Domain Module
//!
//! Business rules for the flock register.
//!
//! - **models**: the `Animal` entity, its pedigree join and scan filters
//! - **pedigree**: resolving parent tags to internal ids
//! - **animal_service**: create/read/update/delete composed over storage,
//!   the resolver and the media store
//! - **commands**: inputs and results of the service, independent of the wire format
//!
//! ## Business Rules
//!
//! - Tags are unique as stored; lookups by tag ignore case
//! - Only females carry a pregnancy flag
//! - Unknown parent tags are rejected unless the lenient policy is configured
//! - Deleting an animal never touches its children
//! - A failed image upload leaves the image empty instead of failing the request

pub mod animal_service;
pub mod commands;
pub mod errors;
pub mod models;
pub mod pedigree;

pub use animal_service::AnimalService;
pub use commands::*;
pub use errors::{AnimalError, AnimalResult, ValidationError};
pub use pedigree::{ParentPolicy, PedigreeResolver};
