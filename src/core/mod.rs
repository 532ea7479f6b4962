//! core
//!
//! Core domain types shared by the module and config layers.
//!
//! # Modules
//!
//! - [`context`] - Cancellable invocation context
//! - [`paths`] - Path validation and reserved module paths
//! - [`types`] - Strong types: ModuleIdentity, ModuleReference, ModulePin
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at construction time
//! - Pin lists are always sorted and unique by identity
//! - All validation is deterministic

pub mod context;
pub mod paths;
pub mod types;
