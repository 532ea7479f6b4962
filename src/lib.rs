//! protomod - Module and configuration core for protobuf schema modules
//!
//! A *module* is an immutable set of `.proto` files plus the dependencies it
//! is pinned to. A module's configuration (`buf.mod`, or the legacy
//! `buf.yaml`) names it, declares its dependencies, and carries its build,
//! lint and breaking-change settings.
//!
//! # Architecture
//!
//! The codebase is layered:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates)
//! - [`module`] - The module aggregate, its wire payload and lock file
//! - [`config`] - Versioned configuration: provider, reader and writer
//! - [`storage`] - Bucket abstraction over memory and the filesystem
//! - [`core`] - Paths, identity and pin types, invocation context
//! - [`logging`] - Subscriber setup for the binary
//!
//! # Invariants
//!
//! 1. A constructed `Module` or `Config` is never partially valid
//! 2. Pin lists are sorted by identity and unique by identity
//! 3. Only `.proto` files are ever visible through a module
//! 4. Cancellation is reported as its own error, never as a domain error

pub mod cli;
pub mod config;
pub mod core;
pub mod logging;
pub mod module;
pub mod storage;
