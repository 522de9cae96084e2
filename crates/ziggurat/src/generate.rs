//! The artifact generators.
//!
//! Each generator is a pure function from the immutable semantic
//! [`Program`](ziggurat_core::ast::Program) to `Option<String>`. `None` is
//! the explicit no-op contract: nothing in the program feeds this back end,
//! so no artifact is produced — not an empty one. Generators never fail;
//! recoverable oddities (like unmapped types) are reported as `log` warnings
//! by the shared type mapper.

pub(crate) mod actors;
pub(crate) mod domain;
pub(crate) mod project;
pub(crate) mod schema;
pub(crate) mod view_models;
