//! # Ziggurat Core
//!
//! Core types and definitions shared by the Ziggurat compiler pipeline.
//!
//! This crate holds everything both the parser and the generators need to
//! agree on: the semantic AST ([`ast`]), the DSL-to-target type mapping
//! ([`types`]), identifier casing ([`casing`]), the standard audit and
//! temporal column names ([`audit`]), and the hub hash-key scheme
//! ([`hashkey`]).

pub mod ast;
pub mod audit;
pub mod casing;
pub mod hashkey;
pub mod types;
