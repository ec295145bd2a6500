//! Domains module containing business logic organized by bounded contexts.
//!
//! The server currently exposes a single context, `tools`.

pub mod tools;
