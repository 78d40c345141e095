//! Typed NQL filter construction and encoding
//!
//! Ghost endpoints accept an NQL expression in the `filter` query parameter.
//! This module provides a [`Filter`] tree with typed predicates and a
//! deterministic encoder, so callers compose filters structurally instead of
//! concatenating strings.

mod encode;
mod filter;

pub use filter::{DateUnit, Filter, Predicate, RelativeDate, Value};
