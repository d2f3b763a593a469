//! Schema descriptors, constructors, and combinators.
//!
//! A [`Schema`] describes one expected data shape. Build one with the
//! constructors in this module, refine it with the wrapper combinators, and
//! validate untyped input with [`Schema::parse`].
//!
//! # Key types
//!
//! - [`Schema`] - immutable descriptor handle
//! - [`StringConfig`] / [`NumberConfig`] - primitive constraints
//! - [`UnknownKeys`] - object policy for keys outside the shape
//! - [`Refined`] - outcomes a refinement predicate may report

pub mod build;
pub mod combinators;
pub mod extend;
pub mod parse;
pub mod types;

#[cfg(test)]
mod tests;

pub use build::{
    array, boolean, conditional, conditional_with, custom, discriminated_union, intersection,
    lazy, literal, number, number_with, object, object_with, record, string, string_with, tuple,
    union,
};
pub use extend::{merge, omit, partial, pick, required};
pub use types::{
    Metadata, NumberConfig, Refined, Schema, Shape, StringConfig, UnknownKeys,
};
