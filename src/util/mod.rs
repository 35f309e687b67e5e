//! Fundamental types used throughout the layout engine.
//!
//! - [`ComponentType`] / [`ComponentValue`] - numeric kinds of scalar values
//! - [`ElementType`] - element shapes and their byte sizes
//! - [`Error`] / [`Result`] - Error handling
//! - Alignment math and glam re-exports

mod component;
mod element;
mod error;
mod math;

pub use component::*;
pub use element::*;
pub use error::*;
pub use math::*;
