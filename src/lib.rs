//! # glTF layout
//!
//! Packs typed numeric arrays (vertex positions, indices, matrices,
//! animation channels) into aligned glTF buffers, buffer views and
//! accessors, and reads them back through a strided indexer.
//!
//! ## Modules
//!
//! - [`util`] - Component/element types, alignment math, errors
//! - [`accessor`] - Strided accessor indexing and bounds
//! - [`model`] - Accessor, buffer view and buffer models
//! - [`structure`] - The finished, queryable buffer structure
//! - [`builder`] - Staged construction of a buffer structure
//! - [`description`] - JSON layout descriptions
//!
//! ## Example
//!
//! ```
//! use gltf_layout::prelude::*;
//!
//! let mut builder = BufferStructureBuilder::new();
//! let mut views = ViewBatch::new();
//!
//! let mut batch = AccessorBatch::new();
//! builder.create_accessor_from_slice(&mut batch, ElementType::Scalar, &[0u16, 1, 2])?;
//! builder.create_buffer_view_model(&mut views, batch, Some(Target::ElementArrayBuffer))?;
//!
//! let mut batch = AccessorBatch::new();
//! let positions = builder.create_vec3_accessor(&mut batch, &[Vec3::X, Vec3::Y, Vec3::Z, Vec3::ONE])?;
//! builder.create_buffer_view_model(&mut views, batch, Some(Target::ArrayBuffer))?;
//!
//! let buffer = builder.create_buffer_model(views, None)?;
//! let structure = builder.build();
//!
//! assert_eq!(structure.buffer(buffer).byte_length(), 56);
//! assert_eq!(structure.absolute_offset(positions), Some(8));
//! # Ok::<(), gltf_layout::Error>(())
//! ```

pub mod util;
pub mod accessor;
pub mod model;
pub mod structure;
pub mod builder;
pub mod description;

// Re-export commonly used types
pub use util::{ComponentType, ComponentValue, ElementType, Error, Result};
pub use builder::BufferStructureBuilder;
pub use structure::BufferStructure;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::util::{
        Component, ComponentType, ComponentValue, ElementType, Error, Mat4, Result, Vec2, Vec3,
        Vec4,
    };
    pub use crate::accessor::{AccessorData, ComponentBounds};
    pub use crate::model::{
        AccessorIndex, AccessorModel, BufferIndex, BufferModel, BufferViewIndex, BufferViewModel,
        Target,
    };
    pub use crate::structure::BufferStructure;
    pub use crate::builder::{AccessorBatch, AlignmentPolicy, BufferStructureBuilder, ViewBatch};
}
