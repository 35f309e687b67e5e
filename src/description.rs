//! JSON layout descriptions.
//!
//! A description lists buffers, their views and the accessors inside each
//! view, with accessor values given as plain numbers:
//!
//! ```json
//! {
//!   "alignment": "minimal",
//!   "buffers": [{
//!     "uri": "mesh.bin",
//!     "views": [
//!       { "target": "ELEMENT_ARRAY_BUFFER",
//!         "accessors": [{ "componentType": "UNSIGNED_SHORT", "type": "SCALAR", "values": [0, 1, 2] }] },
//!       { "target": "ARRAY_BUFFER", "interleaved": true,
//!         "accessors": [{ "id": "POSITION", "componentType": "FLOAT", "type": "VEC3",
//!                         "values": [0, 0, 0, 1, 0, 0, 0, 1, 0] }] }
//!     ]
//!   }]
//! }
//! ```
//!
//! Creation order in the file is layout order in the packed buffers.

use serde::Deserialize;
use std::io::Read;

use crate::builder::{AccessorBatch, AlignmentPolicy, BufferStructureBuilder, ViewBatch};
use crate::model::Target;
use crate::structure::BufferStructure;
use crate::util::{Component, ComponentType, ElementType, Error, Result};

/// Named alignment presets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentPreset {
    #[default]
    Minimal,
    Gpu,
}

impl AlignmentPreset {
    pub fn policy(self) -> AlignmentPolicy {
        match self {
            Self::Minimal => AlignmentPolicy::minimal(),
            Self::Gpu => AlignmentPolicy::gpu_friendly(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutDescription {
    #[serde(default)]
    pub alignment: AlignmentPreset,
    pub buffers: Vec<BufferDescription>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BufferDescription {
    pub id: Option<String>,
    pub uri: Option<String>,
    pub views: Vec<ViewDescription>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewDescription {
    pub id: Option<String>,
    pub target: Option<String>,
    #[serde(default)]
    pub interleaved: bool,
    pub accessors: Vec<AccessorDescription>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessorDescription {
    pub id: Option<String>,
    pub component_type: String,
    #[serde(rename = "type")]
    pub element_type: String,
    pub values: Vec<f64>,
}

impl LayoutDescription {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Build and validate the described structure.
    pub fn build(&self) -> Result<BufferStructure> {
        let mut builder = BufferStructureBuilder::with_policy(self.alignment.policy());

        for buffer in &self.buffers {
            let mut views = ViewBatch::new();
            for view in &buffer.views {
                let mut batch = AccessorBatch::new();
                for accessor in &view.accessors {
                    add_accessor(&mut builder, &mut batch, accessor)?;
                }
                let target = view.target.as_deref().map(str::parse::<Target>).transpose()?;
                match (&view.id, view.interleaved) {
                    (Some(id), false) => {
                        builder.create_named_buffer_view_model(&mut views, id.as_str(), batch, target)?
                    }
                    (Some(id), true) => builder.create_named_interleaved_buffer_view_model(
                        &mut views,
                        id.as_str(),
                        batch,
                        target,
                    )?,
                    (None, false) => builder.create_buffer_view_model(&mut views, batch, target)?,
                    (None, true) => {
                        builder.create_interleaved_buffer_view_model(&mut views, batch, target)?
                    }
                };
            }
            match &buffer.id {
                Some(id) => builder.create_named_buffer_model(id.as_str(), views, buffer.uri.as_deref())?,
                None => builder.create_buffer_model(views, buffer.uri.as_deref())?,
            };
        }

        let structure = builder.build();
        structure.validate()?;
        Ok(structure)
    }
}

fn add_accessor(
    builder: &mut BufferStructureBuilder,
    batch: &mut AccessorBatch,
    accessor: &AccessorDescription,
) -> Result<()> {
    let component_type: ComponentType = accessor.component_type.parse()?;
    let element_type: ElementType = accessor.element_type.parse()?;
    let values = &accessor.values;
    match component_type {
        ComponentType::Int8 => push(builder, batch, accessor, element_type, &integers::<i8>(values)?),
        ComponentType::Uint8 => push(builder, batch, accessor, element_type, &integers::<u8>(values)?),
        ComponentType::Int16 => push(builder, batch, accessor, element_type, &integers::<i16>(values)?),
        ComponentType::Uint16 => push(builder, batch, accessor, element_type, &integers::<u16>(values)?),
        ComponentType::Uint32 => push(builder, batch, accessor, element_type, &integers::<u32>(values)?),
        ComponentType::Float32 => push(builder, batch, accessor, element_type, &floats(values)?),
    }
}

fn push<T: Component>(
    builder: &mut BufferStructureBuilder,
    batch: &mut AccessorBatch,
    accessor: &AccessorDescription,
    element_type: ElementType,
    values: &[T],
) -> Result<()> {
    match &accessor.id {
        Some(id) => builder.create_named_accessor_from_slice(batch, id.as_str(), element_type, values)?,
        None => builder.create_accessor_from_slice(batch, element_type, values)?,
    };
    Ok(())
}

/// Narrow JSON numbers to FLOAT, rejecting values outside the f32 range.
fn floats(values: &[f64]) -> Result<Vec<f32>> {
    values
        .iter()
        .map(|&v| {
            let f = v as f32;
            if !f.is_finite() {
                return Err(Error::invalid(format!(
                    "{v} is out of range for {}",
                    ComponentType::Float32
                )));
            }
            Ok(f)
        })
        .collect()
}

/// Convert JSON numbers to an integer component type, rejecting fractions
/// and out-of-range values.
fn integers<T>(values: &[f64]) -> Result<Vec<T>>
where
    T: Component + TryFrom<i64>,
{
    values
        .iter()
        .map(|&v| {
            if v.fract() != 0.0 || !v.is_finite() {
                return Err(Error::invalid(format!(
                    "{v} is not an integer {}",
                    T::COMPONENT_TYPE
                )));
            }
            T::try_from(v as i64).map_err(|_| {
                Error::invalid(format!("{v} is out of range for {}", T::COMPONENT_TYPE))
            })
        })
        .collect()
}
