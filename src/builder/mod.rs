//! Buffer structure builder.
//!
//! Construction runs in three phases, each with its own explicit collection:
//!
//! 1. accessors are created into an [`AccessorBatch`];
//! 2. the batch is moved into [`BufferStructureBuilder::create_buffer_view_model`],
//!    which lays the accessors out inside one view and records the view in a
//!    [`ViewBatch`];
//! 3. the view batch is moved into [`BufferStructureBuilder::create_buffer_model`],
//!    which places the views, allocates the packed buffer and copies every
//!    accessor's bytes to its final offset.
//!
//! [`BufferStructureBuilder::build`] then hands out the finished
//! [`BufferStructure`]. Layout order is creation order at every level and all
//! padding is minimal under the active [`AlignmentPolicy`].
//!
//! The builder is single-threaded; use one builder per thread.

mod policy;


pub use policy::{AlignmentPolicy, INTERLEAVED_STRIDE_ALIGNMENT};

use smallvec::SmallVec;
use std::ops::Range;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, error, trace, warn};

use crate::accessor::AccessorData;
use crate::model::{
    AccessorIndex, AccessorModel, BufferIndex, BufferModel, BufferViewIndex, BufferViewModel,
    Target,
};
use crate::structure::{check_accessor_in_view, BufferStructure};
use crate::util::{
    align_up, element_byte_size, lcm, padding_for, Component, ComponentType, ElementType, Error,
    Mat4, Result, Vec2, Vec3, Vec4,
};

type PaddingRanges = SmallVec<[Range<usize>; 4]>;

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(0);

/// Accessors created since the last buffer view.
///
/// A batch belongs to the builder that first adds to it; any other builder
/// rejects it.
#[must_use = "accessors are only laid out once the batch is passed to create_buffer_view_model"]
#[derive(Debug, Default)]
pub struct AccessorBatch {
    accessors: Vec<AccessorIndex>,
    owner: Option<u64>,
}

impl AccessorBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accessors(&self) -> &[AccessorIndex] {
        &self.accessors
    }

    pub fn len(&self) -> usize {
        self.accessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accessors.is_empty()
    }
}

/// Buffer views created since the last buffer.
///
/// Like [`AccessorBatch`], bound to the builder that first adds to it.
#[must_use = "views are only placed once the batch is passed to create_buffer_model"]
#[derive(Debug, Default)]
pub struct ViewBatch {
    views: Vec<BufferViewIndex>,
    owner: Option<u64>,
}

impl ViewBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> &[BufferViewIndex] {
        &self.views
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Builds a [`BufferStructure`] from raw typed data.
#[derive(Debug)]
pub struct BufferStructureBuilder {
    id: u64,
    structure: BufferStructure,
    policy: AlignmentPolicy,
}

impl Default for BufferStructureBuilder {
    fn default() -> Self {
        Self::with_policy(AlignmentPolicy::default())
    }
}

impl BufferStructureBuilder {
    /// Create a builder with the minimal alignment policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a custom alignment policy.
    pub fn with_policy(policy: AlignmentPolicy) -> Self {
        Self {
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
            structure: BufferStructure::default(),
            policy,
        }
    }

    #[inline]
    pub fn policy(&self) -> &AlignmentPolicy {
        &self.policy
    }

    /// The structure assembled so far.
    #[inline]
    pub fn structure(&self) -> &BufferStructure {
        &self.structure
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Create an accessor from bytes already in element layout.
    ///
    /// `data` must hold exactly `count` elements, little-endian, with matrix
    /// column padding where the element type requires it.
    pub fn create_accessor_model(
        &mut self,
        batch: &mut AccessorBatch,
        component_type: ComponentType,
        element_type: ElementType,
        count: usize,
        data: Vec<u8>,
    ) -> Result<AccessorIndex> {
        let id = self.generate_id("accessor", self.structure.num_accessors(), |s, id| {
            s.has_accessor_id(id)
        });
        self.create_named_accessor_model(batch, id, component_type, element_type, count, data)
    }

    /// Like [`Self::create_accessor_model`] with a caller supplied id.
    pub fn create_named_accessor_model(
        &mut self,
        batch: &mut AccessorBatch,
        id: impl Into<String>,
        component_type: ComponentType,
        element_type: ElementType,
        count: usize,
        data: Vec<u8>,
    ) -> Result<AccessorIndex> {
        let id = id.into();
        self.claim(&mut batch.owner, "accessor batch")?;
        let element_size = element_byte_size(component_type, element_type);
        let expected = count.checked_mul(element_size).ok_or_else(|| {
            Error::invalid(format!(
                "accessor {id}: {count} {element_type}/{component_type} elements overflow the address space"
            ))
        })?;
        if data.is_empty() && count > 0 {
            return Err(Error::invalid(format!(
                "accessor {id}: empty data for {count} {element_type} elements"
            )));
        }
        if data.len() != expected {
            return Err(Error::invalid(format!(
                "accessor {id}: {} bytes given, {count} {element_type}/{component_type} elements need {expected}",
                data.len()
            )));
        }

        let alignment = self.policy.accessor_alignment(component_type);
        let model = AccessorModel::new(id, component_type, element_type, count, alignment, data);
        let index = self.structure.add_accessor(model)?;
        trace!(
            "accessor {} \"{}\": {} {} x{} ({} bytes)",
            index,
            self.structure.accessor(index).id(),
            element_type,
            component_type,
            count,
            expected
        );
        batch.accessors.push(index);
        Ok(index)
    }

    /// Create an accessor from logical component values.
    ///
    /// `values` holds `numComponents` values per element, matrices in
    /// column-major order. Column padding is inserted as needed.
    pub fn create_accessor_from_slice<T: Component>(
        &mut self,
        batch: &mut AccessorBatch,
        element_type: ElementType,
        values: &[T],
    ) -> Result<AccessorIndex> {
        let id = self.generate_id("accessor", self.structure.num_accessors(), |s, id| {
            s.has_accessor_id(id)
        });
        self.create_named_accessor_from_slice(batch, id, element_type, values)
    }

    /// Like [`Self::create_accessor_from_slice`] with a caller supplied id.
    pub fn create_named_accessor_from_slice<T: Component>(
        &mut self,
        batch: &mut AccessorBatch,
        id: impl Into<String>,
        element_type: ElementType,
        values: &[T],
    ) -> Result<AccessorIndex> {
        let id = id.into();
        let n = element_type.num_components();
        if values.len() % n != 0 {
            return Err(Error::invalid(format!(
                "accessor {id}: {} values is not a multiple of {n} ({element_type})",
                values.len()
            )));
        }
        let count = values.len() / n;
        let component_type = T::COMPONENT_TYPE;

        let mut bytes = vec![0u8; count * element_byte_size(component_type, element_type)];
        let mut data = AccessorData::new(&mut bytes[..], 0, component_type, element_type, count, None)?;
        data.fill_from(values)?;

        self.create_named_accessor_model(batch, id, component_type, element_type, count, bytes)
    }

    /// FLOAT VEC2 accessor (texture coordinates).
    pub fn create_vec2_accessor(
        &mut self,
        batch: &mut AccessorBatch,
        values: &[Vec2],
    ) -> Result<AccessorIndex> {
        self.create_accessor_from_slice(batch, ElementType::Vec2, bytemuck::cast_slice::<Vec2, f32>(values))
    }

    /// FLOAT VEC3 accessor (positions, normals).
    pub fn create_vec3_accessor(
        &mut self,
        batch: &mut AccessorBatch,
        values: &[Vec3],
    ) -> Result<AccessorIndex> {
        self.create_accessor_from_slice(batch, ElementType::Vec3, bytemuck::cast_slice::<Vec3, f32>(values))
    }

    /// FLOAT VEC4 accessor (tangents, colors, rotations).
    pub fn create_vec4_accessor(
        &mut self,
        batch: &mut AccessorBatch,
        values: &[Vec4],
    ) -> Result<AccessorIndex> {
        self.create_accessor_from_slice(batch, ElementType::Vec4, bytemuck::cast_slice::<Vec4, f32>(values))
    }

    /// FLOAT MAT4 accessor (inverse bind matrices). glam is column-major
    /// like glTF, so no reordering is needed.
    pub fn create_mat4_accessor(
        &mut self,
        batch: &mut AccessorBatch,
        values: &[Mat4],
    ) -> Result<AccessorIndex> {
        self.create_accessor_from_slice(batch, ElementType::Mat4, bytemuck::cast_slice::<Mat4, f32>(values))
    }

    // ========================================================================
    // Buffer views
    // ========================================================================

    /// Lay out a batch of accessors one after another in a new buffer view.
    pub fn create_buffer_view_model(
        &mut self,
        views: &mut ViewBatch,
        accessors: AccessorBatch,
        target: Option<Target>,
    ) -> Result<BufferViewIndex> {
        let id = self.generate_view_id();
        self.create_named_buffer_view_model(views, id, accessors, target)
    }

    /// Like [`Self::create_buffer_view_model`] with a caller supplied id.
    pub fn create_named_buffer_view_model(
        &mut self,
        views: &mut ViewBatch,
        id: impl Into<String>,
        accessors: AccessorBatch,
        target: Option<Target>,
    ) -> Result<BufferViewIndex> {
        let id = id.into();
        self.check_view_inputs(&id, views, &accessors)?;

        let mut offsets = Vec::with_capacity(accessors.len());
        let mut padding = PaddingRanges::new();
        let mut cursor = 0;
        for &ai in &accessors.accessors {
            let a = self.structure.accessor(ai);
            let pad = padding_for(cursor, a.alignment());
            push_padding(&mut padding, cursor..cursor + pad);
            cursor += pad;
            offsets.push(cursor);
            cursor += a.data_byte_length();
        }

        self.finish_view(views, id, accessors, target, offsets, cursor, None, padding)
    }

    /// Interleave a batch of accessors into one buffer view.
    ///
    /// All accessors must have the same count. Element `i` of every accessor
    /// is stored in record `i`; inside a record each accessor starts at its
    /// own alignment, and the record stride is rounded up to a multiple of
    /// both the view alignment and [`INTERLEAVED_STRIDE_ALIGNMENT`].
    pub fn create_interleaved_buffer_view_model(
        &mut self,
        views: &mut ViewBatch,
        accessors: AccessorBatch,
        target: Option<Target>,
    ) -> Result<BufferViewIndex> {
        let id = self.generate_view_id();
        self.create_named_interleaved_buffer_view_model(views, id, accessors, target)
    }

    /// Like [`Self::create_interleaved_buffer_view_model`] with a caller supplied id.
    pub fn create_named_interleaved_buffer_view_model(
        &mut self,
        views: &mut ViewBatch,
        id: impl Into<String>,
        accessors: AccessorBatch,
        target: Option<Target>,
    ) -> Result<BufferViewIndex> {
        let id = id.into();
        self.check_view_inputs(&id, views, &accessors)?;

        let Some(&first) = accessors.accessors.first() else {
            return Err(Error::invalid(format!("interleaved view {id} has no accessors")));
        };
        let count = self.structure.accessor(first).count();
        if let Some(&odd) = accessors
            .accessors
            .iter()
            .find(|&&ai| self.structure.accessor(ai).count() != count)
        {
            return Err(Error::invalid(format!(
                "interleaved view {id}: accessor {} has {} elements, expected {count}",
                self.structure.accessor(odd).id(),
                self.structure.accessor(odd).count()
            )));
        }

        // Layout of one record
        let mut offsets = Vec::with_capacity(accessors.len());
        let mut record_padding = PaddingRanges::new();
        let mut cursor = 0;
        for &ai in &accessors.accessors {
            let a = self.structure.accessor(ai);
            let pad = padding_for(cursor, a.alignment());
            push_padding(&mut record_padding, cursor..cursor + pad);
            cursor += pad;
            offsets.push(cursor);
            cursor += a.element_byte_size();
        }
        let alignment = self.view_alignment(&accessors);
        let stride = align_up(cursor, lcm(alignment, INTERLEAVED_STRIDE_ALIGNMENT));
        push_padding(&mut record_padding, cursor..stride);

        let mut padding = PaddingRanges::new();
        for record in 0..count {
            let base = record * stride;
            for r in &record_padding {
                push_padding(&mut padding, base + r.start..base + r.end);
            }
        }

        self.finish_view(
            views,
            id,
            accessors,
            target,
            offsets,
            stride * count,
            Some(stride),
            padding,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_view(
        &mut self,
        views: &mut ViewBatch,
        id: String,
        accessors: AccessorBatch,
        target: Option<Target>,
        offsets: Vec<usize>,
        byte_length: usize,
        byte_stride: Option<usize>,
        padding: PaddingRanges,
    ) -> Result<BufferViewIndex> {
        let alignment = self.view_alignment(&accessors);
        let view = BufferViewModel {
            id,
            byte_offset: 0,
            byte_length,
            byte_stride,
            target,
            alignment,
            buffer: None,
            accessors: accessors.accessors,
            padding,
        };
        let index = self.structure.add_view(view)?;

        let view = &self.structure.views[index.0];
        for (&ai, &offset) in view.accessors.iter().zip(&offsets) {
            let a = &mut self.structure.accessors[ai.0];
            a.byte_offset = offset;
            a.buffer_view = Some(index);
            if let Some(stride) = byte_stride {
                a.byte_stride = stride;
            }
        }

        let view = &self.structure.views[index.0];
        for &ai in &view.accessors {
            if let Err(e) = check_accessor_in_view(&self.structure.accessors[ai.0], view) {
                error!("layout fault in view {}: {}", view.id, e);
                return Err(e);
            }
        }

        debug!(
            "view {} \"{}\": {} accessors, {} bytes, align {}{}",
            index,
            view.id,
            view.accessors.len(),
            view.byte_length,
            view.alignment,
            byte_stride.map(|s| format!(", stride {s}")).unwrap_or_default()
        );
        views.views.push(index);
        Ok(index)
    }

    fn check_view_inputs(
        &self,
        id: &str,
        views: &mut ViewBatch,
        accessors: &AccessorBatch,
    ) -> Result<()> {
        self.check_owner(accessors.owner, "accessor batch")?;
        if self.structure.has_view_id(id) {
            return Err(Error::DuplicateId(id.to_string()));
        }
        self.claim(&mut views.owner, "view batch")?;
        for &ai in &accessors.accessors {
            let a = self.structure.accessor(ai);
            if let Some(view) = a.buffer_view() {
                return Err(Error::invalid(format!(
                    "accessor {} already belongs to view {}",
                    a.id(),
                    self.structure.buffer_view(view).id()
                )));
            }
        }
        Ok(())
    }

    fn view_alignment(&self, accessors: &AccessorBatch) -> usize {
        self.policy.view_alignment(
            accessors
                .accessors
                .iter()
                .map(|&ai| self.structure.accessor(ai).alignment()),
        )
    }

    fn generate_view_id(&self) -> String {
        self.generate_id("bufferView", self.structure.num_buffer_views(), |s, id| {
            s.has_view_id(id)
        })
    }

    // ========================================================================
    // Buffers
    // ========================================================================

    /// Place a batch of views one after another and pack their data.
    pub fn create_buffer_model(&mut self, views: ViewBatch, uri: Option<&str>) -> Result<BufferIndex> {
        let id = self.generate_id("buffer", self.structure.num_buffers(), |s, id| {
            s.has_buffer_id(id)
        });
        self.create_named_buffer_model(id, views, uri)
    }

    /// Like [`Self::create_buffer_model`] with a caller supplied id.
    pub fn create_named_buffer_model(
        &mut self,
        id: impl Into<String>,
        views: ViewBatch,
        uri: Option<&str>,
    ) -> Result<BufferIndex> {
        let id = id.into();
        self.check_owner(views.owner, "view batch")?;
        if self.structure.has_buffer_id(&id) {
            return Err(Error::DuplicateId(id));
        }
        for &vi in &views.views {
            let view = self.structure.buffer_view(vi);
            if let Some(buffer) = view.buffer() {
                return Err(Error::invalid(format!(
                    "view {} already belongs to buffer {}",
                    view.id(),
                    self.structure.buffer(buffer).id()
                )));
            }
            for &ai in view.accessors() {
                if self.structure.accessor(ai).staged.is_none() {
                    return Err(Error::internal(format!(
                        "accessor {} in view {} has no staged data",
                        self.structure.accessor(ai).id(),
                        view.id()
                    )));
                }
            }
        }

        // Place views
        let mut offsets = Vec::with_capacity(views.len());
        let mut padding = PaddingRanges::new();
        let mut cursor = 0;
        for &vi in &views.views {
            let view = self.structure.buffer_view(vi);
            let pad = padding_for(cursor, view.alignment());
            push_padding(&mut padding, cursor..cursor + pad);
            cursor += pad;
            offsets.push(cursor);
            for r in view.padding_ranges() {
                push_padding(&mut padding, cursor + r.start..cursor + r.end);
            }
            cursor += view.byte_length();
        }

        // Pack
        let mut data = vec![0u8; cursor];
        for (&vi, &view_offset) in views.views.iter().zip(&offsets) {
            let view = &mut self.structure.views[vi.0];
            view.byte_offset = view_offset;
            for &ai in &view.accessors {
                let a = &mut self.structure.accessors[ai.0];
                let staged = a.staged.take().unwrap_or_default();
                let start = view_offset + a.byte_offset;
                if view.byte_stride.is_none() {
                    data[start..start + staged.len()].copy_from_slice(&staged);
                } else {
                    let size = a.element_byte_size();
                    for (e, element) in staged.chunks_exact(size).enumerate() {
                        let dst = start + e * a.byte_stride;
                        data[dst..dst + size].copy_from_slice(element);
                    }
                }
                trace!("accessor \"{}\" packed at {}", a.id, start);
            }
        }

        for &vi in &views.views {
            let view = &self.structure.views[vi.0];
            if view.byte_offset % view.alignment != 0 {
                let e = Error::internal(format!(
                    "view {} offset {} is not a multiple of {}",
                    view.id, view.byte_offset, view.alignment
                ));
                error!("layout fault in buffer {}: {}", id, e);
                return Err(e);
            }
            for &ai in &view.accessors {
                let a = &self.structure.accessors[ai.0];
                let start = view.byte_offset + a.byte_offset;
                if start % a.alignment != 0 {
                    let e = Error::internal(format!(
                        "accessor {} absolute offset {} is not a multiple of {}",
                        a.id, start, a.alignment
                    ));
                    error!("layout fault in buffer {}: {}", id, e);
                    return Err(e);
                }
            }
        }

        let byte_length = data.len();
        let padding_bytes: usize = padding.iter().map(|r| r.len()).sum();
        let index = self.structure.add_buffer(BufferModel {
            id,
            uri: uri.map(str::to_string),
            data,
            views: views.views,
            padding,
        })?;
        for &vi in &self.structure.buffers[index.0].views {
            self.structure.views[vi.0].buffer = Some(index);
        }

        debug!(
            "buffer {} \"{}\": {} views, {} bytes ({} padding)",
            index,
            self.structure.buffer(index).id(),
            self.structure.views_of(index).len(),
            byte_length,
            padding_bytes
        );
        Ok(index)
    }

    // ========================================================================
    // Finish
    // ========================================================================

    /// Hand out the assembled structure.
    ///
    /// Accessors or views never grouped into a buffer stay in the structure
    /// without a parent; that is a caller error and only logged.
    pub fn build(self) -> BufferStructure {
        let loose_accessors = self
            .structure
            .accessors()
            .filter(|(_, a)| a.buffer_view().is_none())
            .count();
        let loose_views = self
            .structure
            .buffer_views()
            .filter(|(_, v)| v.buffer().is_none())
            .count();
        if loose_accessors > 0 || loose_views > 0 {
            warn!(
                "building with {} ungrouped accessors and {} ungrouped views",
                loose_accessors, loose_views
            );
        }
        self.structure
    }

    fn check_owner(&self, owner: Option<u64>, what: &str) -> Result<()> {
        match owner {
            Some(owner) if owner != self.id => Err(Error::invalid(format!(
                "{what} was filled by another builder"
            ))),
            _ => Ok(()),
        }
    }

    /// Bind a batch to this builder on first use.
    fn claim(&self, owner: &mut Option<u64>, what: &str) -> Result<()> {
        self.check_owner(*owner, what)?;
        *owner = Some(self.id);
        Ok(())
    }

    fn generate_id(
        &self,
        prefix: &str,
        start: usize,
        taken: impl Fn(&BufferStructure, &str) -> bool,
    ) -> String {
        let mut n = start;
        loop {
            let id = format!("{prefix}{n}");
            if !taken(&self.structure, &id) {
                return id;
            }
            n += 1;
        }
    }
}

/// Append a padding range, merging with the previous one when adjacent.
fn push_padding(padding: &mut PaddingRanges, range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    if let Some(last) = padding.last_mut() {
        if last.end == range.start {
            last.end = range.end;
            return;
        }
    }
    padding.push(range);
}
