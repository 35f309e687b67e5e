//! The finished, queryable buffer structure.
//!
//! A [`BufferStructure`] owns every accessor, buffer view and buffer in flat
//! arenas. Ids map to arena indices, and adjacency (buffer -> views,
//! view -> accessors) is stored on the parent models. Exporters only read
//! from it.

mod report;

use std::collections::HashMap;
use std::ops::Range;

use crate::accessor::{AccessorData, ComponentBounds};
use crate::model::{
    AccessorIndex, AccessorModel, BufferIndex, BufferModel, BufferViewIndex, BufferViewModel,
};
use crate::util::{Error, Result};

/// Arena of accessors, buffer views and buffers plus their id maps.
#[derive(Clone, Debug, Default)]
pub struct BufferStructure {
    pub(crate) accessors: Vec<AccessorModel>,
    pub(crate) views: Vec<BufferViewModel>,
    pub(crate) buffers: Vec<BufferModel>,
    accessor_ids: HashMap<String, AccessorIndex>,
    view_ids: HashMap<String, BufferViewIndex>,
    buffer_ids: HashMap<String, BufferIndex>,
}

impl BufferStructure {
    pub(crate) fn add_accessor(&mut self, model: AccessorModel) -> Result<AccessorIndex> {
        let index = AccessorIndex(self.accessors.len());
        register(&mut self.accessor_ids, &model.id, index)?;
        self.accessors.push(model);
        Ok(index)
    }

    pub(crate) fn add_view(&mut self, model: BufferViewModel) -> Result<BufferViewIndex> {
        let index = BufferViewIndex(self.views.len());
        register(&mut self.view_ids, &model.id, index)?;
        self.views.push(model);
        Ok(index)
    }

    pub(crate) fn add_buffer(&mut self, model: BufferModel) -> Result<BufferIndex> {
        let index = BufferIndex(self.buffers.len());
        register(&mut self.buffer_ids, &model.id, index)?;
        self.buffers.push(model);
        Ok(index)
    }

    pub(crate) fn has_accessor_id(&self, id: &str) -> bool {
        self.accessor_ids.contains_key(id)
    }

    pub(crate) fn has_view_id(&self, id: &str) -> bool {
        self.view_ids.contains_key(id)
    }

    pub(crate) fn has_buffer_id(&self, id: &str) -> bool {
        self.buffer_ids.contains_key(id)
    }

    // === Entity access ===

    #[inline]
    pub fn accessor(&self, index: AccessorIndex) -> &AccessorModel {
        &self.accessors[index.0]
    }

    #[inline]
    pub fn buffer_view(&self, index: BufferViewIndex) -> &BufferViewModel {
        &self.views[index.0]
    }

    #[inline]
    pub fn buffer(&self, index: BufferIndex) -> &BufferModel {
        &self.buffers[index.0]
    }

    pub fn num_accessors(&self) -> usize {
        self.accessors.len()
    }

    pub fn num_buffer_views(&self) -> usize {
        self.views.len()
    }

    pub fn num_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// All accessors in creation order.
    pub fn accessors(&self) -> impl Iterator<Item = (AccessorIndex, &AccessorModel)> {
        self.accessors.iter().enumerate().map(|(i, a)| (AccessorIndex(i), a))
    }

    /// All buffer views in creation order.
    pub fn buffer_views(&self) -> impl Iterator<Item = (BufferViewIndex, &BufferViewModel)> {
        self.views.iter().enumerate().map(|(i, v)| (BufferViewIndex(i), v))
    }

    /// All buffers in creation order.
    pub fn buffers(&self) -> impl Iterator<Item = (BufferIndex, &BufferModel)> {
        self.buffers.iter().enumerate().map(|(i, b)| (BufferIndex(i), b))
    }

    // === Id lookup ===

    pub fn find_accessor(&self, id: &str) -> Option<AccessorIndex> {
        self.accessor_ids.get(id).copied()
    }

    pub fn find_buffer_view(&self, id: &str) -> Option<BufferViewIndex> {
        self.view_ids.get(id).copied()
    }

    pub fn find_buffer(&self, id: &str) -> Option<BufferIndex> {
        self.buffer_ids.get(id).copied()
    }

    // === Adjacency ===

    /// Accessors of a view in creation order.
    pub fn accessors_of(&self, view: BufferViewIndex) -> &[AccessorIndex] {
        &self.views[view.0].accessors
    }

    /// Views of a buffer in creation order.
    pub fn views_of(&self, buffer: BufferIndex) -> &[BufferViewIndex] {
        &self.buffers[buffer.0].views
    }

    pub fn view_of(&self, accessor: AccessorIndex) -> Option<BufferViewIndex> {
        self.accessors[accessor.0].buffer_view
    }

    pub fn buffer_of(&self, view: BufferViewIndex) -> Option<BufferIndex> {
        self.views[view.0].buffer
    }

    /// Absolute offset of an accessor inside its buffer, once packed.
    pub fn absolute_offset(&self, accessor: AccessorIndex) -> Option<usize> {
        let a = &self.accessors[accessor.0];
        let view = &self.views[a.buffer_view?.0];
        view.buffer?;
        Some(view.byte_offset + a.byte_offset)
    }

    /// Returns true if byte `index` of `buffer` is alignment padding.
    pub fn is_padding_byte_index(&self, buffer: BufferIndex, index: usize) -> bool {
        self.buffers[buffer.0].is_padding_byte_index(index)
    }

    // === Data access ===

    /// Indexer over an accessor's data.
    ///
    /// Reads from the packed buffer once the accessor has been placed, from
    /// the staged bytes before that.
    pub fn accessor_data(&self, accessor: AccessorIndex) -> Result<AccessorData<&[u8]>> {
        let a = &self.accessors[accessor.0];
        if let Some(view) = a.buffer_view.map(|v| &self.views[v.0]) {
            if let Some(buffer) = view.buffer {
                return AccessorData::new(
                    self.buffers[buffer.0].data.as_slice(),
                    view.byte_offset + a.byte_offset,
                    a.component_type,
                    a.element_type,
                    a.count,
                    Some(a.byte_stride),
                );
            }
        }
        a.staged_data()
            .ok_or_else(|| Error::NotPlaced(format!("accessor {} has no data", a.id)))
    }

    /// Per-component min/max of an accessor, `None` when it is empty.
    pub fn accessor_bounds(&self, accessor: AccessorIndex) -> Result<Option<ComponentBounds>> {
        Ok(self.accessor_data(accessor)?.bounds())
    }

    // === Invariants ===

    /// Re-check every layout invariant of the packed buffers.
    ///
    /// Checks accessor and view alignment, containment of accessors in views
    /// and views in buffers, that no two data regions overlap, and that the
    /// recorded padding is exactly the set of bytes not owned by any accessor.
    pub fn validate(&self) -> Result<()> {
        for (vi, view) in self.buffer_views() {
            for &ai in &view.accessors {
                let a = &self.accessors[ai.0];
                if a.buffer_view != Some(vi) {
                    return Err(Error::internal(format!(
                        "accessor {} is listed by view {} but linked elsewhere",
                        a.id, view.id
                    )));
                }
                check_accessor_in_view(a, view)?;
            }
        }

        for (bi, buffer) in self.buffers() {
            let mut data = Vec::new();
            for &vi in &buffer.views {
                let view = &self.views[vi.0];
                if view.buffer != Some(bi) {
                    return Err(Error::internal(format!(
                        "view {} is listed by buffer {} but linked elsewhere",
                        view.id, buffer.id
                    )));
                }
                if view.byte_offset % view.alignment != 0 {
                    return Err(Error::internal(format!(
                        "view {} offset {} is not a multiple of {}",
                        view.id, view.byte_offset, view.alignment
                    )));
                }
                if view.byte_offset + view.byte_length > buffer.data.len() {
                    return Err(Error::internal(format!(
                        "view {} ends past buffer {} ({} > {})",
                        view.id,
                        buffer.id,
                        view.byte_offset + view.byte_length,
                        buffer.data.len()
                    )));
                }
                for &ai in &view.accessors {
                    let a = &self.accessors[ai.0];
                    let start = view.byte_offset + a.byte_offset;
                    if start % a.alignment != 0 {
                        return Err(Error::internal(format!(
                            "accessor {} absolute offset {} is not a multiple of {}",
                            a.id, start, a.alignment
                        )));
                    }
                    let size = a.element_byte_size();
                    data.extend((0..a.count).map(|e| {
                        let begin = start + e * a.byte_stride;
                        begin..begin + size
                    }));
                }
            }

            data.retain(|r| !r.is_empty());
            data.sort_by_key(|r| r.start);
            for pair in data.windows(2) {
                if pair[0].end > pair[1].start {
                    return Err(Error::internal(format!(
                        "data ranges {:?} and {:?} overlap in buffer {}",
                        pair[0], pair[1], buffer.id
                    )));
                }
            }

            let gaps = complement(&data, buffer.data.len());
            if gaps.as_slice() != buffer.padding_ranges() {
                return Err(Error::internal(format!(
                    "buffer {} records padding {:?}, unowned bytes are {:?}",
                    buffer.id,
                    buffer.padding_ranges(),
                    gaps
                )));
            }
        }
        Ok(())
    }
}

fn register<I: Copy>(ids: &mut HashMap<String, I>, id: &str, index: I) -> Result<()> {
    if ids.contains_key(id) {
        return Err(Error::DuplicateId(id.to_string()));
    }
    ids.insert(id.to_string(), index);
    Ok(())
}

/// Alignment and containment of one accessor relative to its view.
pub(crate) fn check_accessor_in_view(a: &AccessorModel, view: &BufferViewModel) -> Result<()> {
    if a.byte_offset % a.alignment != 0 {
        return Err(Error::internal(format!(
            "accessor {} offset {} in view {} is not a multiple of {}",
            a.id, a.byte_offset, view.id, a.alignment
        )));
    }
    if view.alignment % a.alignment != 0 {
        return Err(Error::internal(format!(
            "view {} alignment {} does not satisfy accessor {} alignment {}",
            view.id, view.alignment, a.id, a.alignment
        )));
    }
    if a.byte_offset + a.byte_extent() > view.byte_length {
        return Err(Error::internal(format!(
            "accessor {} ends past view {} ({} > {})",
            a.id,
            view.id,
            a.byte_offset + a.byte_extent(),
            view.byte_length
        )));
    }
    Ok(())
}

/// Gaps between sorted, disjoint ranges within `[0, len)`, merged.
fn complement(sorted: &[Range<usize>], len: usize) -> Vec<Range<usize>> {
    let mut gaps = Vec::new();
    let mut cursor = 0;
    for r in sorted {
        if r.start > cursor {
            gaps.push(cursor..r.start);
        }
        cursor = cursor.max(r.end);
    }
    if cursor < len {
        gaps.push(cursor..len);
    }
    gaps
}
