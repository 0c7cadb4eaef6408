//! Command merging and state sorting.
//!
//! [`DrawList::optimize`] merges runs of compatible draws into single
//! commands. [`DrawList::sort_commands`] reorders opaque draws between
//! barriers to group equal state, then repacks the arenas so a following
//! `optimize` can merge the regrouped draws.

use oflike_core::mesh::{PrimitiveTopology, Vertex2D, Vertex3D};

use crate::backend::Dimension;
use crate::draw_list::{DrawCommand, DrawList, DrawRange};
use crate::types::{BlendMode, LightSet, MaterialId, TextureHandle};

/// Whether `next` can be appended to `current`.
///
/// Both must be draws of the same dimension with identical state, a list
/// topology, and `next` must start where `current`'s vertices end.
pub fn can_merge(current: &DrawCommand, next: &DrawCommand) -> bool {
    let contiguous = |a: &DrawRange, b: &DrawRange| b.vertex_offset == a.vertex_end();
    match (current, next) {
        (DrawCommand::Draw2D(a), DrawCommand::Draw2D(b)) => {
            a.topology.is_list()
                && a.topology == b.topology
                && a.blend == b.blend
                && a.texture == b.texture
                && a.transform == b.transform
                && contiguous(&a.range, &b.range)
        }
        (DrawCommand::Draw3D(a), DrawCommand::Draw3D(b)) => {
            a.topology.is_list()
                && a.topology == b.topology
                && a.blend == b.blend
                && a.texture == b.texture
                && a.material == b.material
                && a.light_set == b.light_set
                && a.model == b.model
                && a.depth_test == b.depth_test
                && contiguous(&a.range, &b.range)
        }
        _ => false,
    }
}

/// A run of mergeable draws in the source list.
struct Group {
    first: usize,
    len: usize,
    indexed: bool,
    /// The run merged so far, checked against the next candidate.
    merged: DrawCommand,
}

impl DrawList {
    /// Merge adjacent compatible draws.
    ///
    /// The index arena is rebuilt in command order. When a merged run mixes
    /// indexed and non-indexed draws, the non-indexed ones get an identity
    /// index range. Applying `optimize` twice gives the same list as once.
    pub fn optimize(&mut self) {
        crate::profiling::profile_function!();
        let before = self.commands.len();

        let mut groups: Vec<Group> = Vec::new();
        for (i, command) in self.commands.iter().enumerate() {
            if let Some(group) = groups.last_mut() {
                if can_merge(&group.merged, command) {
                    let range = command.range().copied().unwrap_or_default();
                    if let Some(merged) = group.merged.range_mut() {
                        merged.vertex_count += range.vertex_count;
                    }
                    group.len += 1;
                    group.indexed |= range.is_indexed();
                    continue;
                }
            }
            groups.push(Group {
                first: i,
                len: 1,
                indexed: command.range().is_some_and(DrawRange::is_indexed),
                merged: *command,
            });
        }

        let mut commands = Vec::with_capacity(groups.len());
        let mut indices = Vec::with_capacity(self.indices.len());
        for group in &groups {
            let members = &self.commands[group.first..group.first + group.len];
            let mut command = members[0];
            if !command.is_draw() {
                commands.push(command);
                continue;
            }
            let Some(range) = command.range_mut() else {
                continue;
            };

            let index_offset = indices.len() as u32;
            let mut vertex_count = 0;
            for member in members {
                let Some(r) = member.range() else { continue };
                vertex_count += r.vertex_count;
                if !group.indexed {
                    continue;
                }
                if r.is_indexed() {
                    let start = r.index_offset as usize;
                    indices.extend_from_slice(&self.indices[start..start + r.index_count as usize]);
                } else {
                    indices.extend(r.vertex_offset..r.vertex_end());
                }
            }
            range.vertex_count = vertex_count;
            if group.indexed {
                range.index_offset = index_offset;
                range.index_count = indices.len() as u32 - index_offset;
            } else {
                range.index_offset = 0;
                range.index_count = 0;
            }
            commands.push(command);
        }

        self.commands = commands;
        self.indices = indices;
        log::debug!(
            "optimize: {} commands -> {}",
            before,
            self.commands.len()
        );
    }

    /// Reorder opaque draws between barriers to group equal state.
    ///
    /// State commands and non-opaque draws are barriers and keep their
    /// positions. Within a run the sort is stable on
    /// `(dimension, blend, texture, topology, material, light set)`. Vertex
    /// arenas are then repacked in command order.
    pub fn sort_commands(&mut self) {
        crate::profiling::profile_function!();
        let mut start = 0;
        while start < self.commands.len() {
            if !is_sortable(&self.commands[start]) {
                start += 1;
                continue;
            }
            let end = self.commands[start..]
                .iter()
                .position(|c| !is_sortable(c))
                .map_or(self.commands.len(), |p| start + p);
            self.commands[start..end].sort_by_key(sort_key);
            start = end;
        }
        self.repack();
    }

    /// Copy every draw's vertices into fresh arenas in command order and
    /// rewrite offsets and indices to match.
    fn repack(&mut self) {
        let mut vertices_2d: Vec<Vertex2D> = Vec::with_capacity(self.vertices_2d.len());
        let mut vertices_3d: Vec<Vertex3D> = Vec::with_capacity(self.vertices_3d.len());
        let mut indices = Vec::with_capacity(self.indices.len());

        for command in &mut self.commands {
            let dimension = command.dimension();
            let Some(range) = command.range_mut() else {
                continue;
            };
            let old_start = range.vertex_offset as usize;
            let old_end = range.vertex_end() as usize;
            let new_offset = match dimension {
                Some(Dimension::D2) => {
                    let offset = vertices_2d.len() as u32;
                    vertices_2d.extend_from_slice(&self.vertices_2d[old_start..old_end]);
                    offset
                }
                _ => {
                    let offset = vertices_3d.len() as u32;
                    vertices_3d.extend_from_slice(&self.vertices_3d[old_start..old_end]);
                    offset
                }
            };
            if range.is_indexed() {
                let index_offset = indices.len() as u32;
                let start = range.index_offset as usize;
                let old_offset = range.vertex_offset;
                indices.extend(
                    self.indices[start..start + range.index_count as usize]
                        .iter()
                        .map(|i| i - old_offset + new_offset),
                );
                range.index_offset = index_offset;
            }
            range.vertex_offset = new_offset;
        }

        self.vertices_2d = vertices_2d;
        self.vertices_3d = vertices_3d;
        self.indices = indices;
    }
}

fn is_sortable(command: &DrawCommand) -> bool {
    command.is_draw() && command.blend().is_some_and(|b| b.is_opaque())
}

type SortKey = (
    Option<Dimension>,
    Option<BlendMode>,
    Option<TextureHandle>,
    Option<PrimitiveTopology>,
    MaterialId,
    LightSet,
);

fn sort_key(command: &DrawCommand) -> SortKey {
    let (material, light_set, texture) = match command {
        DrawCommand::Draw3D(d) => (d.material, d.light_set, d.texture),
        DrawCommand::Draw2D(d) => (MaterialId::default(), LightSet::NONE, d.texture),
        _ => (MaterialId::default(), LightSet::NONE, None),
    };
    (
        command.dimension(),
        command.blend(),
        texture,
        command.topology(),
        material,
        light_set,
    )
}
