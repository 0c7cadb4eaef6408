//! Recorded draw commands and the arenas they reference.
//!
//! A [`DrawList`] holds one frame of commands. Vertices go into per-dimension
//! arenas, indices into one shared arena. Commands only reference the arenas
//! through offsets and counts, and index values are absolute positions in
//! the vertex arena of the command's dimension.

use oflike_core::math::{Affine2, Mat4};
use oflike_core::mesh::{PrimitiveTopology, Vertex2D, Vertex3D};
use oflike_core::{Color, Material};

use crate::backend::Dimension;
use crate::lighting::LightSnapshot;
use crate::types::{BlendMode, LightSet, MaterialId, Rect, TextureHandle};

/// Arena ranges of a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DrawRange {
    pub vertex_offset: u32,
    pub vertex_count: u32,
    pub index_offset: u32,
    pub index_count: u32,
}

impl DrawRange {
    /// Non-indexed range.
    pub fn vertices(offset: u32, count: u32) -> Self {
        Self {
            vertex_offset: offset,
            vertex_count: count,
            ..Default::default()
        }
    }

    pub fn indexed(vertex_offset: u32, vertex_count: u32, index_offset: u32, index_count: u32) -> Self {
        Self {
            vertex_offset,
            vertex_count,
            index_offset,
            index_count,
        }
    }

    pub fn is_indexed(&self) -> bool {
        self.index_count > 0
    }

    /// Number of vertices the GPU will process.
    pub fn element_count(&self) -> u32 {
        if self.is_indexed() {
            self.index_count
        } else {
            self.vertex_count
        }
    }

    pub fn vertex_end(&self) -> u32 {
        self.vertex_offset + self.vertex_count
    }
}

/// A 2D draw. Geometry is already in screen space when recorded, so
/// `transform` is usually the identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw2D {
    pub range: DrawRange,
    pub topology: PrimitiveTopology,
    pub blend: BlendMode,
    pub texture: Option<TextureHandle>,
    pub transform: Affine2,
}

/// A 3D draw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Draw3D {
    pub range: DrawRange,
    pub topology: PrimitiveTopology,
    pub blend: BlendMode,
    pub texture: Option<TextureHandle>,
    pub material: MaterialId,
    pub light_set: LightSet,
    pub model: Mat4,
    pub depth_test: bool,
}

/// One recorded command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Draw2D(Draw2D),
    Draw3D(Draw3D),
    SetViewport { rect: Rect },
    /// `None` disables scissoring.
    SetScissor { rect: Option<Rect> },
    /// Only valid as the first command of a frame.
    SetClear { color: Color },
    /// Applies to every following 3D draw until replaced.
    SetCamera { view: Mat4, projection: Mat4 },
}

impl DrawCommand {
    pub fn is_draw(&self) -> bool {
        matches!(self, DrawCommand::Draw2D(_) | DrawCommand::Draw3D(_))
    }

    pub fn range(&self) -> Option<&DrawRange> {
        match self {
            DrawCommand::Draw2D(d) => Some(&d.range),
            DrawCommand::Draw3D(d) => Some(&d.range),
            _ => None,
        }
    }

    pub fn range_mut(&mut self) -> Option<&mut DrawRange> {
        match self {
            DrawCommand::Draw2D(d) => Some(&mut d.range),
            DrawCommand::Draw3D(d) => Some(&mut d.range),
            _ => None,
        }
    }

    pub fn dimension(&self) -> Option<Dimension> {
        match self {
            DrawCommand::Draw2D(_) => Some(Dimension::D2),
            DrawCommand::Draw3D(_) => Some(Dimension::D3),
            _ => None,
        }
    }

    pub fn topology(&self) -> Option<PrimitiveTopology> {
        match self {
            DrawCommand::Draw2D(d) => Some(d.topology),
            DrawCommand::Draw3D(d) => Some(d.topology),
            _ => None,
        }
    }

    pub fn blend(&self) -> Option<BlendMode> {
        match self {
            DrawCommand::Draw2D(d) => Some(d.blend),
            DrawCommand::Draw3D(d) => Some(d.blend),
            _ => None,
        }
    }
}

/// Reasons a command is rejected by [`DrawList::add_command`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawListError {
    #[error("vertex range {offset}..{end} exceeds {dimension:?} arena of {len}")]
    VertexRangeOutOfBounds {
        dimension: Dimension,
        offset: u32,
        end: u64,
        len: usize,
    },
    #[error("index range {offset}..{end} exceeds index arena of {len}")]
    IndexRangeOutOfBounds { offset: u32, end: u64, len: usize },
    #[error("index {index} at arena position {position} is outside vertex range {start}..{end}")]
    IndexOutsideRange {
        index: u32,
        position: usize,
        start: u32,
        end: u32,
    },
    #[error("{count} elements do not form whole {topology:?} primitives")]
    BadElementCount {
        topology: PrimitiveTopology,
        count: u32,
    },
    #[error("SetClear must be the first command, found at position {0}")]
    MisplacedClear(usize),
    #[error("unknown material {0:?}")]
    UnknownMaterial(MaterialId),
    #[error("unknown light snapshot {0}")]
    UnknownLightSnapshot(u32),
}

/// One frame of draw commands plus vertex, index and state tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawList {
    pub(crate) commands: Vec<DrawCommand>,
    pub(crate) vertices_2d: Vec<Vertex2D>,
    pub(crate) vertices_3d: Vec<Vertex3D>,
    pub(crate) indices: Vec<u32>,
    materials: Vec<Material>,
    light_snapshots: Vec<LightSnapshot>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a 2D vertex, returning its arena position.
    pub fn add_vertex_2d(&mut self, vertex: Vertex2D) -> u32 {
        let offset = self.vertices_2d.len() as u32;
        self.vertices_2d.push(vertex);
        offset
    }

    /// Append a 3D vertex, returning its arena position.
    pub fn add_vertex_3d(&mut self, vertex: Vertex3D) -> u32 {
        let offset = self.vertices_3d.len() as u32;
        self.vertices_3d.push(vertex);
        offset
    }

    /// Append an index, returning its arena position.
    pub fn add_index(&mut self, index: u32) -> u32 {
        let offset = self.indices.len() as u32;
        self.indices.push(index);
        offset
    }

    /// Append 2D vertices, returning the position of the first.
    pub fn extend_vertices_2d(&mut self, vertices: &[Vertex2D]) -> u32 {
        let offset = self.vertices_2d.len() as u32;
        self.vertices_2d.extend_from_slice(vertices);
        offset
    }

    /// Append 3D vertices, returning the position of the first.
    pub fn extend_vertices_3d(&mut self, vertices: &[Vertex3D]) -> u32 {
        let offset = self.vertices_3d.len() as u32;
        self.vertices_3d.extend_from_slice(vertices);
        offset
    }

    /// Append indices relative to `base`, returning the position of the
    /// first. Each stored index is `base + local`.
    pub fn extend_indices(&mut self, local: &[u32], base: u32) -> u32 {
        let offset = self.indices.len() as u32;
        self.indices.extend(local.iter().map(|i| base + i));
        offset
    }

    /// Validate and append a command.
    ///
    /// Draws with no elements are accepted and dropped.
    pub fn add_command(&mut self, command: DrawCommand) -> Result<(), DrawListError> {
        match &command {
            DrawCommand::SetClear { .. } if !self.commands.is_empty() => {
                return Err(DrawListError::MisplacedClear(self.commands.len()));
            }
            DrawCommand::Draw2D(d) => {
                if d.range.element_count() == 0 {
                    log::trace!("dropping empty 2D draw");
                    return Ok(());
                }
                self.validate_range(Dimension::D2, &d.range, d.topology)?;
            }
            DrawCommand::Draw3D(d) => {
                if d.range.element_count() == 0 {
                    log::trace!("dropping empty 3D draw");
                    return Ok(());
                }
                self.validate_range(Dimension::D3, &d.range, d.topology)?;
                if d.material.0 as usize >= self.materials.len() {
                    return Err(DrawListError::UnknownMaterial(d.material));
                }
                if d.light_set.is_lit() && d.light_set.snapshot as usize >= self.light_snapshots.len()
                {
                    return Err(DrawListError::UnknownLightSnapshot(d.light_set.snapshot));
                }
            }
            _ => {}
        }
        self.commands.push(command);
        Ok(())
    }

    fn validate_range(
        &self,
        dimension: Dimension,
        range: &DrawRange,
        topology: PrimitiveTopology,
    ) -> Result<(), DrawListError> {
        let len = match dimension {
            Dimension::D2 => self.vertices_2d.len(),
            Dimension::D3 => self.vertices_3d.len(),
        };
        let end = range.vertex_offset as u64 + range.vertex_count as u64;
        if end > len as u64 {
            return Err(DrawListError::VertexRangeOutOfBounds {
                dimension,
                offset: range.vertex_offset,
                end,
                len,
            });
        }
        if !topology.accepts_count(range.element_count() as usize) {
            return Err(DrawListError::BadElementCount {
                topology,
                count: range.element_count(),
            });
        }
        if range.is_indexed() {
            let index_end = range.index_offset as u64 + range.index_count as u64;
            if index_end > self.indices.len() as u64 {
                return Err(DrawListError::IndexRangeOutOfBounds {
                    offset: range.index_offset,
                    end: index_end,
                    len: self.indices.len(),
                });
            }
            let start = range.index_offset as usize;
            let slice = &self.indices[start..start + range.index_count as usize];
            if let Some((i, &index)) = slice
                .iter()
                .enumerate()
                .find(|&(_, &i)| i < range.vertex_offset || i >= range.vertex_end())
            {
                return Err(DrawListError::IndexOutsideRange {
                    index,
                    position: start + i,
                    start: range.vertex_offset,
                    end: range.vertex_end(),
                });
            }
        }
        Ok(())
    }

    /// Store a material snapshot. Equal snapshots share an id.
    pub fn intern_material(&mut self, material: Material) -> MaterialId {
        if let Some(i) = self.materials.iter().rposition(|m| *m == material) {
            return MaterialId(i as u32);
        }
        self.materials.push(material);
        MaterialId(self.materials.len() as u32 - 1)
    }

    pub fn material(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0 as usize)
    }

    /// Store a light snapshot and return the [`LightSet`] referring to it.
    /// An empty snapshot yields [`LightSet::NONE`].
    pub fn intern_lights(&mut self, snapshot: LightSnapshot) -> LightSet {
        let mask = snapshot.mask();
        if mask == 0 {
            return LightSet::NONE;
        }
        let index = match self.light_snapshots.iter().rposition(|s| *s == snapshot) {
            Some(i) => i,
            None => {
                self.light_snapshots.push(snapshot);
                self.light_snapshots.len() - 1
            }
        };
        LightSet {
            mask,
            snapshot: index as u32,
        }
    }

    pub fn light_snapshot(&self, index: u32) -> Option<&LightSnapshot> {
        self.light_snapshots.get(index as usize)
    }

    /// Clear commands, arenas and tables for the next frame.
    pub fn reset(&mut self) {
        self.commands.clear();
        self.vertices_2d.clear();
        self.vertices_3d.clear();
        self.indices.clear();
        self.materials.clear();
        self.light_snapshots.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn vertices_2d(&self) -> &[Vertex2D] {
        &self.vertices_2d
    }

    pub fn vertices_3d(&self) -> &[Vertex3D] {
        &self.vertices_3d
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of draw commands, excluding state changes.
    pub fn draw_count(&self) -> usize {
        self.commands.iter().filter(|c| c.is_draw()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lighting::LightRegistry;
    use oflike_core::Light;

    fn triangle_2d(list: &mut DrawList) -> Draw2D {
        let offset = list.extend_vertices_2d(&[Vertex2D::default(); 3]);
        Draw2D {
            range: DrawRange::vertices(offset, 3),
            topology: PrimitiveTopology::Triangles,
            blend: BlendMode::Alpha,
            texture: None,
            transform: Affine2::IDENTITY,
        }
    }

    #[test]
    fn test_add_returns_pre_append_size() {
        let mut list = DrawList::new();
        assert_eq!(list.add_vertex_2d(Vertex2D::default()), 0);
        assert_eq!(list.add_vertex_2d(Vertex2D::default()), 1);
        assert_eq!(list.add_vertex_3d(Vertex3D::default()), 0);
        assert_eq!(list.add_index(0), 0);
        assert_eq!(list.extend_indices(&[0, 1], 5), 1);
        assert_eq!(list.indices(), &[0, 5, 6]);
    }

    #[test]
    fn test_vertex_range_validated() {
        let mut list = DrawList::new();
        let mut draw = triangle_2d(&mut list);
        draw.range.vertex_count = 6;
        assert!(matches!(
            list.add_command(DrawCommand::Draw2D(draw)),
            Err(DrawListError::VertexRangeOutOfBounds { len: 3, .. })
        ));
        assert!(list.is_empty());
    }

    #[test]
    fn test_index_values_validated() {
        let mut list = DrawList::new();
        let mut draw = triangle_2d(&mut list);
        let first = list.extend_indices(&[0, 1, 3], 0);
        draw.range.index_offset = first;
        draw.range.index_count = 3;
        assert!(matches!(
            list.add_command(DrawCommand::Draw2D(draw)),
            Err(DrawListError::IndexOutsideRange { index: 3, .. })
        ));
    }

    #[test]
    fn test_element_count_validated() {
        let mut list = DrawList::new();
        let mut draw = triangle_2d(&mut list);
        draw.range.vertex_count = 2;
        assert!(matches!(
            list.add_command(DrawCommand::Draw2D(draw)),
            Err(DrawListError::BadElementCount { count: 2, .. })
        ));
    }

    #[test]
    fn test_clear_must_come_first() {
        let mut list = DrawList::new();
        list.add_command(DrawCommand::SetClear { color: Color::BLACK })
            .unwrap();
        assert_eq!(
            list.add_command(DrawCommand::SetClear { color: Color::BLACK }),
            Err(DrawListError::MisplacedClear(1))
        );
    }

    #[test]
    fn test_empty_draws_dropped() {
        let mut list = DrawList::new();
        let mut draw = triangle_2d(&mut list);
        draw.range.vertex_count = 0;
        list.add_command(DrawCommand::Draw2D(draw)).unwrap();
        assert_eq!(list.command_count(), 0);
    }

    #[test]
    fn test_3d_requires_interned_material() {
        let mut list = DrawList::new();
        let offset = list.extend_vertices_3d(&[Vertex3D::default(); 3]);
        let mut draw = Draw3D {
            range: DrawRange::vertices(offset, 3),
            topology: PrimitiveTopology::Triangles,
            blend: BlendMode::Opaque,
            texture: None,
            material: MaterialId(0),
            light_set: LightSet::NONE,
            model: Mat4::identity(),
            depth_test: true,
        };
        assert_eq!(
            list.add_command(DrawCommand::Draw3D(draw)),
            Err(DrawListError::UnknownMaterial(MaterialId(0)))
        );
        draw.material = list.intern_material(Material::default());
        list.add_command(DrawCommand::Draw3D(draw)).unwrap();
    }

    #[test]
    fn test_interning_dedupes() {
        let mut list = DrawList::new();
        let a = list.intern_material(Material::default());
        let b = list.intern_material(Material::default().with_shininess(10.0));
        assert_ne!(a, b);
        assert_eq!(list.intern_material(Material::default()), a);

        let mut registry = LightRegistry::new();
        assert_eq!(list.intern_lights(registry.snapshot()), LightSet::NONE);
        registry.register(Light::default().enabled());
        let first = list.intern_lights(registry.snapshot());
        assert_eq!(first.mask, 1);
        assert_eq!(list.intern_lights(registry.snapshot()), first);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut list = DrawList::new();
        let draw = triangle_2d(&mut list);
        list.add_command(DrawCommand::Draw2D(draw)).unwrap();
        list.intern_material(Material::default());
        list.reset();
        assert_eq!(list.command_count(), 0);
        assert!(list.vertices_2d().is_empty());
        assert!(list.vertices_3d().is_empty());
        assert!(list.indices().is_empty());
        assert!(list.material(MaterialId(0)).is_none());
    }
}
