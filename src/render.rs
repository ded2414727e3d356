//! CPU-side mesh batching.
//!
//! Effects do no GPU work themselves; each frame they append billboard
//! quads and tunnel strips into a [`FrameMesh`], and the host uploads the
//! whole batch as one dynamic vertex/index buffer and issues a single draw.
//! Batching everything per frame (instead of one draw per primitive) is a
//! pure throughput win with identical output.
//!
//! Vertices are in pixel coordinates; the host's vertex shader maps them to
//! NDC using the viewport size. The `uv` channel carries the quad-local
//! coordinate for billboards (radial soft-edge falloff in the fragment
//! shader) and is zero for strip vertices, which renders them solid.

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};

/// One mesh vertex, laid out for direct buffer upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct Vertex {
    /// Screen position in pixels.
    pub position: [f32; 2],
    /// Quad-local coordinate in [-1, 1] for billboards, (0, 0) for strips.
    pub uv: [f32; 2],
    /// Premultiplied-friendly RGBA.
    pub color: [f32; 4],
}

/// A frame's worth of triangles, rebuilt every frame, allocation reused.
#[derive(Default)]
pub struct FrameMesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl FrameMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the previous frame's contents, keeping the allocations.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Append a camera-facing quad centered at `center` with the given
    /// pixel half extents.
    pub fn push_billboard(&mut self, center: Vec2, half: Vec2, color: Vec4) {
        let base = self.vertices.len() as u32;
        let color = color.to_array();
        for (dx, dy) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            self.vertices.push(Vertex {
                position: [center.x + dx * half.x, center.y + dy * half.y],
                uv: [dx, dy],
                color,
            });
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    /// Append a closed triangle strip between two projected rings of equal
    /// length. `stride` is the coarseness knob: a stride of 2 uses every
    /// other point, trading silhouette detail for half the triangles.
    pub fn push_ring_strip(
        &mut self,
        near: &[(Vec2, Vec4)],
        far: &[(Vec2, Vec4)],
        stride: usize,
    ) {
        debug_assert_eq!(near.len(), far.len());
        let n = near.len();
        if n < 3 {
            return;
        }
        let stride = stride.max(1);

        let base = self.vertices.len() as u32;
        let mut count = 0u32;
        let mut i = 0;
        while i < n {
            for &(pos, color) in [&near[i], &far[i]] {
                self.vertices.push(Vertex {
                    position: pos.to_array(),
                    uv: [0.0, 0.0],
                    color: color.to_array(),
                });
            }
            count += 2;
            i += stride;
        }

        // Quads between consecutive point pairs, wrapping back to the start.
        let pairs = count / 2;
        for p in 0..pairs {
            let q = (p + 1) % pairs;
            let (a, b) = (base + p * 2, base + p * 2 + 1);
            let (c, d) = (base + q * 2, base + q * 2 + 1);
            self.indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }
}
