//! Thin safe layer over the raw `gl` bindings: shader programs, vertex
//! arrays, textures and a small draw-state cache. Every type owns its GPU
//! object and deletes it on drop.

/// Positions of the demo quad, four unique vertices in normalized device
/// coordinates, one vec3 each.
#[rustfmt::skip]
pub const QUAD_VERTICES: [f32; 12] = [
     0.5,  0.5, 0.0, // top right
     0.5, -0.5, 0.0, // bottom right
    -0.5, -0.5, 0.0, // bottom left
    -0.5,  0.5, 0.0, // top left
];

/// Two triangles sharing the diagonal between vertices 1 and 3.
pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

pub mod geometry;
pub mod program;
pub mod renderer;
pub mod texture;
