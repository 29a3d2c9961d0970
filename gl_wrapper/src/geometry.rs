use std::ffi::c_void;
use thiserror::Error;

/// Uploads vertex data (and optionally an index list) into a fresh vertex
/// array object. Attributes are tightly packed unnormalized floats in
/// declaration order.
pub struct GeometryBuilder<'a> {
    attributes: Vec<VertexAttribute>,
    data: &'a [f32],
    indices: Option<&'a [u32]>,
}

impl<'a> GeometryBuilder<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self {
            data,
            attributes: Vec::new(),
            indices: None,
        }
    }

    pub fn with_attribute(mut self, attr: VertexAttribute) -> Self {
        self.attributes.push(attr);
        self
    }

    pub fn with_indices(mut self, indices: &'a [u32]) -> Self {
        self.indices = Some(indices);
        self
    }

    /// Checks the layout without touching GL.
    fn vertex_count(&self) -> Result<usize, GeometryError> {
        let stride: usize = self.attributes.iter().map(|a| a.size()).sum();

        if stride == 0 {
            return Err(GeometryError::NoAttributes);
        }

        if self.data.len() % stride != 0 {
            return Err(GeometryError::InvalidDataLength);
        }

        let vertices = self.data.len() / stride;

        if let Some(indices) = self.indices {
            if let Some(index) = indices.iter().find(|i| **i as usize >= vertices) {
                return Err(GeometryError::IndexOutOfBounds {
                    index: *index,
                    vertices,
                });
            }
        }

        Ok(vertices)
    }

    pub fn build(self) -> Result<Geometry, GeometryError> {
        let vertices = self.vertex_count()?;
        let stride: usize = self.attributes.iter().map(|a| a.size()).sum();

        let mut vao = 0;
        let mut vbo = 0;
        let mut ebo = 0;

        unsafe {
            gl::GenVertexArrays(1, (&mut vao) as *mut u32);
            gl::GenBuffers(1, (&mut vbo) as *mut u32);

            gl::BindVertexArray(vao);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);

            gl::BufferData(
                gl::ARRAY_BUFFER,
                (self.data.len() * std::mem::size_of::<f32>()) as isize,
                self.data.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );

            if let Some(indices) = self.indices {
                gl::GenBuffers(1, (&mut ebo) as *mut u32);
                gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ebo);
                gl::BufferData(
                    gl::ELEMENT_ARRAY_BUFFER,
                    (indices.len() * std::mem::size_of::<u32>()) as isize,
                    indices.as_ptr() as *const c_void,
                    gl::STATIC_DRAW,
                );
            }

            let mut offset = 0;

            for (i, attr) in self.attributes.iter().enumerate() {
                gl::VertexAttribPointer(
                    i as u32,
                    attr.size() as i32,
                    gl::FLOAT,
                    gl::FALSE,
                    (stride * std::mem::size_of::<f32>()) as i32,
                    offset as *const c_void,
                );
                offset += attr.size() * std::mem::size_of::<f32>();
                gl::EnableVertexAttribArray(i as u32);
            }

            // The element buffer binding is part of VAO state, so the VAO
            // must be unbound first.
            gl::BindVertexArray(0);
            gl::BindBuffer(gl::ARRAY_BUFFER, 0);
        }

        let draw_count = match self.indices {
            Some(indices) => indices.len(),
            None => vertices,
        };

        Ok(Geometry {
            vao,
            vbo,
            ebo: self.indices.map(|_| ebo),
            draw_count,
        })
    }
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("no vertex attributes given")]
    NoAttributes,
    #[error("invalid data length for given attributes")]
    InvalidDataLength,
    #[error("index {index} out of bounds for {vertices} vertices")]
    IndexOutOfBounds { index: u32, vertices: usize },
}

pub enum VertexAttribute {
    Float,
    Vec2,
    Vec3,
}

impl VertexAttribute {
    pub fn size(&self) -> usize {
        match self {
            VertexAttribute::Float => 1,
            VertexAttribute::Vec2 => 2,
            VertexAttribute::Vec3 => 3,
        }
    }
}

pub struct Geometry {
    vao: u32,
    vbo: u32,
    ebo: Option<u32>,
    draw_count: usize,
}

impl Geometry {
    pub fn vao(&self) -> u32 {
        self.vao
    }

    /// Indices to draw for indexed geometry, vertices otherwise.
    pub fn draw_count(&self) -> usize {
        self.draw_count
    }

    pub fn is_indexed(&self) -> bool {
        self.ebo.is_some()
    }
}

impl Drop for Geometry {
    fn drop(&mut self) {
        unsafe {
            if let Some(ebo) = self.ebo {
                gl::DeleteBuffers(1, (&ebo) as *const u32);
            }
            gl::DeleteBuffers(1, (&self.vbo) as *const u32);
            gl::DeleteVertexArrays(1, (&self.vao) as *const u32);
        }
    }
}
