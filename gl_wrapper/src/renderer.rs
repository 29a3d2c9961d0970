use crate::geometry::Geometry;
use crate::program::Program;

/// Issues draw calls while caching the bound program and polygon mode.
pub struct GlRenderer {
    current_program: u32,
    wireframe: bool,
}

impl GlRenderer {
    pub fn new() -> Self {
        Self {
            current_program: 0,
            wireframe: false,
        }
    }

    pub fn draw(&mut self, geometry: &Geometry, program: &Program) {
        let p_id = program.get_id();
        if self.current_program != p_id {
            unsafe { gl::UseProgram(p_id) }
            self.current_program = p_id;
        }

        unsafe {
            gl::BindVertexArray(geometry.vao());

            if geometry.is_indexed() {
                gl::DrawElements(
                    gl::TRIANGLES,
                    geometry.draw_count() as i32,
                    gl::UNSIGNED_INT,
                    std::ptr::null(),
                );
            } else {
                gl::DrawArrays(gl::TRIANGLES, 0, geometry.draw_count() as i32);
            }
        }
    }

    pub fn set_wireframe(&mut self, enabled: bool) {
        if self.wireframe == enabled {
            return;
        }

        let mode = if enabled { gl::LINE } else { gl::FILL };

        unsafe {
            gl::PolygonMode(gl::FRONT_AND_BACK, mode);
        }

        self.wireframe = enabled;
    }

    pub fn resize(&self, width: u32, height: u32) {
        unsafe {
            gl::Viewport(0, 0, width as i32, height as i32);
        }
    }

    pub fn clear_color(&self, r: f32, g: f32, b: f32) {
        unsafe {
            gl::ClearColor(r, g, b, 1.0);
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }
    }
}

impl Default for GlRenderer {
    fn default() -> Self {
        Self::new()
    }
}
