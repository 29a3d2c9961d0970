use gl::types::{GLenum, GLuint};
use std::ffi::{c_char, CString};
use thiserror::Error;

const LOG_BUFFER_LEN: usize = 1024;

/// Compiles and links one vertex/fragment pair into a program object.
///
/// The intermediate shader objects are deleted after a successful link.
pub struct ProgramBuilder {
    vert: String,
    frag: String,
}

impl ProgramBuilder {
    pub fn new(vert_src: &str, frag_src: &str) -> Self {
        Self {
            vert: vert_src.to_owned(),
            frag: frag_src.to_owned(),
        }
    }

    pub fn build(self) -> Result<Program, ProgramError> {
        unsafe {
            let vert = compile_stage(gl::VERTEX_SHADER, &self.vert, "vertex")?;
            let frag = match compile_stage(gl::FRAGMENT_SHADER, &self.frag, "fragment") {
                Ok(id) => id,
                Err(e) => {
                    gl::DeleteShader(vert);
                    return Err(e);
                }
            };

            let program = gl::CreateProgram();
            gl::AttachShader(program, vert);
            gl::AttachShader(program, frag);
            gl::LinkProgram(program);

            let mut success = 0;
            gl::GetProgramiv(program, gl::LINK_STATUS, (&mut success) as *mut i32);

            // Shader objects are no longer needed once link status is known.
            gl::DeleteShader(vert);
            gl::DeleteShader(frag);

            if success != 1 {
                let mut buf = [0_u8; LOG_BUFFER_LEN];
                gl::GetProgramInfoLog(
                    program,
                    LOG_BUFFER_LEN as i32,
                    std::ptr::null_mut(),
                    buf.as_mut_ptr() as *mut c_char,
                );
                gl::DeleteProgram(program);

                return Err(ProgramError::Link(read_info_log(&buf)));
            }

            Ok(Program { id: program })
        }
    }
}

unsafe fn compile_stage(
    kind: GLenum,
    src: &str,
    stage: &'static str,
) -> Result<GLuint, ProgramError> {
    let src = CString::new(src).map_err(|_| ProgramError::InvalidSource(stage))?;

    let shader = gl::CreateShader(kind);

    gl::ShaderSource(
        shader,
        1,
        (&src.as_ptr()) as *const *const c_char,
        std::ptr::null(),
    );
    gl::CompileShader(shader);

    let mut success = 0;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, (&mut success) as *mut i32);

    if success != 1 {
        let mut buf = [0_u8; LOG_BUFFER_LEN];
        gl::GetShaderInfoLog(
            shader,
            LOG_BUFFER_LEN as i32,
            std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut c_char,
        );
        gl::DeleteShader(shader);

        return Err(ProgramError::Compilation {
            stage,
            log: read_info_log(&buf),
        });
    }

    Ok(shader)
}

/// Reads a driver info log out of a fixed buffer, stopping at the first NUL.
fn read_info_log(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());

    String::from_utf8_lossy(&buf[..end]).into_owned()
}

#[derive(Debug, Error)]
pub enum ProgramError {
    #[error("{stage} shader failed to compile: {log}")]
    Compilation { stage: &'static str, log: String },
    #[error("program failed to link: {0}")]
    Link(String),
    #[error("{0} shader source contains a NUL byte")]
    InvalidSource(&'static str),
}

pub struct Program {
    id: GLuint,
}

impl Program {
    pub fn get_id(&self) -> GLuint {
        self.id
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        unsafe { gl::DeleteProgram(self.id) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_log_stops_at_first_nul() {
        let mut buf = [0_u8; 16];
        buf[..5].copy_from_slice(b"error");

        assert_eq!(read_info_log(&buf), "error");
    }

    #[test]
    fn info_log_tolerates_full_buffer() {
        let buf = [b'x'; 8];

        assert_eq!(read_info_log(&buf), "xxxxxxxx");
    }

    #[test]
    fn info_log_replaces_invalid_utf8() {
        let buf = [0xff_u8, b'a', 0];

        assert_eq!(read_info_log(&buf), "\u{fffd}a");
    }
}
