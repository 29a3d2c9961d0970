use std::ffi::c_void;
use thiserror::Error;

/// Single-level 2D texture with clamp-to-edge wrapping.
pub struct Texture2D {
    id: u32,
}

impl Texture2D {
    pub fn new(
        width: u32,
        height: u32,
        data: &[u8],
        format: TextureFormat,
        filter: TextureFilter,
    ) -> Result<Self, TextureError> {
        if (width as usize * height as usize * format.channels() as usize) != data.len() {
            return Err(TextureError::InvalidSrcLength);
        }

        let mut id = 0;

        unsafe {
            gl::GenTextures(1, (&mut id) as *mut u32);
            gl::BindTexture(gl::TEXTURE_2D, id);

            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, filter.gl_enum() as i32);
            gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, filter.gl_enum() as i32);

            gl::TexImage2D(
                gl::TEXTURE_2D,
                0,
                format.internal_format() as i32,
                width as i32,
                height as i32,
                0,
                gl::RGBA,
                gl::UNSIGNED_BYTE,
                data.as_ptr() as *const c_void,
            );

            gl::BindTexture(gl::TEXTURE_2D, 0);
        }

        Ok(Self { id })
    }

    pub fn bind(&self, unit: u8) {
        unsafe {
            gl::ActiveTexture(gl::TEXTURE0 + unit as u32);
            gl::BindTexture(gl::TEXTURE_2D, self.id)
        }
    }
}

impl Drop for Texture2D {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(1, (&self.id) as *const u32);
        }
    }
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("Invalid source data length")]
    InvalidSrcLength,
}

pub enum TextureFormat {
    Rgba8,
}

impl TextureFormat {
    pub fn channels(&self) -> u8 {
        match self {
            TextureFormat::Rgba8 => 4,
        }
    }

    fn internal_format(&self) -> u32 {
        match self {
            TextureFormat::Rgba8 => gl::RGBA8,
        }
    }
}

#[derive(Copy, Clone)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

impl TextureFilter {
    fn gl_enum(&self) -> u32 {
        match self {
            TextureFilter::Nearest => gl::NEAREST,
            TextureFilter::Linear => gl::LINEAR,
        }
    }
}
