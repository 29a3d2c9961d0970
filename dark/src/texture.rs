use std::fs::File;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Decoded RGBA8 image with rows ordered bottom-up, ready for GL upload.
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

const CHANNELS: usize = 4;

/// Reads an 8-bit RGB or RGBA PNG. RGB gets an opaque alpha channel; rows
/// are flipped so the first row is the bottom of the image.
pub fn load_png(path: &Path) -> Result<Image, TextureLoadError> {
    let file = File::open(path).map_err(|source| TextureLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let decoder = png::Decoder::new(file);
    let mut reader = decoder.read_info()?;

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    if info.bit_depth != png::BitDepth::Eight {
        return Err(TextureLoadError::UnsupportedBitDepth(info.bit_depth));
    }

    let mut pixels = match info.color_type {
        png::ColorType::Rgba => buf,
        png::ColorType::Rgb => expand_rgb(&buf),
        other => return Err(TextureLoadError::UnsupportedColorType(other)),
    };

    flip_rows(&mut pixels, info.width as usize, info.height as usize);

    Ok(Image {
        width: info.width,
        height: info.height,
        pixels,
    })
}

/// Inserts an opaque alpha byte after every RGB triple.
fn expand_rgb(rgb: &[u8]) -> Vec<u8> {
    let mut rgba = Vec::with_capacity(rgb.len() / 3 * 4);

    for pixel in rgb.chunks_exact(3) {
        rgba.extend_from_slice(pixel);
        rgba.push(u8::MAX);
    }

    rgba
}

/// Reverses row order in place. PNG stores rows top-down, GL samples
/// bottom-up.
fn flip_rows(pixels: &mut [u8], width: usize, height: usize) {
    let stride = width * CHANNELS;

    for row in 0..height / 2 {
        let opposite = height - 1 - row;
        let (top, bottom) = pixels.split_at_mut(opposite * stride);
        top[row * stride..row * stride + stride].swap_with_slice(&mut bottom[..stride]);
    }
}

#[derive(Debug, Error)]
pub enum TextureLoadError {
    #[error("could not open texture {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not decode texture: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("unsupported texture bit depth {0:?}")]
    UnsupportedBitDepth(png::BitDepth),
    #[error("unsupported texture color type {0:?}")]
    UnsupportedColorType(png::ColorType),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_expansion_adds_opaque_alpha() {
        let rgb = [1, 2, 3, 4, 5, 6];

        assert_eq!(expand_rgb(&rgb), vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn flip_reverses_row_order() {
        // 1x3 image, one byte per channel value marking the row.
        let mut pixels: Vec<u8> = [[0; 4], [1; 4], [2; 4]].concat();

        flip_rows(&mut pixels, 1, 3);

        assert_eq!(pixels, [[2; 4], [1; 4], [0; 4]].concat());
    }

    #[test]
    fn flip_is_an_involution() {
        let mut pixels: Vec<u8> = (0..2 * 4 * CHANNELS as u8).collect();
        let original = pixels.clone();

        flip_rows(&mut pixels, 2, 4);
        assert_ne!(pixels, original);

        flip_rows(&mut pixels, 2, 4);
        assert_eq!(pixels, original);
    }
}
