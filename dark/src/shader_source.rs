use std::borrow::Cow;
use std::path::PathBuf;
use thiserror::Error;

/// Where the GLSL for the quad's program comes from: the sources baked into
/// the binary, or a vertex/fragment file pair read at startup.
pub enum ShaderSource {
    Embedded { textured: bool },
    Files { vert: PathBuf, frag: PathBuf },
}

impl ShaderSource {
    /// Returns `(vertex, fragment)` source text.
    pub fn load(&self) -> Result<(Cow<'static, str>, Cow<'static, str>), ShaderSourceError> {
        match self {
            ShaderSource::Embedded { textured } => {
                let frag = if *textured {
                    include_str!("gl_shaders/textured.glsl")
                } else {
                    include_str!("gl_shaders/solid.glsl")
                };

                Ok((
                    Cow::Borrowed(include_str!("gl_shaders/quad.glsl")),
                    Cow::Borrowed(frag),
                ))
            }
            ShaderSource::Files { vert, frag } => {
                let read = |path: &PathBuf| {
                    std::fs::read_to_string(path).map_err(|source| ShaderSourceError::Read {
                        path: path.clone(),
                        source,
                    })
                };

                Ok((Cow::Owned(read(vert)?), Cow::Owned(read(frag)?)))
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ShaderSourceError {
    #[error("could not read shader source {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_sources_are_glsl() {
        for textured in [false, true] {
            let (vert, frag) = ShaderSource::Embedded { textured }.load().unwrap();

            assert!(vert.contains("void main"));
            assert!(frag.contains("void main"));
            assert!(vert.starts_with("#version"));
            assert!(frag.starts_with("#version"));
        }
    }

    #[test]
    fn file_sources_round_trip() {
        let dir = std::env::temp_dir();
        let vert_path = dir.join("dark_test_round_trip.vert");
        let frag_path = dir.join("dark_test_round_trip.frag");

        std::fs::write(&vert_path, "void main() {}").unwrap();
        std::fs::write(&frag_path, "void main() { discard; }").unwrap();

        let source = ShaderSource::Files {
            vert: vert_path.clone(),
            frag: frag_path.clone(),
        };
        let (vert, frag) = source.load().unwrap();

        assert_eq!(vert, "void main() {}");
        assert_eq!(frag, "void main() { discard; }");

        let _ = std::fs::remove_file(vert_path);
        let _ = std::fs::remove_file(frag_path);
    }

    #[test]
    fn missing_file_names_the_path() {
        let missing = std::env::temp_dir().join("dark_test_does_not_exist.vert");
        let source = ShaderSource::Files {
            vert: missing.clone(),
            frag: missing.clone(),
        };

        let err = source.load().unwrap_err();

        assert!(err.to_string().contains("dark_test_does_not_exist.vert"));
    }
}
