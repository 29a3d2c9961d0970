use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
pub struct Args {
    /// Window width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,
    /// Window height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,
    /// Target frame rate (0 to use the monitor refresh rate)
    #[arg(short, long, default_value_t = 0)]
    pub fps: u32,
    /// Vertex shader file to use instead of the built-in source
    #[arg(long, requires = "frag")]
    pub vert: Option<PathBuf>,
    /// Fragment shader file to use instead of the built-in source
    #[arg(long, requires = "vert")]
    pub frag: Option<PathBuf>,
    /// PNG image to map onto the quad
    #[arg(short, long)]
    pub texture: Option<PathBuf>,
    /// Start in wireframe mode
    #[arg(short, long)]
    pub wireframe: bool,
    /// Pace frames with a pure spin wait instead of sleep plus spin
    #[arg(long)]
    pub no_sleep: bool,
}
