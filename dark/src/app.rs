use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, NotCurrentGlContextSurfaceAccessor,
    PossiblyCurrentContext, Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, WindowSurface};

use glutin_winit::DisplayBuilder;

use raw_window_handle::HasRawWindowHandle;

use std::ffi::CString;
use std::num::NonZeroU32;

use thiserror::Error;

use winit::dpi::{PhysicalSize, Size};
use winit::event::{ElementState, Event, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::{Window, WindowBuilder};

use gl_wrapper::geometry::{Geometry, GeometryBuilder, GeometryError, VertexAttribute};
use gl_wrapper::program::{Program, ProgramBuilder, ProgramError};
use gl_wrapper::renderer::GlRenderer;
use gl_wrapper::texture::{Texture2D, TextureError, TextureFilter, TextureFormat};
use gl_wrapper::{QUAD_INDICES, QUAD_VERTICES};

use crate::args::Args;
use crate::pacer::{target_frame_time, FramePacer, MonotonicClock, ThreadSleep};
use crate::shader_source::{ShaderSource, ShaderSourceError};
use crate::texture::{load_png, TextureLoadError};

pub struct App {
    event_loop: EventLoop<()>,
    gl_context: PossiblyCurrentContext,
    gl_window: GlWindow,
    gl_renderer: GlRenderer,
    quad: Geometry,
    program: Program,
    texture: Option<Texture2D>,
    pacer: FramePacer,
    wireframe: bool,
}

impl App {
    /// Creates the window and GL context and uploads every GPU resource the
    /// loop needs. Any failure here is fatal for the process.
    pub fn new(args: &Args) -> Result<Self, AppError> {
        let event_loop = EventLoop::new();
        let window_builder = WindowBuilder::new()
            .with_inner_size(Size::Physical(PhysicalSize::new(args.width, args.height)))
            .with_min_inner_size(Size::Physical(PhysicalSize::new(32, 32)))
            .with_title("DARK");
        let display_builder = DisplayBuilder::new().with_window_builder(Some(window_builder));
        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        let (window, gl_config) = display_builder
            .build(&event_loop, template, |mut configs| configs.next().unwrap())
            .map_err(|e| AppError::Window(e.to_string()))?;

        let window = window.ok_or_else(|| AppError::Window("no window was created".into()))?;

        let handle = Some(window.raw_window_handle());
        let gl_display = gl_config.display();

        let context_attr = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 6))))
            .build(handle);

        let gl_window = GlWindow::new(window, &gl_config)?;

        let gl_context = unsafe { gl_display.create_context(&gl_config, &context_attr)? }
            .make_current(&gl_window.surface)?;

        gl::load_with(|s| {
            gl_display
                .get_proc_address(CString::new(s).unwrap().as_c_str())
                .cast()
        });

        let refresh_hz = if args.fps > 0 {
            args.fps
        } else {
            gl_window
                .window
                .current_monitor()
                .and_then(|monitor| monitor.refresh_rate_millihertz())
                .map(|mhz| mhz / 1000)
                .unwrap_or(0)
        };
        let target = target_frame_time(refresh_hz);
        log::info!(
            "pacing to {:?} per frame ({} Hz reported)",
            target,
            refresh_hz
        );

        let pacer = FramePacer::with_parts(target, !args.no_sleep, MonotonicClock, ThreadSleep);

        let source = match (&args.vert, &args.frag) {
            (Some(vert), Some(frag)) => ShaderSource::Files {
                vert: vert.clone(),
                frag: frag.clone(),
            },
            _ => ShaderSource::Embedded {
                textured: args.texture.is_some(),
            },
        };
        let (vert_src, frag_src) = source.load()?;
        let program = ProgramBuilder::new(&vert_src, &frag_src).build()?;

        let quad = GeometryBuilder::new(&QUAD_VERTICES)
            .with_attribute(VertexAttribute::Vec3)
            .with_indices(&QUAD_INDICES)
            .build()?;

        let texture = match &args.texture {
            Some(path) => {
                let image = load_png(path)?;
                log::info!(
                    "loaded {}x{} texture from {:?}",
                    image.width,
                    image.height,
                    path
                );

                Some(Texture2D::new(
                    image.width,
                    image.height,
                    &image.pixels,
                    TextureFormat::Rgba8,
                    TextureFilter::Linear,
                )?)
            }
            None => None,
        };

        let mut gl_renderer = GlRenderer::new();
        let size = gl_window.window.inner_size();
        gl_renderer.resize(size.width, size.height);
        gl_renderer.set_wireframe(args.wireframe);

        Ok(Self {
            event_loop,
            gl_context,
            gl_window,
            gl_renderer,
            quad,
            program,
            texture,
            pacer,
            wireframe: args.wireframe,
        })
    }

    pub fn run(self) -> ! {
        let Self {
            event_loop,
            gl_context,
            gl_window,
            mut gl_renderer,
            quad,
            program,
            texture,
            mut pacer,
            mut wireframe,
        } = self;

        event_loop.run(move |event, _window_target, control_flow| {
            *control_flow = ControlFlow::Poll;
            match event {
                Event::MainEventsCleared => {
                    gl_window.window.request_redraw();
                }
                Event::WindowEvent { event, .. } => match event {
                    WindowEvent::Resized(size) => {
                        if size.width != 0 && size.height != 0 {
                            gl_window.surface.resize(
                                &gl_context,
                                NonZeroU32::new(size.width).unwrap(),
                                NonZeroU32::new(size.height).unwrap(),
                            );
                            gl_renderer.resize(size.width, size.height);
                        }
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        if let (Some(VirtualKeyCode::W), ElementState::Released) =
                            (input.virtual_keycode, input.state)
                        {
                            wireframe = !wireframe;
                            gl_renderer.set_wireframe(wireframe);
                            log::debug!("wireframe {}", if wireframe { "on" } else { "off" });
                        }
                    }
                    WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                        control_flow.set_exit();
                    }
                    _ => (),
                },
                Event::RedrawRequested(_) => {
                    gl_renderer.clear_color(0.2, 0.3, 0.3);

                    if let Some(texture) = &texture {
                        texture.bind(0);
                    }

                    gl_renderer.draw(&quad, &program);

                    if let Err(e) = gl_window.surface.swap_buffers(&gl_context) {
                        log::error!("could not swap buffers: {e}");
                        control_flow.set_exit_with_code(1);
                    }
                }
                Event::RedrawEventsCleared => {
                    let report = pacer.pace();

                    if let Some(overrun) = report.overrun {
                        log::warn!(
                            "missed frame target by {:?} (frame took {:?}, target {:?})",
                            overrun,
                            report.elapsed,
                            pacer.target()
                        );
                    }
                }
                _ => (),
            }
        })
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("could not create window: {0}")]
    Window(String),
    #[error("could not create OpenGL context: {0}")]
    Context(#[from] glutin::error::Error),
    #[error(transparent)]
    ShaderSource(#[from] ShaderSourceError),
    #[error(transparent)]
    Program(#[from] ProgramError),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    TextureLoad(#[from] TextureLoadError),
    #[error("could not upload texture: {0}")]
    TextureUpload(#[from] TextureError),
}

pub struct GlWindow {
    // XXX the surface must be dropped before the window.
    pub surface: Surface<WindowSurface>,
    pub window: Window,
}

impl GlWindow {
    pub fn new(window: Window, config: &Config) -> Result<Self, glutin::error::Error> {
        let (width, height): (u32, u32) = window.inner_size().into();
        let raw_window_handle = window.raw_window_handle();
        let attrs = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            NonZeroU32::new(width).unwrap(),
            NonZeroU32::new(height).unwrap(),
        );

        let surface = unsafe { config.display().create_window_surface(config, &attrs)? };

        Ok(Self { window, surface })
    }
}
