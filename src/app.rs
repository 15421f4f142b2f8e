//! Application event loop.
//!
//! The winit loop drives everything. Frame flow on each `RedrawRequested`:
//!
//! 1. Check the window size against the surface configuration (a no-op when
//!    nothing changed, so it runs every frame)
//! 2. Advance the scene to the absolute elapsed time
//! 3. Render, reconfiguring the surface on Lost/Outdated
//! 4. Request the next redraw
//!
//! Asset loads are fire and forget: tokio tasks decode images and parse the
//! OBJ model off-thread, then re-enter the loop through an
//! [`EventLoopProxy`]. A failed load logs a warning and the scene simply
//! keeps its placeholder.

use std::sync::Arc;

use instant::Instant;
use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop, EventLoopProxy},
    window::Window,
};

use crate::{
    context::Context,
    data_structures::material::TextureHandle,
    interior::InteriorScene,
    render::Renderer,
    resources::{self, LoadedModel},
};

const MODEL_FILE: &str = "cat/cat.obj";

/// Completed asset loads, delivered back to the event loop thread.
pub enum AssetEvent {
    Texture {
        handle: TextureHandle,
        image: image::DynamicImage,
    },
    Model(LoadedModel),
}

impl std::fmt::Debug for AssetEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Texture { handle, .. } => f.debug_struct("Texture").field("handle", handle).finish(),
            Self::Model(model) => f.debug_tuple("Model").field(&model.name).finish(),
        }
    }
}

struct AppState {
    ctx: Context,
    scene: InteriorScene,
    renderer: Renderer,
    start: Instant,
}

pub struct App {
    async_runtime: tokio::runtime::Runtime,
    proxy: EventLoopProxy<AssetEvent>,
    state: Option<AppState>,
}

impl App {
    fn new(event_loop: &EventLoop<AssetEvent>) -> anyhow::Result<Self> {
        let proxy = event_loop.create_proxy();
        let async_runtime = tokio::runtime::Runtime::new()?;
        Ok(Self {
            async_runtime,
            proxy,
            state: None,
        })
    }

    fn spawn_texture_loads(&self, loads: Vec<(TextureHandle, String)>) {
        for (handle, path) in loads {
            let proxy = self.proxy.clone();
            self.async_runtime.spawn(async move {
                match resources::texture::load_image(&path).await {
                    Ok(image) => {
                        if proxy.send_event(AssetEvent::Texture { handle, image }).is_err() {
                            log::warn!("event loop closed before texture {path} arrived");
                        }
                    }
                    Err(e) => log::warn!("failed to load texture {path}: {e}"),
                }
            });
        }
    }

    fn spawn_model_load(&self, file_name: &'static str) {
        let proxy = self.proxy.clone();
        self.async_runtime.spawn(async move {
            match resources::load_model_obj(file_name).await {
                Ok(model) => {
                    if proxy.send_event(AssetEvent::Model(model)).is_err() {
                        log::warn!("event loop closed before model {file_name} arrived");
                    }
                }
                Err(e) => log::warn!("failed to load model {file_name}: {e}"),
            }
        });
    }
}

impl ApplicationHandler<AssetEvent> for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let window_attributes = Window::default_attributes().with_title("hearth");
        let window = Arc::new(event_loop.create_window(window_attributes).unwrap());

        let ctx = self
            .async_runtime
            .block_on(Context::new(window, InteriorScene::lights()));

        let scene = InteriorScene::new();
        self.spawn_texture_loads(scene.registry.pending());
        self.spawn_model_load(MODEL_FILE);

        let state = AppState {
            ctx,
            scene,
            renderer: Renderer::new(),
            start: Instant::now(),
        };
        state.ctx.window.request_redraw();
        self.state = Some(state);
    }

    fn user_event(&mut self, _event_loop: &ActiveEventLoop, event: AssetEvent) {
        let Some(state) = &mut self.state else {
            return;
        };
        let new_textures = match event {
            AssetEvent::Texture { handle, image } => {
                state.scene.registry.fulfill_image(handle, image);
                Vec::new()
            }
            AssetEvent::Model(model) => state.scene.attach_model(model),
        };
        state.ctx.window.request_redraw();
        if !new_textures.is_empty() {
            self.spawn_texture_loads(new_textures);
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };
        let camera = &mut state.ctx.camera;
        camera
            .controller
            .process_device_event(&mut camera.camera, &event);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.ctx.resize(size.width, size.height),
            WindowEvent::RedrawRequested => {
                // The resize check runs every frame; when nothing changed it
                // does no work
                let size = state.ctx.window.inner_size();
                state.ctx.resize(size.width, size.height);

                state.scene.advance(state.start.elapsed().as_secs_f32());

                let background = Some(state.scene.handles.background);
                match state.renderer.render(
                    &mut state.ctx,
                    &state.scene.root,
                    &mut state.scene.registry,
                    background,
                ) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.ctx.reconfigure_surface();
                    }
                    Err(e) => {
                        log::error!("Unable to render {}", e);
                    }
                }

                state.ctx.window.request_redraw();
            }
            _ => {}
        }
    }
}

pub fn run() -> anyhow::Result<()> {
    if let Err(e) = env_logger::try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };

    let event_loop: EventLoop<AssetEvent> = EventLoop::with_user_event().build()?;
    let mut app = App::new(&event_loop)?;
    event_loop.run_app(&mut app)?;

    Ok(())
}
