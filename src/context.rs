use std::sync::Arc;

use winit::window::Window;

use crate::{
    camera::{CameraResources, OrbitCamera, Projection},
    data_structures::texture::Texture,
    pipelines::{
        background::BackgroundResources,
        basic::mk_scene_pipeline,
        light::{LightResources, LightsRaw},
    },
};

/// Everything tied to the GPU and the window: device, surface, depth buffer,
/// camera and light uniforms, and the render pipelines.
pub struct Context {
    pub(crate) window: Arc<Window>,
    pub(crate) depth_texture: Texture,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub camera: CameraResources,
    pub light: LightResources,
    pub background: BackgroundResources,
    pub opaque_pipeline: wgpu::RenderPipeline,
    pub double_sided_pipeline: wgpu::RenderPipeline,
    /// 1x1 white texture bound for color-only materials and pending slots.
    pub placeholder_texture: Texture,
}

impl Context {
    pub async fn new(window: Arc<Window>, lights: LightsRaw) -> Self {
        let size = window.inner_size();

        // The instance is a handle to our GPU
        log::info!("WGPU setup");
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();
        log::info!("device and queue");
        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        log::info!("Surface");
        let surface_caps = surface.get_capabilities(&adapter);
        // The shaders assume an sRGB surface texture; a linear format would
        // render everything darker.
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let orbit = OrbitCamera::from_position(
            cgmath::Point3::new(0.0, 10.0, 20.0),
            cgmath::Point3::new(0.0, 0.0, 0.0),
        );
        let projection = Projection::new(
            config.width,
            config.height,
            cgmath::Deg(45.0).into(),
            0.1,
            100.0,
        );
        let camera = CameraResources::new(&device, orbit, projection);

        let depth_texture =
            Texture::create_depth_texture(&device, [config.width, config.height], "depth_texture");

        let light = LightResources::new(&device, lights);

        let opaque_pipeline = mk_scene_pipeline(
            &device,
            &config,
            &camera.bind_group_layout,
            &light.bind_group_layout,
            Some(wgpu::Face::Back),
        );
        let double_sided_pipeline = mk_scene_pipeline(
            &device,
            &config,
            &camera.bind_group_layout,
            &light.bind_group_layout,
            None,
        );

        let background = BackgroundResources::new(&device, &config);

        let placeholder_texture =
            Texture::create_placeholder(&device, &queue, [255, 255, 255, 255], "placeholder");

        Self {
            window,
            depth_texture,
            surface,
            device,
            queue,
            config,
            camera,
            light,
            background,
            opaque_pipeline,
            double_sided_pipeline,
            placeholder_texture,
        }
    }

    /// Reconfigure the surface, depth buffer and projection for a new size.
    /// A no-op when the size already matches, so callers can invoke it every
    /// frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(1);
        let height = height.max(1);
        if width == self.config.width && height == self.config.height {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture =
            Texture::create_depth_texture(&self.device, [width, height], "depth_texture");
        self.camera.projection.resize(width, height);
    }

    /// Re-create the swapchain at the current size after a Lost/Outdated
    /// surface error.
    pub fn reconfigure_surface(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}
