//! Orbit camera, projection and their GPU resources.
//!
//! The camera orbits a fixed target: dragging with the left mouse button
//! changes yaw and pitch, the scroll wheel changes distance. View and
//! projection are combined into one uniform re-written every frame.

use cgmath::{InnerSpace, Matrix4, Point3, Rad, SquareMatrix, Vector3, perspective};
use wgpu::util::DeviceExt;
use winit::event::{DeviceEvent, ElementState, MouseScrollDelta};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

pub struct OrbitCamera {
    pub target: Point3<f32>,
    pub distance: f32,
    pub yaw: Rad<f32>,
    pub pitch: Rad<f32>,
}

impl OrbitCamera {
    /// Place the camera at `eye` looking at `target`, expressed as orbit
    /// angles so subsequent dragging continues from the same view.
    pub fn from_position(eye: Point3<f32>, target: Point3<f32>) -> Self {
        let offset = eye - target;
        let distance = offset.magnitude();
        let yaw = Rad(offset.z.atan2(offset.x));
        let pitch = Rad((offset.y / distance).asin());
        Self {
            target,
            distance,
            yaw,
            pitch,
        }
    }

    pub fn position(&self) -> Point3<f32> {
        let (sin_pitch, cos_pitch) = self.pitch.0.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.0.sin_cos();
        self.target
            + Vector3::new(
                self.distance * cos_pitch * cos_yaw,
                self.distance * sin_pitch,
                self.distance * cos_pitch * sin_yaw,
            )
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.position(), self.target, Vector3::unit_y())
    }
}

pub struct Projection {
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
}

impl Projection {
    pub fn new(width: u32, height: u32, fovy: Rad<f32>, znear: f32, zfar: f32) -> Self {
        Self {
            aspect: width as f32 / height as f32,
            fovy,
            znear,
            zfar,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn calc_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    view_position: [f32; 4],
    view_proj: [[f32; 4]; 4],
}

impl CameraUniform {
    pub fn new() -> Self {
        Self {
            view_position: [0.0; 4],
            view_proj: Matrix4::identity().into(),
        }
    }

    pub fn update_view_proj(&mut self, camera: &OrbitCamera, projection: &Projection) {
        self.view_position = camera.position().to_homogeneous().into();
        self.view_proj = (projection.calc_matrix() * camera.calc_matrix()).into();
    }
}

impl Default for CameraUniform {
    fn default() -> Self {
        Self::new()
    }
}

/// Drag-to-orbit and scroll-to-zoom input state, fed from device events.
pub struct CameraController {
    rotate_speed: f32,
    zoom_speed: f32,
    dragging: bool,
}

impl CameraController {
    pub fn new(rotate_speed: f32, zoom_speed: f32) -> Self {
        Self {
            rotate_speed,
            zoom_speed,
            dragging: false,
        }
    }

    /// Returns true if the event changed the camera.
    pub fn process_device_event(&mut self, camera: &mut OrbitCamera, event: &DeviceEvent) -> bool {
        match event {
            DeviceEvent::Button { button: 0, state } => {
                self.dragging = *state == ElementState::Pressed;
                false
            }
            DeviceEvent::MouseMotion { delta: (dx, dy) } if self.dragging => {
                camera.yaw += Rad(*dx as f32 * self.rotate_speed);
                camera.pitch += Rad(*dy as f32 * self.rotate_speed);
                // Stop short of the poles so look_at keeps a valid up vector
                let limit = std::f32::consts::FRAC_PI_2 - 0.01;
                camera.pitch.0 = camera.pitch.0.clamp(-limit, limit);
                true
            }
            DeviceEvent::MouseWheel { delta } => {
                let scroll = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 20.0,
                };
                camera.distance = (camera.distance - scroll * self.zoom_speed).clamp(2.0, 60.0);
                true
            }
            _ => false,
        }
    }
}

/// Camera state plus the uniform buffer and bind group every pipeline shares.
pub struct CameraResources {
    pub camera: OrbitCamera,
    pub projection: Projection,
    pub controller: CameraController,
    pub uniform: CameraUniform,
    pub buffer: wgpu::Buffer,
    pub bind_group: wgpu::BindGroup,
    pub bind_group_layout: wgpu::BindGroupLayout,
}

impl CameraResources {
    pub fn new(device: &wgpu::Device, camera: OrbitCamera, projection: Projection) -> Self {
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera, &projection);

        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Camera Buffer"),
            contents: bytemuck::cast_slice(&[uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("camera_bind_group_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("camera_bind_group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            }],
        });

        Self {
            camera,
            projection,
            controller: CameraController::new(0.005, 0.5),
            uniform,
            buffer,
            bind_group,
            bind_group_layout,
        }
    }

    pub fn update(&mut self, queue: &wgpu::Queue) {
        self.uniform.update_view_proj(&self.camera, &self.projection);
        queue.write_buffer(&self.buffer, 0, bytemuck::cast_slice(&[self.uniform]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{EuclideanSpace, MetricSpace};

    #[test]
    fn from_position_round_trips() {
        let eye = Point3::new(0.0, 10.0, 20.0);
        let camera = OrbitCamera::from_position(eye, Point3::origin());
        assert!(camera.position().distance(eye) < 1e-4);
    }

    #[test]
    fn resize_updates_aspect_ratio() {
        let mut projection = Projection::new(800, 600, Rad(0.785), 0.1, 100.0);
        projection.resize(1920, 1080);
        assert!((projection.aspect - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn resize_to_same_size_is_idempotent() {
        let mut projection = Projection::new(800, 600, Rad(0.785), 0.1, 100.0);
        let before = projection.aspect;
        projection.resize(800, 600);
        assert_eq!(projection.aspect, before);
    }

    #[test]
    fn drag_requires_button_down() {
        let mut camera = OrbitCamera::from_position(Point3::new(0.0, 10.0, 20.0), Point3::origin());
        let mut controller = CameraController::new(0.005, 0.5);
        let moved = controller.process_device_event(
            &mut camera,
            &DeviceEvent::MouseMotion { delta: (10.0, 0.0) },
        );
        assert!(!moved);

        controller.process_device_event(
            &mut camera,
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
        );
        let moved = controller.process_device_event(
            &mut camera,
            &DeviceEvent::MouseMotion { delta: (10.0, 0.0) },
        );
        assert!(moved);
    }

    #[test]
    fn pitch_stays_clear_of_the_poles() {
        let mut camera = OrbitCamera::from_position(Point3::new(0.0, 10.0, 20.0), Point3::origin());
        let mut controller = CameraController::new(0.005, 0.5);
        controller.process_device_event(
            &mut camera,
            &DeviceEvent::Button {
                button: 0,
                state: ElementState::Pressed,
            },
        );
        controller.process_device_event(
            &mut camera,
            &DeviceEvent::MouseMotion {
                delta: (0.0, 1e6),
            },
        );
        assert!(camera.pitch.0 < std::f32::consts::FRAC_PI_2);
        assert!(camera.pitch.0 > -std::f32::consts::FRAC_PI_2);
    }
}
