//! Node transformation data for GPU rendering.
//!
//! Every scene node carries a local [`Transform`]; the world transform is the
//! parent-to-child composition of locals. The raw form is packed into a
//! vertex-stepped GPU buffer and read by the vertex shader.

use std::ops::Mul;

use cgmath::{One, Rad, Rotation3};

use crate::data_structures::mesh;

/// Position, rotation (as quaternion), and scale of a scene node.
///
/// Composition with `*` follows parent-first order: `parent * local` yields
/// the child's world transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// Identity transformation (no move, rotate, or scale).
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::new(0.0, 0.0, 0.0),
            // `Quaternion::one()` is the identity quaternion (no rotation)
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::new(1.0, 1.0, 1.0),
        }
    }

    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: cgmath::Vector3::new(x, y, z),
            ..Self::new()
        }
    }

    /// Replace the rotation with a rotation of `angle` about the +Y axis.
    pub fn set_rotation_y(&mut self, angle: Rad<f32>) {
        self.rotation = cgmath::Quaternion::from_angle_y(angle);
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    pub fn to_raw(&self) -> TransformRaw {
        TransformRaw {
            model: self.to_matrix().into(),
            normal: cgmath::Matrix3::from(self.rotation).into(),
        }
    }
}

impl Mul<Transform> for Transform {
    type Output = Self;

    fn mul(self, rhs: Transform) -> Self::Output {
        &self * &rhs
    }
}

impl<'a, 'b> Mul<&'b Transform> for &'a Transform {
    type Output = Transform;

    fn mul(self, rhs: &'b Transform) -> Self::Output {
        let new_rotation = self.rotation * rhs.rotation;

        let new_scale = cgmath::Vector3::new(
            self.scale.x * rhs.scale.x,
            self.scale.y * rhs.scale.y,
            self.scale.z * rhs.scale.z,
        );
        let scaled_rhs_pos = cgmath::Vector3::new(
            self.scale.x * rhs.position.x,
            self.scale.y * rhs.position.y,
            self.scale.z * rhs.position.z,
        );
        let new_position = self.position + (self.rotation * scaled_rhs_pos);

        Transform {
            position: new_position,
            rotation: new_rotation,
            scale: new_scale,
        }
    }
}

impl From<cgmath::Vector3<f32>> for Transform {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

/**
 * The raw transform is the actual data stored on the GPU
 */
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TransformRaw {
    model: [[f32; 4]; 4],
    normal: [[f32; 3]; 3],
}

/**
 * As we store transform data directly in GPU memory we need to tell what the
 * bytes refer to.
 *
 * Stride layout here: the 4x4 model matrix (four vec4 slots) followed by a
 * 3x3 normal matrix (three vec3 slots).
 */
impl mesh::Vertex for TransformRaw {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<TransformRaw>() as wgpu::BufferAddress,
            // Step per instance rather than per vertex: the shader advances
            // to the next transform only when a new instance starts.
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 5,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // A mat4 takes up 4 vertex slots as it is technically 4 vec4s.
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 4]>() as wgpu::BufferAddress,
                    // corresponds to the @location in the shader file.
                    shader_location: 6,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 8]>() as wgpu::BufferAddress,
                    shader_location: 7,
                    format: wgpu::VertexFormat::Float32x4,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 12]>() as wgpu::BufferAddress,
                    shader_location: 8,
                    format: wgpu::VertexFormat::Float32x4,
                },
                // Normal matrix as three vec3 slots
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 16]>() as wgpu::BufferAddress,
                    shader_location: 9,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 19]>() as wgpu::BufferAddress,
                    shader_location: 10,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 22]>() as wgpu::BufferAddress,
                    shader_location: 11,
                    format: wgpu::VertexFormat::Float32x3,
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{Deg, InnerSpace, Quaternion, Rotation3, Vector3};

    #[test]
    fn identity_composition_is_identity() {
        let id = Transform::new();
        let composed = &id * &id;
        assert_eq!(composed, Transform::new());
    }

    #[test]
    fn parent_translation_offsets_child() {
        let parent = Transform::at(3.0, 10.0, 4.0);
        let child = Transform::at(0.0, 2.0, 0.0);
        let world = &parent * &child;
        assert_eq!(world.position, Vector3::new(3.0, 12.0, 4.0));
    }

    #[test]
    fn parent_scale_applies_to_child_position() {
        let parent = Transform {
            scale: Vector3::new(2.0, 2.0, 2.0),
            ..Transform::new()
        };
        let child = Transform::at(1.0, 0.0, 0.0);
        let world = &parent * &child;
        assert_eq!(world.position, Vector3::new(2.0, 0.0, 0.0));
        assert_eq!(world.scale, Vector3::new(2.0, 2.0, 2.0));
    }

    #[test]
    fn composition_matches_matrix_product() {
        let parent = Transform {
            position: Vector3::new(1.0, 2.0, 3.0),
            rotation: Quaternion::from_angle_y(Deg(37.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        };
        let child = Transform {
            position: Vector3::new(-2.0, 0.5, 4.0),
            rotation: Quaternion::from_angle_x(Deg(12.0)),
            scale: Vector3::new(1.0, 1.0, 1.0),
        };
        let composed = (&parent * &child).to_matrix();
        let product = parent.to_matrix() * child.to_matrix();
        for col in 0..4 {
            let a: [f32; 4] = composed[col].into();
            let b: [f32; 4] = product[col].into();
            for i in 0..4 {
                assert!((a[i] - b[i]).abs() < 1e-5, "column {col} row {i}");
            }
        }
    }

    #[test]
    fn set_rotation_y_overwrites_previous_angle() {
        let mut t = Transform::new();
        t.set_rotation_y(Rad(1.0));
        t.set_rotation_y(Rad(2.5));
        let expected = Quaternion::from_angle_y(Rad(2.5));
        assert!((t.rotation.dot(expected)).abs() > 0.999_99);
    }
}
