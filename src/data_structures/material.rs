//! Surface appearance of scene meshes.
//!
//! A [`Material`] is CPU-side and immutable, shared by `Arc` across nodes the
//! same way meshes are. It either carries a flat color or points at a slot in
//! the texture registry; the renderer resolves the slot to whatever texture is
//! currently loaded (the placeholder until the decode lands).

/// Index of a texture slot in the [`TextureRegistry`](crate::resources::registry::TextureRegistry).
pub type TextureHandle = usize;

#[derive(Clone, Debug, PartialEq)]
pub enum MaterialSurface {
    Color([f32; 4]),
    Texture(TextureHandle),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    pub name: String,
    pub surface: MaterialSurface,
    /// Skip back-face culling for this material (floor and walls are visible
    /// from both sides).
    pub double_sided: bool,
    /// How often the texture tiles across the 0..1 UV patch.
    pub uv_repeat: [f32; 2],
}

impl Material {
    pub fn color(name: &str, rgb_hex: u32) -> Self {
        Self {
            name: name.to_string(),
            surface: MaterialSurface::Color(srgb_hex_to_linear(rgb_hex)),
            double_sided: false,
            uv_repeat: [1.0, 1.0],
        }
    }

    /// A flat color already in linear space, as loaded from an MTL file.
    pub fn flat(name: &str, rgba: [f32; 4]) -> Self {
        Self {
            name: name.to_string(),
            surface: MaterialSurface::Color(rgba),
            double_sided: false,
            uv_repeat: [1.0, 1.0],
        }
    }

    pub fn textured(name: &str, handle: TextureHandle) -> Self {
        Self {
            name: name.to_string(),
            surface: MaterialSurface::Texture(handle),
            double_sided: false,
            uv_repeat: [1.0, 1.0],
        }
    }

    pub fn with_double_sided(mut self) -> Self {
        self.double_sided = true;
        self
    }

    pub fn with_uv_repeat(mut self, u: f32, v: f32) -> Self {
        self.uv_repeat = [u, v];
        self
    }

    pub fn to_raw(&self) -> MaterialRaw {
        match self.surface {
            MaterialSurface::Color(color) => MaterialRaw {
                color,
                uv_repeat: self.uv_repeat,
                use_texture: 0.0,
                _padding: 0.0,
            },
            MaterialSurface::Texture(_) => MaterialRaw {
                color: [1.0, 1.0, 1.0, 1.0],
                uv_repeat: self.uv_repeat,
                use_texture: 1.0,
                _padding: 0.0,
            },
        }
    }
}

/// Convert a `0xRRGGBB` color to linear-space RGBA for lighting math.
pub fn srgb_hex_to_linear(hex: u32) -> [f32; 4] {
    let channel = |shift: u32| {
        let c = ((hex >> shift) & 0xff) as f32 / 255.0;
        if c <= 0.04045 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    [channel(16), channel(8), channel(0), 1.0]
}

/// Material parameters as laid out in the uniform buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialRaw {
    pub color: [f32; 4],
    pub uv_repeat: [f32; 2],
    pub use_texture: f32,
    pub _padding: f32,
}

/// Bind group layout shared by every material: parameter uniform, color
/// texture, sampler.
pub fn material_bind_group_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
    device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("material_bind_group_layout"),
        entries: &[
            wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 1,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    multisampled: false,
                    view_dimension: wgpu::TextureViewDimension::D2,
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                },
                count: None,
            },
            wgpu::BindGroupLayoutEntry {
                binding: 2,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_black_and_white_are_exact() {
        assert_eq!(srgb_hex_to_linear(0x000000), [0.0, 0.0, 0.0, 1.0]);
        let white = srgb_hex_to_linear(0xffffff);
        for c in &white[..3] {
            assert!((c - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn hex_channels_land_in_the_right_slots() {
        let red = srgb_hex_to_linear(0xff0000);
        assert!((red[0] - 1.0).abs() < 1e-6);
        assert_eq!(red[1], 0.0);
        assert_eq!(red[2], 0.0);
    }

    #[test]
    fn color_material_raw_carries_color() {
        let m = Material::color("counter", 0x423934);
        let raw = m.to_raw();
        assert_eq!(raw.use_texture, 0.0);
        assert_eq!(raw.color, srgb_hex_to_linear(0x423934));
    }

    #[test]
    fn textured_material_raw_uses_texture() {
        let m = Material::textured("floor", 0).with_uv_repeat(20.0, 20.0);
        let raw = m.to_raw();
        assert_eq!(raw.use_texture, 1.0);
        assert_eq!(raw.uv_repeat, [20.0, 20.0]);
        assert_eq!(raw.color, [1.0, 1.0, 1.0, 1.0]);
    }
}
