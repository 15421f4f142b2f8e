//! Frame rendering.
//!
//! The renderer walks the scene tree each frame, batches draw items that
//! share a mesh and material into instanced draws, and keeps GPU caches for
//! meshes, material bind groups and per-batch instance buffers. Meshes upload
//! on first use; material bind groups are rebuilt when their texture slot
//! moves to a newer generation.

use std::collections::HashMap;
use std::sync::Arc;

use wgpu::util::DeviceExt;

use crate::{
    context::Context,
    data_structures::{
        material::{Material, MaterialSurface, TextureHandle},
        mesh::{GpuMesh, MeshData},
        scene_graph::{DrawItem, Node},
        transform::TransformRaw,
    },
    resources::registry::TextureRegistry,
};

struct MaterialEntry {
    generation: u64,
    bind_group: wgpu::BindGroup,
}

struct Batch {
    geometry_key: usize,
    material_key: usize,
    geometry: Arc<MeshData>,
    material: Arc<Material>,
    transforms: Vec<TransformRaw>,
}

#[derive(Default)]
pub struct Renderer {
    mesh_cache: HashMap<usize, GpuMesh>,
    material_cache: HashMap<usize, MaterialEntry>,
    instance_buffers: HashMap<(usize, usize), (wgpu::Buffer, usize)>,
    background_bind_group: Option<wgpu::BindGroup>,
    background_generation: u64,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(
        &mut self,
        ctx: &mut Context,
        root: &Node,
        registry: &mut TextureRegistry,
        background: Option<TextureHandle>,
    ) -> Result<(), wgpu::SurfaceError> {
        ctx.camera.update(&ctx.queue);
        let (camera, projection) = (&ctx.camera.camera, &ctx.camera.projection);
        ctx.background.uniform.update(camera, projection);
        ctx.queue.write_buffer(
            &ctx.background.buffer,
            0,
            bytemuck::cast_slice(&[ctx.background.uniform]),
        );

        let mut draws = Vec::new();
        root.collect_draws(&mut draws);
        let batches = batch_draws(draws);
        self.prepare(ctx, registry, &batches);
        self.prepare_background(ctx, registry, background);

        let output = ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &ctx.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&ctx.opaque_pipeline);
            render_pass.set_bind_group(1, &ctx.camera.bind_group, &[]);
            render_pass.set_bind_group(2, &ctx.light.bind_group, &[]);
            self.draw_batches(&mut render_pass, &batches, false);

            render_pass.set_pipeline(&ctx.double_sided_pipeline);
            self.draw_batches(&mut render_pass, &batches, true);

            if let Some(bind_group) = &self.background_bind_group {
                render_pass.set_pipeline(&ctx.background.render_pipeline);
                render_pass.set_bind_group(0, &ctx.background.uniform_bind_group, &[]);
                render_pass.set_bind_group(1, bind_group, &[]);
                render_pass.draw(0..3, 0..1);
            }
        }

        ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    /// Make sure every mesh, material bind group and instance buffer a batch
    /// needs exists before the pass starts borrowing them.
    fn prepare(&mut self, ctx: &mut Context, registry: &mut TextureRegistry, batches: &[Batch]) {
        for batch in batches {
            if !self.mesh_cache.contains_key(&batch.geometry_key) {
                // The Arc in the batch keeps the allocation alive, so the
                // pointer key stays valid for the cache's lifetime
                let gpu = batch.geometry.upload(&ctx.device);
                self.mesh_cache.insert(batch.geometry_key, gpu);
            }

            let generation = match batch.material.surface {
                MaterialSurface::Texture(handle) => registry.generation(handle),
                MaterialSurface::Color(_) => 0,
            };
            let stale = self
                .material_cache
                .get(&batch.material_key)
                .map(|entry| entry.generation != generation)
                .unwrap_or(true);
            if stale {
                let bind_group = mk_material_bind_group(ctx, registry, &batch.material);
                self.material_cache.insert(
                    batch.material_key,
                    MaterialEntry {
                        generation,
                        bind_group,
                    },
                );
            }

            let key = (batch.geometry_key, batch.material_key);
            let raw: &[TransformRaw] = &batch.transforms;
            let needs_new = self
                .instance_buffers
                .get(&key)
                .map(|(_, capacity)| *capacity < raw.len())
                .unwrap_or(true);
            if needs_new {
                let buffer = ctx
                    .device
                    .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                        label: Some("Instance Buffer"),
                        contents: bytemuck::cast_slice(raw),
                        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                    });
                self.instance_buffers.insert(key, (buffer, raw.len()));
            } else if let Some((buffer, _)) = self.instance_buffers.get(&key) {
                ctx.queue.write_buffer(buffer, 0, bytemuck::cast_slice(raw));
            }
        }
    }

    fn prepare_background(
        &mut self,
        ctx: &Context,
        registry: &mut TextureRegistry,
        background: Option<TextureHandle>,
    ) {
        let Some(handle) = background else {
            return;
        };
        let generation = registry.generation(handle);
        if generation == 0 {
            // Still decoding; the pass stays skipped and the clear color shows
            return;
        }
        if self.background_bind_group.is_none() || self.background_generation != generation {
            if let Some(texture) = registry.ensure_uploaded(&ctx.device, &ctx.queue, handle) {
                self.background_bind_group =
                    Some(ctx.background.mk_texture_bind_group(&ctx.device, texture));
                self.background_generation = generation;
            }
        }
    }

    fn draw_batches(
        &self,
        render_pass: &mut wgpu::RenderPass<'_>,
        batches: &[Batch],
        double_sided: bool,
    ) {
        for batch in batches {
            if batch.material.double_sided != double_sided {
                continue;
            }
            let (Some(mesh), Some(material), Some((instances, _))) = (
                self.mesh_cache.get(&batch.geometry_key),
                self.material_cache.get(&batch.material_key),
                self.instance_buffers
                    .get(&(batch.geometry_key, batch.material_key)),
            ) else {
                continue;
            };
            render_pass.set_bind_group(0, &material.bind_group, &[]);
            render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
            render_pass.set_vertex_buffer(1, instances.slice(..));
            render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..mesh.num_elements, 0, 0..batch.transforms.len() as u32);
        }
    }
}

/// Group draw items by shared mesh and material so siblings like the six fan
/// blades become one instanced draw. Batch order follows first appearance in
/// the tree.
fn batch_draws(draws: Vec<DrawItem>) -> Vec<Batch> {
    let mut order: HashMap<(usize, usize), usize> = HashMap::new();
    let mut batches: Vec<Batch> = Vec::new();
    for draw in draws {
        let geometry_key = Arc::as_ptr(&draw.geometry) as usize;
        let material_key = Arc::as_ptr(&draw.material) as usize;
        let key = (geometry_key, material_key);
        match order.get(&key) {
            Some(&idx) => batches[idx].transforms.push(draw.transform),
            None => {
                order.insert(key, batches.len());
                batches.push(Batch {
                    geometry_key,
                    material_key,
                    geometry: draw.geometry,
                    material: draw.material,
                    transforms: vec![draw.transform],
                });
            }
        }
    }
    batches
}

fn mk_material_bind_group(
    ctx: &mut Context,
    registry: &mut TextureRegistry,
    material: &Material,
) -> wgpu::BindGroup {
    let raw = material.to_raw();
    let buffer = ctx
        .device
        .create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Material Buffer", material.name)),
            contents: bytemuck::cast_slice(&[raw]),
            usage: wgpu::BufferUsages::UNIFORM,
        });

    let texture = match material.surface {
        MaterialSurface::Texture(handle) => registry
            .ensure_uploaded(&ctx.device, &ctx.queue, handle)
            .unwrap_or(&ctx.placeholder_texture),
        MaterialSurface::Color(_) => &ctx.placeholder_texture,
    };

    let layout = crate::data_structures::material::material_bind_group_layout(&ctx.device);
    ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("{:?} Material Bind Group", material.name)),
        layout: &layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            },
            wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            },
        ],
    })
}
