use std::io::{BufReader, Cursor};

use crate::data_structures::mesh::MeshData;
use crate::resources::texture::load_string;

/**
 * This module contains all logic for loading meshes/textures/etc. from
 * external files.
 */
pub mod registry;
pub mod texture;

/// One mesh of a loaded model plus the appearance its MTL material declared.
pub struct LoadedMesh {
    pub mesh: MeshData,
    pub diffuse_color: [f32; 4],
    pub diffuse_texture: Option<String>,
}

pub struct LoadedModel {
    pub name: String,
    pub meshes: Vec<LoadedMesh>,
}

/// Load an OBJ model and its MTL companion.
///
/// The MTL is fetched through the loader callback, so both files stream
/// through the same asset IO. CPU-only: the returned meshes upload lazily
/// when the renderer first sees them.
pub async fn load_model_obj(file_name: &str) -> anyhow::Result<LoadedModel> {
    let obj_text = load_string(file_name).await?;
    let obj_cursor = Cursor::new(obj_text);
    let mut obj_reader = BufReader::new(obj_cursor);

    // MTL paths in the OBJ are relative to the OBJ's own directory
    let base_dir = std::path::Path::new(file_name)
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();

    let (models, obj_materials) = tobj::load_obj_buf_async(
        &mut obj_reader,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
        |p| {
            let mtl_path = base_dir.join(&p).to_string_lossy().into_owned();
            async move {
                match load_string(&mtl_path).await {
                    Ok(mat_text) => {
                        tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(mat_text)))
                    }
                    Err(e) => {
                        log::warn!("material file {mtl_path} not found: {e}");
                        Err(tobj::LoadError::OpenFileFailed)
                    }
                }
            }
        },
    )
    .await?;

    let materials = obj_materials.unwrap_or_else(|e| {
        log::warn!("failed to parse materials for {file_name}: {e}");
        Vec::new()
    });

    let mut meshes = Vec::new();
    for m in models {
        let mesh = &m.mesh;
        let data = mesh_data_from_obj(&m.name, mesh);

        let (diffuse_color, diffuse_texture) = match mesh.material_id.and_then(|id| materials.get(id)) {
            Some(material) => {
                let color = material
                    .diffuse
                    .map(|[r, g, b]| [r, g, b, 1.0])
                    .unwrap_or([1.0, 1.0, 1.0, 1.0]);
                let texture = material
                    .diffuse_texture
                    .as_ref()
                    .map(|t| base_dir.join(t).to_string_lossy().into_owned());
                (color, texture)
            }
            None => ([1.0, 1.0, 1.0, 1.0], None),
        };

        meshes.push(LoadedMesh {
            mesh: data,
            diffuse_color,
            diffuse_texture,
        });
    }

    Ok(LoadedModel {
        name: file_name.to_string(),
        meshes,
    })
}

fn mesh_data_from_obj(name: &str, mesh: &tobj::Mesh) -> MeshData {
    let mut data = MeshData::new(name);
    data.positions = mesh
        .positions
        .chunks_exact(3)
        .map(|p| [p[0], p[1], p[2]])
        .collect();
    data.normals = mesh
        .normals
        .chunks_exact(3)
        .map(|n| [n[0], n[1], n[2]])
        .collect();
    // OBJ puts the texture origin at the bottom left, wgpu at the top left
    data.tex_coords = mesh
        .texcoords
        .chunks_exact(2)
        .map(|t| [t[0], 1.0 - t[1]])
        .collect();
    data.indices = mesh.indices.clone();
    if data.normals.len() < data.positions.len() {
        data.normals.resize(data.positions.len(), [0.0, 1.0, 0.0]);
    }
    if data.tex_coords.len() < data.positions.len() {
        data.tex_coords.resize(data.positions.len(), [0.0, 0.0]);
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obj_conversion_keeps_counts_and_flips_v() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            normals: vec![0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0],
            texcoords: vec![0.0, 0.0, 1.0, 0.25, 0.5, 1.0],
            indices: vec![0, 1, 2],
            ..Default::default()
        };

        let data = mesh_data_from_obj("tri", &mesh);
        assert_eq!(data.positions.len(), 3);
        assert_eq!(data.normals.len(), 3);
        assert_eq!(data.indices, vec![0, 1, 2]);
        assert_eq!(data.tex_coords[0], [0.0, 1.0]);
        assert_eq!(data.tex_coords[1], [1.0, 0.75]);
        assert_eq!(data.tex_coords[2], [0.5, 0.0]);
    }

    #[test]
    fn obj_conversion_pads_missing_attributes() {
        let mesh = tobj::Mesh {
            positions: vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            indices: vec![0, 1, 2],
            ..Default::default()
        };

        let data = mesh_data_from_obj("bare", &mesh);
        assert_eq!(data.normals.len(), 3);
        assert_eq!(data.tex_coords.len(), 3);
        assert_eq!(data.normals[0], [0.0, 1.0, 0.0]);
    }
}
