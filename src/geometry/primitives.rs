use std::f32::consts::{PI, TAU};

use crate::data_structures::mesh::MeshData;

/// A flat rectangle in the XY plane, centered at the origin, facing +Z.
///
/// Callers lay it down (floor) or stand it up (walls) via the node transform,
/// the same way the rest of the scene treats geometry as axis-aligned until
/// placed.
pub fn plane(width: f32, height: f32) -> MeshData {
    let mut data = MeshData::new("plane");
    let hw = width * 0.5;
    let hh = height * 0.5;

    for (x, y, u, v) in [
        (-hw, -hh, 0.0, 1.0),
        (hw, -hh, 1.0, 1.0),
        (hw, hh, 1.0, 0.0),
        (-hw, hh, 0.0, 0.0),
    ] {
        data.positions.push([x, y, 0.0]);
        data.normals.push([0.0, 0.0, 1.0]);
        data.tex_coords.push([u, v]);
    }
    data.indices = vec![0, 1, 2, 2, 3, 0];
    data
}

/// An axis-aligned box centered at the origin.
///
/// 24 vertices (4 per face) so each face gets its own normal and a 0..1 UV
/// patch.
pub fn cuboid(width: f32, height: f32, depth: f32) -> MeshData {
    let mut data = MeshData::new("cuboid");
    let (hw, hh, hd) = (width * 0.5, height * 0.5, depth * 0.5);

    let positions = [
        // Front face (+Z)
        [-hw, -hh, hd], [hw, -hh, hd], [hw, hh, hd], [-hw, hh, hd],
        // Back face (-Z)
        [hw, -hh, -hd], [-hw, -hh, -hd], [-hw, hh, -hd], [hw, hh, -hd],
        // Left face (-X)
        [-hw, -hh, -hd], [-hw, -hh, hd], [-hw, hh, hd], [-hw, hh, -hd],
        // Right face (+X)
        [hw, -hh, hd], [hw, -hh, -hd], [hw, hh, -hd], [hw, hh, hd],
        // Top face (+Y)
        [-hw, hh, hd], [hw, hh, hd], [hw, hh, -hd], [-hw, hh, -hd],
        // Bottom face (-Y)
        [-hw, -hh, -hd], [hw, -hh, -hd], [hw, -hh, hd], [-hw, -hh, hd],
    ];
    let normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    for (i, position) in positions.iter().enumerate() {
        data.positions.push(*position);
        data.normals.push(normals[i / 4]);
    }
    for _ in 0..6 {
        data.tex_coords.extend([[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]);
    }
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    data
}

/// A UV sphere of the given radius, centered at the origin.
///
/// `width_segments` are longitude divisions, `height_segments` latitude
/// divisions.
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut data = MeshData::new("sphere");
    let long_segs = width_segments.max(3);
    let lat_segs = height_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * TAU / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let x = sin_theta * cos_phi;
            let y = cos_theta;
            let z = sin_theta * sin_phi;

            data.positions.push([x * radius, y * radius, z * radius]);
            // Normal equals the unit position on a sphere
            data.normals.push([x, y, z]);
            data.tex_coords.push([
                long as f32 / long_segs as f32,
                lat as f32 / lat_segs as f32,
            ]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;
            data.indices.extend([first, first + 1, second]);
            data.indices.extend([second, first + 1, second + 1]);
        }
    }
    data
}

/// A capped cylinder (or cone frustum) along the Y axis, centered at the
/// origin. Distinct top and bottom radii cover the tapered shapes in the
/// scene; equal radii give a straight cylinder.
pub fn cylinder(radius_top: f32, radius_bottom: f32, height: f32, radial_segments: u32) -> MeshData {
    let mut data = MeshData::new("cylinder");
    let segs = radial_segments.max(3);
    let hh = height * 0.5;

    // Side normal comes from the slanted profile: tangent (dr, h) rotated
    // a quarter turn outward.
    let dr = radius_top - radius_bottom;
    let slant = (height * height + dr * dr).sqrt();
    let (n_r, n_y) = (height / slant, -dr / slant);

    for i in 0..=segs {
        let angle = i as f32 * TAU / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        let u = i as f32 / segs as f32;

        data.positions
            .push([radius_bottom * cos_a, -hh, radius_bottom * sin_a]);
        data.normals.push([n_r * cos_a, n_y, n_r * sin_a]);
        data.tex_coords.push([u, 1.0]);

        data.positions
            .push([radius_top * cos_a, hh, radius_top * sin_a]);
        data.normals.push([n_r * cos_a, n_y, n_r * sin_a]);
        data.tex_coords.push([u, 0.0]);
    }

    for i in 0..segs {
        let bottom = i * 2;
        let top = bottom + 1;
        let bottom_next = bottom + 2;
        let top_next = bottom + 3;
        data.indices.extend([bottom, top, bottom_next]);
        data.indices.extend([top, top_next, bottom_next]);
    }

    // Caps get their own ring so the rim keeps a hard edge.
    for (radius, y, ny) in [(radius_top, hh, 1.0f32), (radius_bottom, -hh, -1.0)] {
        let center = data.positions.len() as u32;
        data.positions.push([0.0, y, 0.0]);
        data.normals.push([0.0, ny, 0.0]);
        data.tex_coords.push([0.5, 0.5]);

        for i in 0..=segs {
            let angle = i as f32 * TAU / segs as f32;
            let (sin_a, cos_a) = angle.sin_cos();
            data.positions.push([radius * cos_a, y, radius * sin_a]);
            data.normals.push([0.0, ny, 0.0]);
            data.tex_coords
                .push([cos_a * 0.5 + 0.5, sin_a * 0.5 + 0.5]);
        }
        for i in 0..segs {
            let current = center + 1 + i;
            let next = current + 1;
            if ny > 0.0 {
                data.indices.extend([center, next, current]);
            } else {
                data.indices.extend([center, current, next]);
            }
        }
    }
    data
}

/// A solid of revolution: sweeps a 2-D profile (radius, height) a full turn
/// around the Y axis.
///
/// Produces `points.len() * (segments + 1)` vertices; normals come from the
/// profile tangents (central differences at interior points).
pub fn lathe(points: &[[f32; 2]], segments: u32) -> MeshData {
    let mut data = MeshData::new("lathe");
    let segs = segments.max(3);
    let count = points.len();
    if count < 2 {
        return data;
    }

    // 2-D outward normal per profile point: segment tangent (dr, dy)
    // rotated to (dy, -dr), averaged at interior points.
    let mut profile_normals = Vec::with_capacity(count);
    for i in 0..count {
        let prev = if i == 0 { i } else { i - 1 };
        let next = if i == count - 1 { i } else { i + 1 };
        let dr = points[next][0] - points[prev][0];
        let dy = points[next][1] - points[prev][1];
        let len = (dr * dr + dy * dy).sqrt().max(f32::EPSILON);
        profile_normals.push([dy / len, -dr / len]);
    }

    for j in 0..=segs {
        let angle = j as f32 * TAU / segs as f32;
        let (sin_a, cos_a) = angle.sin_cos();
        for (i, point) in points.iter().enumerate() {
            let [radius, y] = *point;
            let [n_r, n_y] = profile_normals[i];
            data.positions.push([radius * cos_a, y, radius * sin_a]);
            data.normals.push([n_r * cos_a, n_y, n_r * sin_a]);
            data.tex_coords.push([
                j as f32 / segs as f32,
                1.0 - i as f32 / (count - 1) as f32,
            ]);
        }
    }

    let stride = count as u32;
    for j in 0..segs {
        for i in 0..stride - 1 {
            let a = j * stride + i;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            data.indices.extend([a, b, c]);
            data.indices.extend([b, d, c]);
        }
    }
    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plane_is_one_quad() {
        let p = plane(40.0, 40.0);
        assert_eq!(p.vertex_count(), 4);
        assert_eq!(p.triangle_count(), 2);
        assert!(p.normals.iter().all(|n| *n == [0.0, 0.0, 1.0]));
    }

    #[test]
    fn cuboid_counts() {
        let c = cuboid(2.0, 2.0, 2.0);
        assert_eq!(c.vertex_count(), 24); // 6 faces * 4 vertices
        assert_eq!(c.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(c.tex_coords.len(), 24);
    }

    #[test]
    fn cuboid_respects_dimensions() {
        let c = cuboid(14.0, 4.0, 4.0);
        for p in &c.positions {
            assert!(p[0].abs() <= 7.0 && p[1].abs() <= 2.0 && p[2].abs() <= 2.0);
        }
        assert!(c.positions.iter().any(|p| p[0] == 7.0));
    }

    #[test]
    fn sphere_counts_and_unit_normals() {
        let s = sphere(0.55, 32, 16);
        assert_eq!(s.vertex_count(), 33 * 17);
        assert_eq!(s.triangle_count(), 32 * 16 * 2);
        for n in &s.normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn cylinder_counts() {
        let segs = 32u32;
        let c = cylinder(0.3, 0.1, 1.0, segs);
        // 2 side vertices per slice column, plus a center and ring per cap
        assert_eq!(c.vertex_count() as u32, 2 * (segs + 1) + 2 * (segs + 2));
        assert_eq!(c.triangle_count() as u32, 4 * segs);
    }

    #[test]
    fn cylinder_spans_height() {
        let c = cylinder(1.0, 0.75, 0.5, 32);
        assert!(c.positions.iter().all(|p| p[1].abs() <= 0.25 + 1e-6));
        assert!(c.positions.iter().any(|p| p[1] == 0.25));
        assert!(c.positions.iter().any(|p| p[1] == -0.25));
    }

    #[test]
    fn lathe_counts() {
        let profile = [[1.0, -4.0], [1.5, -3.2], [2.0, -2.4]];
        let s = 12u32;
        let l = lathe(&profile, s);
        assert_eq!(l.vertex_count() as u32, 3 * (s + 1));
        assert_eq!(l.triangle_count() as u32, 2 * 2 * s);
    }

    #[test]
    fn lathe_first_ring_matches_profile() {
        let profile = [[1.0, -4.0], [1.5, -3.2], [2.0, -2.4]];
        let l = lathe(&profile, 12);
        for (i, p) in profile.iter().enumerate() {
            let v = l.positions[i];
            assert!((v[0] - p[0]).abs() < 1e-6);
            assert!((v[1] - p[1]).abs() < 1e-6);
            assert!(v[2].abs() < 1e-6);
        }
    }

    #[test]
    fn degenerate_lathe_profile_yields_empty_mesh() {
        let l = lathe(&[[1.0, 0.0]], 12);
        assert_eq!(l.vertex_count(), 0);
        assert_eq!(l.triangle_count(), 0);
    }
}
