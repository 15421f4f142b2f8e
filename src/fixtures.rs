//! Parametric light fixtures: the ceiling fan and the hanging lamps.
//!
//! Both are built as group nodes so the whole fixture moves (or, for the fan,
//! spins) as one unit. Blades and shades share their geometry and material
//! through `Arc`, so six blades cost one mesh upload and one instanced draw.

use std::f32::consts::TAU;
use std::sync::Arc;

use cgmath::{Rad, Rotation3};

use crate::data_structures::{material::Material, scene_graph::Node, transform::Transform};
use crate::geometry;

pub const FAN_BLADES: usize = 6;
pub const LAMP_PROFILE_POINTS: usize = 3;
pub const LAMP_SEGMENTS: u32 = 12;

/// A ceiling fan: central shaft plus [`FAN_BLADES`] blades spread evenly
/// around the Y axis. Rotating the returned group about Y spins the whole
/// fan.
pub fn ceiling_fan() -> Node {
    let mut fan = Node::group("ceiling_fan");

    let shaft_mesh = Arc::new(geometry::cylinder(0.1, 0.1, 3.0, 32));
    let shaft_material = Arc::new(Material::color("fan_shaft", 0xf7d681));
    fan.add_child(
        Node::mesh("fan_shaft", shaft_mesh, shaft_material)
            .with_transform(Transform::at(0.0, 2.0, 0.0)),
    );

    let blade_mesh = Arc::new(geometry::cuboid(0.1, 0.5, 4.0));
    let blade_material = Arc::new(Material::color("fan_blade", 0x423934));
    for i in 0..FAN_BLADES {
        let mut transform = Transform::at(0.0, 0.5, 0.0);
        transform.set_rotation_y(Rad(i as f32 * TAU / FAN_BLADES as f32));
        fan.add_child(
            Node::mesh(
                &format!("fan_blade_{i}"),
                Arc::clone(&blade_mesh),
                Arc::clone(&blade_material),
            )
            .with_transform(transform),
        );
    }

    fan
}

/// The lamp shade outline, radius and height per profile point.
pub fn lamp_profile() -> Vec<[f32; 2]> {
    (0..LAMP_PROFILE_POINTS)
        .map(|i| {
            [
                (i as f32 * 0.2).sin() * 3.0 + 1.0,
                (i as f32 - 5.0) * 0.8,
            ]
        })
        .collect()
}

/// A hanging ceiling lamp: a thin rope cylinder and a lathed shade.
pub fn ceiling_lamp() -> Node {
    let mut lamp = Node::group("ceiling_lamp");

    let rope_mesh = Arc::new(geometry::cylinder(0.1, 0.1, 7.0, 32));
    let rope_material = Arc::new(Material::color("lamp_rope", 0xf7d681));
    lamp.add_child(Node::mesh("lamp_rope", rope_mesh, rope_material));

    let shade_mesh = Arc::new(geometry::lathe(&lamp_profile(), LAMP_SEGMENTS));
    let shade_material = Arc::new(Material::color("lamp_shade", 0xc9c9c9).with_double_sided());
    lamp.add_child(Node::mesh("lamp_shade", shade_mesh, shade_material));

    lamp
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    #[test]
    fn fan_has_shaft_plus_blades() {
        let fan = ceiling_fan();
        assert_eq!(fan.children.len(), FAN_BLADES + 1);
        assert!(fan.surface.is_none());
    }

    #[test]
    fn blades_share_geometry_and_material() {
        let fan = ceiling_fan();
        let blades = &fan.children[1..];
        let first = blades[0].surface.as_ref().unwrap();
        for blade in &blades[1..] {
            let surface = blade.surface.as_ref().unwrap();
            assert!(Arc::ptr_eq(&surface.geometry, &first.geometry));
            assert!(Arc::ptr_eq(&surface.material, &first.material));
        }
    }

    #[test]
    fn blades_are_spread_evenly() {
        let fan = ceiling_fan();
        for (i, blade) in fan.children[1..].iter().enumerate() {
            let expected =
                cgmath::Quaternion::from_angle_y(Rad(i as f32 * TAU / FAN_BLADES as f32));
            assert!(
                blade.local.rotation.dot(expected).abs() > 0.999_99,
                "blade {i}"
            );
        }
    }

    #[test]
    fn lamp_has_rope_and_shade() {
        let lamp = ceiling_lamp();
        assert_eq!(lamp.children.len(), 2);
        assert_eq!(lamp.children[0].name, "lamp_rope");
        assert_eq!(lamp.children[1].name, "lamp_shade");
    }

    #[test]
    fn lamp_profile_follows_the_curve() {
        let profile = lamp_profile();
        assert_eq!(profile.len(), LAMP_PROFILE_POINTS);
        for (i, point) in profile.iter().enumerate() {
            let radius = (i as f32 * 0.2).sin() * 3.0 + 1.0;
            let height = (i as f32 - 5.0) * 0.8;
            assert!((point[0] - radius).abs() < 1e-6);
            assert!((point[1] - height).abs() < 1e-6);
        }
    }

    #[test]
    fn shade_vertex_count_matches_profile_and_segments() {
        let lamp = ceiling_lamp();
        let shade = lamp.children[1].surface.as_ref().unwrap();
        assert_eq!(
            shade.geometry.vertex_count(),
            LAMP_PROFILE_POINTS * (LAMP_SEGMENTS as usize + 1)
        );
    }
}
