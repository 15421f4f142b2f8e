//! Scene assembly checks that run without a GPU.
//!
//! The scene graph, geometry and registry are plain CPU data, so the full
//! interior can be assembled and animated in a plain test process.

use std::f32::consts::TAU;
use std::sync::Arc;

use cgmath::{InnerSpace, Quaternion, Rad, Rotation3};
use hearth::InteriorScene;
use hearth::fixtures::{self, FAN_BLADES, LAMP_PROFILE_POINTS};

fn one_pixel() -> image::DynamicImage {
    image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1))
}

#[test]
fn interior_assembles_with_fixtures() {
    let scene = InteriorScene::new();
    // Floor, three walls, furniture, the fan and two lamps all exist up front
    assert!(scene.node_count() > 25);
    assert_eq!(scene.registry.len(), 6);
}

#[test]
fn fan_blades_share_one_mesh_at_even_angles() {
    let fan = fixtures::ceiling_fan();
    assert_eq!(fan.children.len(), FAN_BLADES + 1);

    let blades = &fan.children[1..];
    let first = blades[0].surface.as_ref().unwrap();
    for (i, blade) in blades.iter().enumerate() {
        let surface = blade.surface.as_ref().unwrap();
        assert!(Arc::ptr_eq(&surface.geometry, &first.geometry));
        assert!(Arc::ptr_eq(&surface.material, &first.material));

        let expected = Quaternion::from_angle_y(Rad(i as f32 * TAU / FAN_BLADES as f32));
        assert!(blade.local.rotation.dot(expected).abs() > 0.999_99, "blade {i}");
    }
}

#[test]
fn lamp_shade_follows_the_sine_profile() {
    let profile = fixtures::lamp_profile();
    assert_eq!(profile.len(), LAMP_PROFILE_POINTS);
    for (i, point) in profile.iter().enumerate() {
        assert!((point[0] - ((i as f32 * 0.2).sin() * 3.0 + 1.0)).abs() < 1e-6);
        assert!((point[1] - ((i as f32 - 5.0) * 0.8)).abs() < 1e-6);
    }
}

#[test]
fn fan_pose_depends_only_on_elapsed_time() {
    let mut many_frames = InteriorScene::new();
    for i in 0..100 {
        many_frames.advance(i as f32 * 0.025);
    }
    many_frames.advance(2.5);

    let mut one_frame = InteriorScene::new();
    one_frame.advance(2.5);

    assert!(
        many_frames
            .fan()
            .local
            .rotation
            .dot(one_frame.fan().local.rotation)
            .abs()
            > 0.999_99
    );
}

#[test]
fn texture_loads_commute() {
    let mut forward = InteriorScene::new();
    let mut backward = InteriorScene::new();

    let mut pending = forward.registry.pending();
    for (handle, _) in &pending {
        forward.registry.fulfill_image(*handle, one_pixel());
    }
    pending.reverse();
    for (handle, _) in &pending {
        backward.registry.fulfill_image(*handle, one_pixel());
    }

    assert_eq!(forward.node_count(), backward.node_count());
    for (handle, _) in pending {
        assert!(forward.registry.is_loaded(handle));
        assert!(backward.registry.is_loaded(handle));
    }
}

#[test]
fn node_count_never_decreases() {
    let mut scene = InteriorScene::new();
    let mut last = scene.node_count();

    for i in 0..5 {
        scene.advance(i as f32 * 0.016);
        assert!(scene.node_count() >= last);
        last = scene.node_count();
    }

    scene
        .registry
        .fulfill_image(scene.handles.marble, one_pixel());
    assert!(scene.node_count() >= last);
}

#[test]
fn partial_load_failure_leaves_the_scene_intact() {
    // A failed decode simply never fulfills its slot; everything else
    // proceeds
    let mut scene = InteriorScene::new();
    let before = scene.node_count();
    scene.registry.fulfill_image(scene.handles.wall, one_pixel());
    scene.advance(1.0);
    assert_eq!(scene.node_count(), before);
    assert!(!scene.registry.is_loaded(scene.handles.floor));
    assert!(scene.registry.is_loaded(scene.handles.wall));
}
