//! The kitchen and dining interior.
//!
//! [`InteriorScene`] assembles the whole static scene graph up front: floor,
//! walls, kitchen counters, fridge, dining table, TV corner, rug, bowls, the
//! ceiling fan and two hanging lamps. Textured materials point at registry
//! slots that start pending; the scene renders immediately with placeholders
//! and refines as decodes complete. The only per-frame mutation is the fan
//! angle.

use std::f32::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use cgmath::{InnerSpace, Quaternion, Rad, Rotation3, Vector3};

use crate::data_structures::{
    material::{Material, TextureHandle},
    scene_graph::Node,
    texture::SamplerSettings,
    transform::Transform,
};
use crate::fixtures;
use crate::geometry;
use crate::pipelines::light::{LightsRaw, PointLightRaw};
use crate::resources::{LoadedModel, registry::TextureRegistry};

const FLOOR_SIZE: f32 = 40.0;
const WALL_HEIGHT: f32 = 10.0;

/// Registry slots for the five scene textures plus the panorama background.
pub struct TextureHandles {
    pub floor: TextureHandle,
    pub wall: TextureHandle,
    pub marble: TextureHandle,
    pub old_wood: TextureHandle,
    pub rug: TextureHandle,
    pub background: TextureHandle,
}

pub struct InteriorScene {
    pub root: Node,
    pub registry: TextureRegistry,
    pub handles: TextureHandles,
    fan_index: usize,
}

impl InteriorScene {
    pub fn new() -> Self {
        let mut registry = TextureRegistry::new();
        let handles = TextureHandles {
            // Nearest magnification keeps the tiled planks crisp
            floor: registry.register(
                "wood.jpeg",
                SamplerSettings {
                    nearest_mag: true,
                    clamp: false,
                },
            ),
            wall: registry.register("beige_wall.jpeg", SamplerSettings::default()),
            marble: registry.register("marble.png", SamplerSettings::default()),
            old_wood: registry.register("oldwood.jpeg", SamplerSettings::default()),
            rug: registry.register("rug.jpeg", SamplerSettings::default()),
            background: registry.register(
                "sunset.jpg",
                SamplerSettings {
                    nearest_mag: false,
                    clamp: true,
                },
            ),
        };

        let mut root = Node::group("interior");

        // Floor and walls
        let floor_material = Arc::new(
            Material::textured("floor", handles.floor)
                .with_double_sided()
                .with_uv_repeat(FLOOR_SIZE / 2.0, FLOOR_SIZE / 2.0),
        );
        let floor_mesh = Arc::new(geometry::plane(FLOOR_SIZE, FLOOR_SIZE));
        root.add_child(
            Node::mesh("floor", floor_mesh, floor_material).with_transform(placed(
                [0.0, 0.0, 0.0],
                Quaternion::from_angle_x(Rad(-FRAC_PI_2)),
            )),
        );

        let wall_mesh = Arc::new(geometry::plane(FLOOR_SIZE, WALL_HEIGHT));
        let wall_material = Arc::new(Material::textured("wall", handles.wall).with_double_sided());
        root.add_child(
            Node::mesh("back_wall", Arc::clone(&wall_mesh), Arc::clone(&wall_material))
                .with_transform(Transform::at(0.0, WALL_HEIGHT / 2.0, -FLOOR_SIZE / 2.0)),
        );
        root.add_child(
            Node::mesh("left_wall", Arc::clone(&wall_mesh), Arc::clone(&wall_material))
                .with_transform(placed(
                    [-FLOOR_SIZE / 2.0, WALL_HEIGHT / 2.0, 0.0],
                    Quaternion::from_angle_y(Rad(FRAC_PI_2)),
                )),
        );
        root.add_child(
            Node::mesh("right_wall", wall_mesh, wall_material).with_transform(placed(
                [FLOOR_SIZE / 2.0, WALL_HEIGHT / 2.0, 0.0],
                Quaternion::from_angle_y(Rad(-FRAC_PI_2)),
            )),
        );

        // Kitchen counters with marble tops
        let counter_mesh = Arc::new(geometry::cuboid(14.0, 4.0, 4.0));
        let counter_material = Arc::new(Material::color("counter", 0x423934));
        root.add_child(
            Node::mesh("counter_back", Arc::clone(&counter_mesh), Arc::clone(&counter_material))
                .with_transform(Transform::at(-13.0, 2.001, -18.0)),
        );
        root.add_child(
            Node::mesh("counter_front", counter_mesh, Arc::clone(&counter_material))
                .with_transform(Transform::at(-13.0, 2.001, -8.0)),
        );

        let counter_top_mesh = Arc::new(geometry::cuboid(15.0, 0.5, 5.0));
        let marble_material = Arc::new(Material::textured("marble", handles.marble));
        root.add_child(
            Node::mesh(
                "counter_top_front",
                Arc::clone(&counter_top_mesh),
                Arc::clone(&marble_material),
            )
            .with_transform(Transform::at(-13.0, 4.29, -8.0)),
        );
        root.add_child(
            Node::mesh("counter_top_back", counter_top_mesh, Arc::clone(&marble_material))
                .with_transform(Transform::at(-13.0, 4.29, -18.0)),
        );

        // Decorations on the counter
        let plant_material = Arc::new(Material::color("plant", 0x429e37));
        root.add_child(
            Node::mesh(
                "plant_ball",
                Arc::new(geometry::sphere(0.55, 32, 16)),
                Arc::clone(&plant_material),
            )
            .with_transform(Transform::at(-13.0, 5.0, -8.0)),
        );
        root.add_child(
            Node::mesh(
                "plant_pot",
                Arc::new(geometry::cylinder(0.3, 0.1, 1.0, 32)),
                plant_material,
            )
            .with_transform(Transform::at(-13.0, 5.4, -8.0)),
        );

        // Fridge with its two doors
        root.add_child(
            Node::mesh(
                "fridge",
                Arc::new(geometry::cuboid(4.0, 8.0, 3.0)),
                Arc::new(Material::color("fridge", 0xd4d4d4)),
            )
            .with_transform(Transform::at(0.0, 4.0, -18.0)),
        );
        let door_material = Arc::new(Material::color("fridge_door", 0xd9d9d9));
        root.add_child(
            Node::mesh(
                "freezer_door",
                Arc::new(geometry::cuboid(3.2, 2.5, 0.2)),
                Arc::clone(&door_material),
            )
            .with_transform(Transform::at(0.0, 6.4, -16.5)),
        );
        root.add_child(
            Node::mesh(
                "fridge_door",
                Arc::new(geometry::cuboid(3.2, 4.5, 0.2)),
                door_material,
            )
            .with_transform(Transform::at(0.0, 2.5, -16.5)),
        );

        // Dining table: marble slab on three legs
        root.add_child(
            Node::mesh(
                "table_top",
                Arc::new(geometry::cuboid(4.0, 0.3, 12.0)),
                marble_material,
            )
            .with_transform(Transform::at(12.0, 4.29, -10.0)),
        );
        let leg_mesh = Arc::new(geometry::cuboid(2.0, 4.0, 2.0));
        for (i, z) in [-10.0, -6.0, -14.0].into_iter().enumerate() {
            root.add_child(
                Node::mesh(
                    &format!("table_leg_{i}"),
                    Arc::clone(&leg_mesh),
                    Arc::clone(&counter_material),
                )
                .with_transform(Transform::at(12.0, 2.2, z)),
            );
        }

        // TV corner
        root.add_child(
            Node::mesh(
                "tv_stand",
                Arc::new(geometry::cuboid(4.0, 2.0, 12.0)),
                Arc::new(Material::textured("old_wood", handles.old_wood)),
            )
            .with_transform(Transform::at(17.9888, 1.001, 5.0)),
        );
        root.add_child(
            Node::mesh(
                "tv",
                Arc::new(geometry::cuboid(0.5, 5.0, 8.0)),
                Arc::new(Material::color("tv", 0x000000)),
            )
            .with_transform(Transform::at(18.0, 4.3, 5.0)),
        );

        // Rug under the dining area
        root.add_child(
            Node::mesh(
                "rug",
                Arc::new(geometry::cuboid(16.0, 0.1, 18.0)),
                Arc::new(Material::textured("rug", handles.rug)),
            )
            .with_transform(Transform::at(4.0, 0.0, 5.0)),
        );

        // Pet bowls, inner one nested in the outer
        root.add_child(
            Node::mesh(
                "bowl_outer",
                Arc::new(geometry::cylinder(1.0, 0.75, 0.5, 32)),
                Arc::new(Material::color("bowl_outer", 0x445982)),
            )
            .with_transform(Transform::at(18.0, 0.25, 14.0)),
        );
        root.add_child(
            Node::mesh(
                "bowl_inner",
                Arc::new(geometry::cylinder(0.9, 0.65, 0.4, 32)),
                Arc::new(Material::color("bowl_inner", 0xa88c7b)),
            )
            .with_transform(Transform {
                position: Vector3::new(18.0, 0.34, 14.0),
                scale: Vector3::new(0.95, 0.95, 0.95),
                ..Transform::new()
            }),
        );

        // Fixtures
        let fan_index = root.add_child(
            fixtures::ceiling_fan().with_transform(Transform::at(3.0, 10.0, 4.0)),
        );
        root.add_child(
            fixtures::ceiling_lamp().with_transform(Transform::at(12.0, 15.0, -10.0)),
        );
        root.add_child(
            fixtures::ceiling_lamp().with_transform(Transform::at(-13.0, 15.0, -13.0)),
        );

        root.update_world_transforms(&Transform::new());

        Self {
            root,
            registry,
            handles,
            fan_index,
        }
    }

    /// The fixed light rig: ambient fill, a low sun through the window wall
    /// and the two lamp bulbs.
    pub fn lights() -> LightsRaw {
        let sun = Vector3::new(-1.0, 2.0, 4.0).normalize();
        LightsRaw {
            ambient_color: [1.0, 1.0, 1.0],
            ambient_intensity: 1.0,
            sun_direction: sun.into(),
            sun_intensity: 0.5,
            sun_color: [1.0, 1.0, 1.0],
            _padding: 0.0,
            points: [
                PointLightRaw {
                    position: [-13.0, 5.0, -13.0],
                    intensity: 90.0,
                    color: [1.0, 1.0, 1.0],
                    _padding: 0.0,
                },
                PointLightRaw {
                    position: [12.0, 5.0, -10.0],
                    intensity: 90.0,
                    color: [1.0, 1.0, 1.0],
                    _padding: 0.0,
                },
            ],
        }
    }

    /// Advance the animation to the absolute time `elapsed_seconds`.
    ///
    /// The fan angle is assigned, not accumulated: the same elapsed time
    /// always produces the same pose, however many frames were rendered in
    /// between.
    pub fn advance(&mut self, elapsed_seconds: f32) {
        self.root.children[self.fan_index]
            .local
            .set_rotation_y(Rad(elapsed_seconds));
        self.root.update_world_transforms(&Transform::new());
    }

    pub fn fan(&self) -> &Node {
        &self.root.children[self.fan_index]
    }

    /// Attach a loaded OBJ model (the cat) in its place by the rug.
    ///
    /// Returns the registry slots newly created for the model's textures, so
    /// the caller can spawn their decodes.
    pub fn attach_model(&mut self, model: LoadedModel) -> Vec<(TextureHandle, String)> {
        let mut group = Node::group("cat").with_transform(Transform {
            position: Vector3::new(0.0, 0.0, 2.0),
            rotation: Quaternion::from_angle_x(Rad(FRAC_PI_2))
                * Quaternion::from_angle_y(Rad(PI))
                * Quaternion::from_angle_z(Rad(3.0 * PI / 4.0)),
            scale: Vector3::new(0.06, 0.06, 0.06),
        });

        let mut new_textures = Vec::new();
        for loaded in model.meshes {
            let material = match loaded.diffuse_texture {
                Some(path) => {
                    let handle = self.registry.register(&path, SamplerSettings::default());
                    new_textures.push((handle, path));
                    Arc::new(Material::textured(&loaded.mesh.name, handle))
                }
                None => Arc::new(Material::flat(&loaded.mesh.name, loaded.diffuse_color)),
            };
            let name = loaded.mesh.name.clone();
            group.add_child(Node::mesh(&name, Arc::new(loaded.mesh), material));
        }

        self.root.add_child(group);
        self.root.update_world_transforms(&Transform::new());
        new_textures
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }
}

impl Default for InteriorScene {
    fn default() -> Self {
        Self::new()
    }
}

fn placed(position: [f32; 3], rotation: Quaternion<f32>) -> Transform {
    Transform {
        position: position.into(),
        rotation,
        ..Transform::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scene_registers_six_textures() {
        let scene = InteriorScene::new();
        assert_eq!(scene.registry.len(), 6);
        assert_eq!(scene.registry.pending().len(), 6);
    }

    #[test]
    fn fan_angle_is_a_function_of_elapsed_time() {
        let mut scene = InteriorScene::new();
        scene.advance(1.0);
        scene.advance(0.25);
        scene.advance(2.5);
        let expected = Quaternion::from_angle_y(Rad(2.5f32));
        assert!(scene.fan().local.rotation.dot(expected).abs() > 0.999_99);
    }

    #[test]
    fn advance_updates_world_transforms() {
        let mut scene = InteriorScene::new();
        scene.advance(1.5);
        let shaft = &scene.fan().children[0];
        // The fan hangs at (3, 10, 4); the shaft sits 2 above the pivot
        assert_eq!(shaft.world.position, Vector3::new(3.0, 12.0, 4.0));
    }

    #[test]
    fn node_count_is_stable_across_frames() {
        let mut scene = InteriorScene::new();
        let before = scene.node_count();
        for i in 0..10 {
            scene.advance(i as f32 * 0.016);
        }
        assert_eq!(scene.node_count(), before);
    }

    #[test]
    fn attaching_a_model_only_grows_the_tree() {
        let mut scene = InteriorScene::new();
        let before = scene.node_count();
        let model = LoadedModel {
            name: "cat/cat.obj".to_string(),
            meshes: vec![crate::resources::LoadedMesh {
                mesh: crate::geometry::cuboid(1.0, 1.0, 1.0),
                diffuse_color: [0.5, 0.5, 0.5, 1.0],
                diffuse_texture: None,
            }],
        };
        scene.attach_model(model);
        assert_eq!(scene.node_count(), before + 2);
    }

    #[test]
    fn texture_fulfillment_does_not_change_the_tree() {
        let mut scene = InteriorScene::new();
        let before = scene.node_count();
        let img = image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1));
        scene.registry.fulfill_image(scene.handles.rug, img.clone());
        scene.registry.fulfill_image(scene.handles.floor, img);
        assert_eq!(scene.node_count(), before);
    }
}
