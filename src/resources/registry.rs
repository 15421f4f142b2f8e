//! Texture slot registry.
//!
//! Materials never hold image data directly; they hold a [`TextureHandle`]
//! into this registry. Slots start out pending and render with the shared
//! placeholder texture. When a decode task completes, [`fulfill_image`]
//! (CPU-only, unit-testable) stores the decoded image and bumps the slot's
//! generation; the renderer notices the stale generation on the next frame
//! and re-uploads via [`ensure_uploaded`].
//!
//! [`fulfill_image`]: TextureRegistry::fulfill_image
//! [`ensure_uploaded`]: TextureRegistry::ensure_uploaded

use log::warn;

use crate::data_structures::material::TextureHandle;
use crate::data_structures::texture::{SamplerSettings, Texture};

enum SlotState {
    Pending,
    Loaded(image::DynamicImage),
}

struct TextureSlot {
    path: String,
    settings: SamplerSettings,
    state: SlotState,
    /// Bumped on every fulfill. The renderer compares this against the
    /// generation it last uploaded to know when a bind group is stale.
    generation: u64,
    gpu: Option<Texture>,
    uploaded_generation: u64,
}

#[derive(Default)]
pub struct TextureRegistry {
    slots: Vec<TextureSlot>,
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for the image at `path`. The slot renders as the
    /// placeholder until the decode lands.
    pub fn register(&mut self, path: &str, settings: SamplerSettings) -> TextureHandle {
        self.slots.push(TextureSlot {
            path: path.to_string(),
            settings,
            state: SlotState::Pending,
            generation: 0,
            gpu: None,
            uploaded_generation: 0,
        });
        self.slots.len() - 1
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn path(&self, handle: TextureHandle) -> Option<&str> {
        self.slots.get(handle).map(|slot| slot.path.as_str())
    }

    pub fn is_loaded(&self, handle: TextureHandle) -> bool {
        matches!(
            self.slots.get(handle).map(|slot| &slot.state),
            Some(SlotState::Loaded(_))
        )
    }

    pub fn generation(&self, handle: TextureHandle) -> u64 {
        self.slots.get(handle).map(|slot| slot.generation).unwrap_or(0)
    }

    /// Handles and paths of every slot still waiting for its image, in
    /// registration order.
    pub fn pending(&self) -> Vec<(TextureHandle, String)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot.state, SlotState::Pending))
            .map(|(handle, slot)| (handle, slot.path.clone()))
            .collect()
    }

    /// Store a decoded image in its slot. Returns false (and logs) for an
    /// unknown handle; a second fulfill replaces the image and bumps the
    /// generation again.
    pub fn fulfill_image(&mut self, handle: TextureHandle, img: image::DynamicImage) -> bool {
        let Some(slot) = self.slots.get_mut(handle) else {
            warn!("ignoring texture for unknown slot {handle}");
            return false;
        };
        slot.state = SlotState::Loaded(img);
        slot.generation += 1;
        true
    }

    /// Upload the slot's image if a newer generation than the uploaded one is
    /// available; return the GPU texture, or None while still pending.
    pub fn ensure_uploaded(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: TextureHandle,
    ) -> Option<&Texture> {
        let slot = self.slots.get_mut(handle)?;
        let SlotState::Loaded(img) = &slot.state else {
            return None;
        };
        if slot.gpu.is_none() || slot.uploaded_generation < slot.generation {
            match Texture::from_image(device, queue, img, Some(&slot.path), slot.settings) {
                Ok(texture) => {
                    slot.gpu = Some(texture);
                    slot.uploaded_generation = slot.generation;
                }
                Err(e) => {
                    warn!("failed to upload texture {}: {e}", slot.path);
                    return None;
                }
            }
        }
        slot.gpu.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_pixel() -> image::DynamicImage {
        image::DynamicImage::ImageRgba8(image::RgbaImage::new(1, 1))
    }

    #[test]
    fn registered_slot_starts_pending() {
        let mut registry = TextureRegistry::new();
        let floor = registry.register("wood.jpeg", SamplerSettings::default());
        assert!(!registry.is_loaded(floor));
        assert_eq!(registry.generation(floor), 0);
        assert_eq!(registry.pending(), vec![(floor, "wood.jpeg".to_string())]);
    }

    #[test]
    fn fulfill_marks_loaded_and_bumps_generation() {
        let mut registry = TextureRegistry::new();
        let handle = registry.register("marble.png", SamplerSettings::default());
        assert!(registry.fulfill_image(handle, one_pixel()));
        assert!(registry.is_loaded(handle));
        assert_eq!(registry.generation(handle), 1);
        assert!(registry.pending().is_empty());
    }

    #[test]
    fn fulfill_order_does_not_matter() {
        let mut registry = TextureRegistry::new();
        let first = registry.register("wood.jpeg", SamplerSettings::default());
        let second = registry.register("rug.jpeg", SamplerSettings::default());

        registry.fulfill_image(second, one_pixel());
        assert!(!registry.is_loaded(first));
        assert!(registry.is_loaded(second));

        registry.fulfill_image(first, one_pixel());
        assert!(registry.is_loaded(first));
    }

    #[test]
    fn unknown_handle_is_rejected() {
        let mut registry = TextureRegistry::new();
        assert!(!registry.fulfill_image(7, one_pixel()));
    }

    #[test]
    fn refulfill_bumps_generation_again() {
        let mut registry = TextureRegistry::new();
        let handle = registry.register("sunset.jpg", SamplerSettings::default());
        registry.fulfill_image(handle, one_pixel());
        registry.fulfill_image(handle, one_pixel());
        assert_eq!(registry.generation(handle), 2);
    }
}
