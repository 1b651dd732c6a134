//! Translucent variants of piece materials for blueprint previews.

use std::collections::HashMap;

use bevy::prelude::*;

/// Alpha forced onto every ghost material.
pub const GHOST_ALPHA: f32 = 0.5;

/// Copy of `base` that keeps its textures and normal map but is
/// alpha-blended at `GHOST_ALPHA`.
pub fn translucent_variant(base: &StandardMaterial) -> StandardMaterial {
    StandardMaterial {
        base_color: base.base_color.with_alpha(GHOST_ALPHA),
        base_color_texture: base.base_color_texture.clone(),
        normal_map_texture: base.normal_map_texture.clone(),
        perceptual_roughness: base.perceptual_roughness,
        metallic: base.metallic,
        alpha_mode: AlphaMode::Blend,
        ..default()
    }
}

/// One translucent material per source material, created on first use.
#[derive(Resource, Default)]
pub struct GhostMaterialCache {
    variants: HashMap<AssetId<StandardMaterial>, Handle<StandardMaterial>>,
}

impl GhostMaterialCache {
    pub fn variant_of(
        &mut self,
        source: &Handle<StandardMaterial>,
        materials: &mut Assets<StandardMaterial>,
    ) -> Handle<StandardMaterial> {
        if let Some(handle) = self.variants.get(&source.id()) {
            return handle.clone();
        }
        let variant = match materials.get(source) {
            Some(base) => translucent_variant(base),
            None => translucent_variant(&StandardMaterial::default()),
        };
        let handle = materials.add(variant);
        self.variants.insert(source.id(), handle.clone());
        handle
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}
