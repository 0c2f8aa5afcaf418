//! Height layers and the table that packs them for the GPU.

use bytemuck::Zeroable;
use glam::Vec3;
use tessera_config::{LayerConfig, MaterialsConfig};
use thiserror::Error;

use crate::params::{MAX_LAYERS, TerrainMaterialParams};

// ---------------------------------------------------------------------------
// MaterialError
// ---------------------------------------------------------------------------

/// Errors returned during layer validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterialError {
    /// Layer names must not be empty.
    #[error("layer {0} has an empty name")]
    EmptyName(usize),

    /// The parameter block has a fixed number of slots.
    #[error("{count} layers exceed the maximum of {max}")]
    TooManyLayers { count: usize, max: usize },
}

// ---------------------------------------------------------------------------
// TerrainLayer
// ---------------------------------------------------------------------------

/// One height band of the terrain material.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainLayer {
    /// Human-readable name, also used to find the layer's texture.
    pub name: String,
    /// Linear RGB tint. Each component is clamped to `[0.0, 1.0]`.
    pub tint: [f32; 3],
    /// How much the tint replaces the texture. Clamped to `[0.0, 1.0]`.
    pub tint_strength: f32,
    /// Normalised height where the layer begins. Clamped to `[0.0, 1.0]`.
    pub start_height: f32,
    /// Width of the blend with the layer below. Clamped to `[0.0, 1.0]`.
    pub blend_strength: f32,
    /// Texture tiling scale. Must be > 0.0.
    pub texture_scale: f32,
}

impl TerrainLayer {
    /// Validates and clamps all fields to their legal ranges.
    pub fn validated(mut self, index: usize) -> Result<Self, MaterialError> {
        if self.name.is_empty() {
            return Err(MaterialError::EmptyName(index));
        }
        for c in &mut self.tint {
            *c = c.clamp(0.0, 1.0);
        }
        self.tint_strength = self.tint_strength.clamp(0.0, 1.0);
        self.start_height = self.start_height.clamp(0.0, 1.0);
        self.blend_strength = self.blend_strength.clamp(0.0, 1.0);
        if !(self.texture_scale > 0.0) {
            tracing::warn!(
                "layer '{}' has texture scale {}, using 1.0",
                self.name,
                self.texture_scale
            );
            self.texture_scale = 1.0;
        }
        Ok(self)
    }

    /// Colour of this layer given its sampled texture colour.
    pub fn base_color(&self, texture: Vec3) -> Vec3 {
        Vec3::from(self.tint) * self.tint_strength + texture * (1.0 - self.tint_strength)
    }
}

impl From<&LayerConfig> for TerrainLayer {
    fn from(config: &LayerConfig) -> Self {
        Self {
            name: config.name.clone(),
            tint: config.tint,
            tint_strength: config.tint_strength,
            start_height: config.start_height,
            blend_strength: config.blend_strength,
            texture_scale: config.texture_scale,
        }
    }
}

// ---------------------------------------------------------------------------
// LayerTable
// ---------------------------------------------------------------------------

/// Validated layers plus the world height range they are blended across.
#[derive(Clone, Debug, PartialEq)]
pub struct LayerTable {
    layers: Vec<TerrainLayer>,
    min_height: f32,
    max_height: f32,
}

impl LayerTable {
    pub fn new(layers: Vec<TerrainLayer>) -> Result<Self, MaterialError> {
        if layers.len() > MAX_LAYERS {
            return Err(MaterialError::TooManyLayers {
                count: layers.len(),
                max: MAX_LAYERS,
            });
        }
        let layers = layers
            .into_iter()
            .enumerate()
            .map(|(i, layer)| layer.validated(i))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            layers,
            min_height: 0.0,
            max_height: 1.0,
        })
    }

    pub fn from_config(config: &MaterialsConfig) -> Result<Self, MaterialError> {
        Self::new(config.layers.iter().map(TerrainLayer::from).collect())
    }

    pub fn layers(&self) -> &[TerrainLayer] {
        &self.layers
    }

    /// World height range the blend is normalised against.
    pub fn height_range(&self) -> (f32, f32) {
        (self.min_height, self.max_height)
    }

    /// Record the terrain's world height range.
    pub fn update_mesh_heights(&mut self, min_height: f32, max_height: f32) {
        self.min_height = min_height;
        self.max_height = max_height;
    }

    /// Pack the table into its uniform block.
    pub fn gpu_params(&self) -> TerrainMaterialParams {
        let mut params = TerrainMaterialParams::zeroed();
        params.layer_count = self.layers.len() as u32;
        params.min_height = self.min_height;
        params.max_height = self.max_height;
        for (i, layer) in self.layers.iter().enumerate() {
            let [r, g, b] = layer.tint;
            params.tints[i] = [r, g, b, layer.tint_strength];
            params.bands[i] = [
                layer.start_height,
                layer.blend_strength,
                layer.texture_scale,
                0.0,
            ];
        }
        params
    }

    /// Surface colour at world `height`, mirroring the terrain shader.
    ///
    /// `texture` supplies each layer's sampled texture colour. Layers are
    /// composited bottom-up; each fades in over `blend_strength` around its
    /// start height.
    pub fn surface_color(&self, height: f32, texture: impl Fn(&TerrainLayer) -> Vec3) -> Vec3 {
        const EPSILON: f32 = 1e-4;
        let height_percent = inverse_lerp(self.min_height, self.max_height, height);
        let mut color = Vec3::ZERO;
        for layer in &self.layers {
            let half_blend = layer.blend_strength / 2.0;
            let draw_strength = inverse_lerp(
                -half_blend - EPSILON,
                half_blend,
                height_percent - layer.start_height,
            );
            color = color.lerp(layer.base_color(texture(layer)), draw_strength);
        }
        color
    }
}

fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if b == a {
        return if value >= b { 1.0 } else { 0.0 };
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
