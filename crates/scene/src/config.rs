use serde::{Deserialize, Serialize};
use sprig_render::PoolCapacity;
use std::path::Path;

/// Errors from loading a scene configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scene and renderer settings. Every field has a default, so a partial file is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Seed for cube placement, colors and grass scattering.
    pub seed: u64,
    pub cube_count: u32,
    /// When set, spinning cubes expire after this many milliseconds of game time.
    pub cube_lifetime_ms: Option<f32>,
    pub pool: PoolConfig,
    pub grass: GrassConfig,
    pub water: WaterConfig,
    pub render: RenderConfig,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            cube_count: 10,
            cube_lifetime_ms: None,
            pool: PoolConfig::default(),
            grass: GrassConfig::default(),
            water: WaterConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

impl SceneConfig {
    /// Load from a YAML file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_yaml(&text)?;
        tracing::info!(path = %path.as_ref().display(), "loaded scene config");
        Ok(config)
    }

    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that parse but cannot lay out a scene.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.grass.has_valid_tile_size() {
            return Err(ConfigError::Invalid(format!(
                "grass.tile_size must be positive and finite, got {}",
                self.grass.tile_size
            )));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Limits of the main pool (ground, player and cubes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    pub max_meshes: u32,
    pub max_tris: u32,
    pub max_verts: u32,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_meshes: 100,
            max_tris: 300,
            max_verts: 900,
        }
    }
}

impl PoolConfig {
    pub fn capacity(&self) -> PoolCapacity {
        PoolCapacity::new(self.max_meshes, self.max_tris, self.max_verts)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrassConfig {
    /// Tiles along each side of the square grid that follows the player.
    pub tiles_per_side: u32,
    pub tile_size: f32,
    pub blades_per_tile: u32,
    pub blade_width: f32,
    pub blade_height: f32,
    /// World height of the blade roots.
    pub height: f32,
}

impl Default for GrassConfig {
    fn default() -> Self {
        Self {
            tiles_per_side: 4,
            tile_size: 16.0,
            blades_per_tile: 400,
            blade_width: 0.2,
            blade_height: 1.2,
            height: -3.0,
        }
    }
}

impl GrassConfig {
    pub fn has_valid_tile_size(&self) -> bool {
        self.tile_size.is_finite() && self.tile_size > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaterConfig {
    pub cells: u32,
    pub spacing: f32,
    pub height: f32,
}

impl Default for WaterConfig {
    fn default() -> Self {
        Self {
            cells: 64,
            spacing: 1.0,
            height: -12.0,
        }
    }
}

/// GPU target sizes. Read by the wgpu backend.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub shadow_map_size: u32,
    pub procedural_size: u32,
    pub msaa_samples: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shadow_map_size: 4096,
            procedural_size: 2048,
            msaa_samples: 4,
        }
    }
}
