use std::path::Path;

use anyhow::Context;
use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::control::DEFAULT_SCALAR;
use crate::scene_graph::EntityBlueprint;
use crate::session::TrackingConfiguration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    pub default_scalar: f32,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            default_scalar: DEFAULT_SCALAR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StaircaseConfig {
    pub enabled: bool,
    pub link_offset: Vec3,
    pub link_angle_degrees: f32,
}

impl Default for StaircaseConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            link_offset: Vec3::new(0.1, 0.1, 0.0),
            link_angle_degrees: 45.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StageConfig {
    pub control: ControlConfig,
    pub session: TrackingConfiguration,
    pub primary: EntityBlueprint,
    pub staircase_root: EntityBlueprint,
    pub staircase: StaircaseConfig,
    /// Primary entity scale per unit of scalar input.
    pub scale_factor: f32,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            control: ControlConfig::default(),
            session: TrackingConfiguration::default(),
            primary: EntityBlueprint::sphere("sphere", 0.1, "checker.png")
                .at(Vec3::new(-0.2, 0.1, 0.0)),
            staircase_root: EntityBlueprint::cuboid("box", 0.2, 0.2, 0.2, "checker.png")
                .at(Vec3::new(0.2, 0.1, 0.0)),
            staircase: StaircaseConfig::default(),
            scale_factor: 2.0,
        }
    }
}

impl StageConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;

        Self::from_toml(&contents).with_context(|| format!("Invalid config {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        let config: StageConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> anyhow::Result<()> {
        let scalar = self.control.default_scalar;
        if !(0.0..=1.0).contains(&scalar) {
            anyhow::bail!("control.default_scalar must be within [0, 1], got {}", scalar);
        }

        if !self.scale_factor.is_finite() || self.scale_factor < 0.0 {
            anyhow::bail!("scale_factor must be a non-negative number, got {}", self.scale_factor);
        }

        if !self.staircase.link_offset.is_finite() || !self.staircase.link_angle_degrees.is_finite() {
            anyhow::bail!("staircase link offset and angle must be finite");
        }

        Ok(())
    }
}
