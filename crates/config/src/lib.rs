//! Shared configuration for displacement sculpting
//!
//! This crate is the single source of truth for the defaults and limits used
//! when generating displacement patches, sculpting them with brushes and
//! sewing neighbouring patches together.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Smallest accepted subdivision factor
pub const MIN_SUBDIVISION: u32 = 1;

/// Largest accepted subdivision factor
pub const MAX_SUBDIVISION: u32 = 4;

/// Default world-space distance under which two vertices are sewn
pub const DEFAULT_SEW_TOLERANCE: f32 = 0.9;

/// Default brush radius in world units
pub const DEFAULT_BRUSH_SIZE: f32 = 3.0;

/// Default brush strength per application
pub const DEFAULT_BRUSH_STRENGTH: f32 = 0.1;

/// Default falloff exponent (1.0 = linear decay to zero at the rim)
pub const DEFAULT_BRUSH_FALLOFF: f32 = 1.0;

/// Brush defaults handed to a new sculpt session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushDefaults {
    /// Brush radius in world units
    pub size: f32,
    /// Signed displacement applied at full falloff
    pub strength: f32,
    /// Falloff exponent (0 = uniform, 1 = linear to the rim)
    pub falloff: f32,
}

impl Default for BrushDefaults {
    fn default() -> Self {
        Self {
            size: DEFAULT_BRUSH_SIZE,
            strength: DEFAULT_BRUSH_STRENGTH,
            falloff: DEFAULT_BRUSH_FALLOFF,
        }
    }
}

/// Parameters used when creating a new patch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationDefaults {
    /// Patch width in cells before subdivision
    pub width: i32,
    /// Patch depth in cells before subdivision
    pub depth: i32,
    /// Subdivisions per cell, within [MIN_SUBDIVISION, MAX_SUBDIVISION]
    pub subdivision: u32,
}

impl Default for GenerationDefaults {
    fn default() -> Self {
        Self {
            width: 10,
            depth: 10,
            subdivision: MIN_SUBDIVISION,
        }
    }
}

/// Sewing configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SewDefaults {
    /// Vertices closer than this (world units) are sewn together
    pub tolerance: f32,
}

impl Default for SewDefaults {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_SEW_TOLERANCE,
        }
    }
}

/// Top-level sculpting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct SculptConfig {
    pub brush: BrushDefaults,
    pub generation: GenerationDefaults,
    pub sew: SewDefaults,
    /// Recalculate normals and tangents when a stroke ends
    pub auto_lighting: bool,
}

impl Default for SculptConfig {
    fn default() -> Self {
        Self {
            brush: BrushDefaults::default(),
            generation: GenerationDefaults::default(),
            sew: SewDefaults::default(),
            auto_lighting: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_brush() {
        let brush = BrushDefaults::default();
        assert_eq!(brush.size, DEFAULT_BRUSH_SIZE);
        assert_eq!(brush.strength, DEFAULT_BRUSH_STRENGTH);
        assert_eq!(brush.falloff, DEFAULT_BRUSH_FALLOFF);
    }

    #[test]
    fn test_default_enables_auto_lighting() {
        let config = SculptConfig::default();
        assert!(config.auto_lighting);
        assert_eq!(config.sew.tolerance, DEFAULT_SEW_TOLERANCE);
        assert_eq!(config.generation.subdivision, 1);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "brush": { "size": 5.0 }, "sew": {} }"#;
        let config: SculptConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.brush.size, 5.0);
        assert_eq!(config.brush.strength, DEFAULT_BRUSH_STRENGTH);
        assert_eq!(config.generation, GenerationDefaults::default());
        assert!(config.auto_lighting);
    }
}
