//! Core displacement types shared by the generator, patch, brush and stitcher.

use displacement_config::{MAX_SUBDIVISION, MIN_SUBDIVISION};
use serde::{Deserialize, Serialize};

/// Errors produced by displacement operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DisplacementError {
    #[error("Invalid parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: i64 },
    #[error(
        "Subdivision {value} out of range [{}, {}]",
        MIN_SUBDIVISION,
        MAX_SUBDIVISION
    )]
    SubdivisionOutOfRange { value: u32 },
    #[error("Vertex index {index} out of range for buffer of {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Parameters a patch was generated from, retained for reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Width in cells before subdivision
    pub width: i32,
    /// Depth in cells before subdivision
    pub depth: i32,
    /// Subdivisions per cell
    pub subdivision: u32,
}

impl GenerationParams {
    pub fn new(width: i32, depth: i32, subdivision: u32) -> Self {
        Self {
            width,
            depth,
            subdivision,
        }
    }

    /// Check the parameters without producing anything.
    pub fn validate(&self) -> Result<(), DisplacementError> {
        if self.width <= 0 {
            return Err(DisplacementError::InvalidParameter {
                name: "width",
                value: self.width as i64,
            });
        }
        if self.depth <= 0 {
            return Err(DisplacementError::InvalidParameter {
                name: "depth",
                value: self.depth as i64,
            });
        }
        if !(MIN_SUBDIVISION..=MAX_SUBDIVISION).contains(&self.subdivision) {
            return Err(DisplacementError::SubdivisionOutOfRange {
                value: self.subdivision,
            });
        }
        self.resolution().map(|_| ())
    }

    /// Grid resolution in cells along X and Z.
    ///
    /// Fails when the resolution or the vertex count does not fit `u32`
    /// triangle indices. Sizes and subdivision must already be in range.
    pub(crate) fn resolution(&self) -> Result<(u32, u32), DisplacementError> {
        let gw = cells(self.width, self.subdivision).ok_or(DisplacementError::InvalidParameter {
            name: "width",
            value: self.width as i64,
        })?;
        let gd = cells(self.depth, self.subdivision).ok_or(DisplacementError::InvalidParameter {
            name: "depth",
            value: self.depth as i64,
        })?;
        (gw + 1)
            .checked_mul(gd + 1)
            .ok_or(DisplacementError::InvalidParameter {
                name: "width * depth",
                value: self.width as i64 * self.depth as i64,
            })?;
        Ok((gw, gd))
    }
}

/// Cells along one axis, leaving room for the extra vertex row.
fn cells(extent: i32, subdivision: u32) -> Option<u32> {
    let cells = u32::try_from(extent).ok()?.checked_mul(subdivision)?;
    cells.checked_add(1).map(|_| cells)
}

impl From<displacement_config::GenerationDefaults> for GenerationParams {
    fn from(defaults: displacement_config::GenerationDefaults) -> Self {
        Self::new(defaults.width, defaults.depth, defaults.subdivision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_positive() {
        assert!(GenerationParams::new(2, 3, 1).validate().is_ok());
        assert!(GenerationParams::new(1, 1, 4).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        assert_eq!(
            GenerationParams::new(0, 3, 1).validate(),
            Err(DisplacementError::InvalidParameter {
                name: "width",
                value: 0
            })
        );
        assert_eq!(
            GenerationParams::new(3, -2, 1).validate(),
            Err(DisplacementError::InvalidParameter {
                name: "depth",
                value: -2
            })
        );
    }

    #[test]
    fn test_validate_rejects_subdivision() {
        assert_eq!(
            GenerationParams::new(2, 2, 0).validate(),
            Err(DisplacementError::SubdivisionOutOfRange { value: 0 })
        );
        assert_eq!(
            GenerationParams::new(2, 2, 5).validate(),
            Err(DisplacementError::SubdivisionOutOfRange { value: 5 })
        );
    }

    #[test]
    fn test_validate_rejects_oversized_grid() {
        assert_eq!(
            GenerationParams::new(i32::MAX, 1, 4).validate(),
            Err(DisplacementError::InvalidParameter {
                name: "width",
                value: i32::MAX as i64
            })
        );
        assert_eq!(
            GenerationParams::new(1, i32::MAX, 4).validate(),
            Err(DisplacementError::InvalidParameter {
                name: "depth",
                value: i32::MAX as i64
            })
        );
        // Each axis fits, the vertex count does not.
        assert_eq!(
            GenerationParams::new(100_000, 100_000, 1).validate(),
            Err(DisplacementError::InvalidParameter {
                name: "width * depth",
                value: 10_000_000_000
            })
        );
        assert_eq!(
            GenerationParams::new(65_534, 65_534, 1).resolution(),
            Ok((65_534, 65_534))
        );
    }
}
