//! Sculpt session: the driver-side context for interactive editing.
//!
//! The host decodes its input system into [`PointerEvent`]s plus
//! [`Modifiers`] and forwards them here together with the currently selected
//! patches. The session turns them into brush ticks and stroke boundaries:
//!
//! 1. `Down` / `Drag` → one brush application per selected patch, then a
//!    geometry commit so the edit is visible immediately
//! 2. `Up` → end of stroke: collision rebuild and, with auto lighting,
//!    shading recalculation
//!
//! Shift negates the brush direction; Ctrl switches from sculpting to
//! smoothing. In [`ToolMode::Move`] pointer input only tracks the cursor;
//! rigid placement is left to the host's own transform tools.

use displacement_config::SculptConfig;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brush::{self, BrushMode, BrushSettings, PreviewVertex};
use crate::patch::DisplacementPatch;
use crate::sew::{self, SewReport};
use crate::sink::{CollisionSink, SurfaceSink};
use crate::types::{DisplacementError, GenerationParams};

/// Active tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    /// Pointer input is left to the host's transform tools
    #[default]
    Move,
    /// Pointer input sculpts the selected patches
    Sculpt,
}

/// Axis the brush pushes along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DirectionAxis {
    X,
    #[default]
    Y,
    Z,
    /// Surface normal at the cursor hit point
    Normal,
}

/// Modifier keys held during a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Negate the brush direction
    pub shift: bool,
    /// Smooth instead of sculpt
    pub ctrl: bool,
}

/// Primary-button pointer input, already resolved to world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    /// Button pressed over the surface
    Down { cursor: Vec3, normal: Vec3 },
    /// Pointer moved with the button held
    Drag { cursor: Vec3, normal: Vec3 },
    /// Pointer moved with the button released
    Hover { cursor: Vec3, normal: Vec3 },
    /// Button released
    Up,
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Nothing changed beyond the tracked cursor
    Idle,
    /// One brush tick was applied to the selection
    Applied {
        mode: BrushMode,
        vertices_affected: usize,
    },
    /// A stroke finished and derived data was rebuilt
    StrokeEnded {
        ticks: usize,
        vertices_affected: usize,
    },
}

/// Bookkeeping for the stroke in progress.
#[derive(Debug, Clone, Copy, Default)]
struct ActiveStroke {
    ticks: usize,
    vertices_affected: usize,
}

/// Brush direction for `axis`, negated while shift is held.
pub fn resolve_direction(axis: DirectionAxis, hit_normal: Vec3, modifiers: Modifiers) -> Vec3 {
    let direction = match axis {
        DirectionAxis::X => Vec3::X,
        DirectionAxis::Y => Vec3::Y,
        DirectionAxis::Z => Vec3::Z,
        DirectionAxis::Normal => hit_normal,
    };
    if modifiers.shift { -direction } else { direction }
}

/// Brush mode selected by the modifier keys.
pub fn resolve_mode(modifiers: Modifiers) -> BrushMode {
    if modifiers.ctrl {
        BrushMode::Smooth
    } else {
        BrushMode::Sculpt
    }
}

/// Driver-owned sculpting state.
#[derive(Debug, Clone)]
pub struct SculptSession {
    pub mode: ToolMode,
    pub axis: DirectionAxis,
    pub brush: BrushSettings,
    /// Parameters for newly created patches
    pub generation: GenerationParams,
    pub sew_tolerance: f32,
    /// Recalculate shading when a stroke ends
    pub auto_lighting: bool,
    cursor: Option<Vec3>,
    hit_normal: Vec3,
    stroke: Option<ActiveStroke>,
}

impl Default for SculptSession {
    fn default() -> Self {
        Self::new(&SculptConfig::default())
    }
}

impl SculptSession {
    pub fn new(config: &SculptConfig) -> Self {
        Self {
            mode: ToolMode::default(),
            axis: DirectionAxis::default(),
            brush: config.brush.into(),
            generation: config.generation.into(),
            sew_tolerance: config.sew.tolerance,
            auto_lighting: config.auto_lighting,
            cursor: None,
            hit_normal: Vec3::Y,
            stroke: None,
        }
    }

    /// Last known cursor position on the surface.
    pub fn cursor(&self) -> Option<Vec3> {
        self.cursor
    }

    pub fn is_stroking(&self) -> bool {
        self.stroke.is_some()
    }

    /// Brush direction for the current axis and hit normal.
    pub fn direction(&self, modifiers: Modifiers) -> Vec3 {
        resolve_direction(self.axis, self.hit_normal, modifiers)
    }

    /// Create a flat patch from the session's generation parameters.
    pub fn new_patch<S: SurfaceSink, C: CollisionSink>(
        &self,
        surface_sink: S,
        collision_sink: C,
    ) -> Result<DisplacementPatch<S, C>, DisplacementError> {
        DisplacementPatch::new(self.generation, surface_sink, collision_sink)
    }

    /// Feed one pointer event.
    ///
    /// `selection` is every patch currently selected in the host; each is
    /// processed independently and in order.
    pub fn on_pointer_event<S: SurfaceSink, C: CollisionSink>(
        &mut self,
        event: PointerEvent,
        modifiers: Modifiers,
        selection: &mut [DisplacementPatch<S, C>],
    ) -> Result<SessionOutcome, DisplacementError> {
        match event {
            PointerEvent::Hover { cursor, normal } => {
                self.track(cursor, normal);
                Ok(SessionOutcome::Idle)
            }
            PointerEvent::Down { cursor, normal } | PointerEvent::Drag { cursor, normal } => {
                self.track(cursor, normal);
                if self.mode != ToolMode::Sculpt {
                    return Ok(SessionOutcome::Idle);
                }
                if self.stroke.is_none() {
                    debug!("stroke begin at {:?} on {} patches", cursor, selection.len());
                }
                self.tick(cursor, modifiers, selection)
            }
            PointerEvent::Up => Ok(self.end_stroke(selection)),
        }
    }

    fn track(&mut self, cursor: Vec3, normal: Vec3) {
        self.cursor = Some(cursor);
        self.hit_normal = normal;
    }

    fn tick<S: SurfaceSink, C: CollisionSink>(
        &mut self,
        cursor: Vec3,
        modifiers: Modifiers,
        selection: &mut [DisplacementPatch<S, C>],
    ) -> Result<SessionOutcome, DisplacementError> {
        let direction = self.direction(modifiers);
        let mode = resolve_mode(modifiers);

        let mut vertices_affected = 0;
        for patch in selection.iter_mut() {
            let report = brush::apply(patch, cursor, direction, &self.brush, mode)?;
            if report.vertices_affected > 0 {
                patch.commit_geometry();
            }
            vertices_affected += report.vertices_affected;
        }

        let stroke = self.stroke.get_or_insert_with(ActiveStroke::default);
        stroke.ticks += 1;
        stroke.vertices_affected += vertices_affected;

        Ok(SessionOutcome::Applied {
            mode,
            vertices_affected,
        })
    }

    fn end_stroke<S: SurfaceSink, C: CollisionSink>(
        &mut self,
        selection: &mut [DisplacementPatch<S, C>],
    ) -> SessionOutcome {
        let Some(stroke) = self.stroke.take() else {
            return SessionOutcome::Idle;
        };

        for patch in selection.iter_mut() {
            patch.sync_collision_surface();
            if self.auto_lighting {
                patch.recalculate_shading();
            }
        }

        debug!(
            "stroke end: {} ticks, {} vertex edits, auto_lighting={}",
            stroke.ticks, stroke.vertices_affected, self.auto_lighting
        );
        SessionOutcome::StrokeEnded {
            ticks: stroke.ticks,
            vertices_affected: stroke.vertices_affected,
        }
    }

    /// Vertices the brush would highlight on `patch` at the tracked cursor.
    pub fn preview<S, C>(&self, patch: &DisplacementPatch<S, C>) -> Vec<PreviewVertex> {
        match (self.mode, self.cursor) {
            (ToolMode::Sculpt, Some(cursor)) => brush::preview(patch, cursor, &self.brush),
            _ => Vec::new(),
        }
    }

    /// Sew the selection with the session tolerance.
    pub fn sew_selected<S: SurfaceSink, C: CollisionSink>(
        &self,
        selection: &mut [DisplacementPatch<S, C>],
    ) -> Result<SewReport, DisplacementError> {
        sew::sew(selection, self.sew_tolerance)
    }

    /// Recalculate shading on every selected patch.
    pub fn recalculate_selected<S: SurfaceSink, C: CollisionSink>(
        &self,
        selection: &mut [DisplacementPatch<S, C>],
    ) {
        for patch in selection.iter_mut() {
            patch.recalculate_shading();
        }
    }

    /// Reset every selected patch to its flat original.
    pub fn reset_selected<S: SurfaceSink, C: CollisionSink>(
        &self,
        selection: &mut [DisplacementPatch<S, C>],
    ) -> Result<(), DisplacementError> {
        for patch in selection.iter_mut() {
            patch.reset_to_original()?;
        }
        Ok(())
    }
}
