// crates/blockdrag-core/src/runtime/drag.rs
// ============================================================================
// Module: Drag-and-Drop Driver
// Description: Pointer gestures that reorder block rows in the admin UI.
// Purpose: Pick a random target, compute the drop point, and mirror the move.
// Dependencies: crate::{core, interfaces, runtime::tracker}, rand, tracing
// ============================================================================

//! ## Overview
//! Drop-target rows are split into an upper and a lower insertion zone.
//! Moving a row down releases the pointer just below the target row's top
//! edge (insert after); moving it up releases just above that edge (insert
//! before). Each gesture is hover, press, a multi-step move so the UI's drag
//! threshold engages, and release. The tracker is updated right after the
//! release, without waiting for the UI to persist the new order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::core::AdminUi;
use crate::core::Selector;
use crate::interfaces::BoundingBox;
use crate::interfaces::BrowserError;
use crate::interfaces::BrowserSession;
use crate::interfaces::Point;
use crate::runtime::error::HarnessError;
use crate::runtime::tracker::ExpectedOrder;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default vertical distance from the target row's top edge to the drop point.
pub const DEFAULT_DROP_OFFSET_PX: f64 = 20.0;
/// Default number of intermediate pointer moves per gesture.
pub const DEFAULT_MOVE_STEPS: u32 = 2;

// ============================================================================
// SECTION: Policy
// ============================================================================

/// Which row is dragged and where it may land.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DragPolicy {
    /// Position of the dragged row.
    pub source: usize,
    /// Positions a drag may target, picked uniformly.
    pub candidates: Vec<usize>,
}

impl Default for DragPolicy {
    fn default() -> Self {
        Self {
            source: 1,
            candidates: vec![0, 2],
        }
    }
}

impl DragPolicy {
    /// Picks a target uniformly from the candidates.
    pub fn choose_target<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        self.candidates.choose(rng).copied()
    }

    /// Returns the highest position the policy touches.
    #[must_use]
    pub fn max_position(&self) -> usize {
        self.candidates.iter().copied().fold(self.source, usize::max)
    }
}

/// Gesture tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragSettings {
    /// Distance from the target row's top edge to the release point.
    pub drop_offset_px: f64,
    /// Intermediate pointer moves between press and release.
    pub move_steps: u32,
}

impl Default for DragSettings {
    fn default() -> Self {
        Self {
            drop_offset_px: DEFAULT_DROP_OFFSET_PX,
            move_steps: DEFAULT_MOVE_STEPS,
        }
    }
}

// ============================================================================
// SECTION: Geometry
// ============================================================================

/// Where the dragged row is released relative to the target row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPlacement {
    /// Upper insertion zone: the row lands before the target.
    Before,
    /// Lower insertion zone: the row lands after the target.
    After,
    /// Released on itself; nothing moves.
    OnSelf,
}

impl DropPlacement {
    /// Classifies a move from `source` to `target`.
    #[must_use]
    pub const fn between(source: usize, target: usize) -> Self {
        if source < target {
            Self::After
        } else if source > target {
            Self::Before
        } else {
            Self::OnSelf
        }
    }
}

/// Horizontal position of the drag handle within a row.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragGeometry {
    /// Handle center minus the row's left edge.
    pub handle_offset_x: f64,
}

impl DragGeometry {
    /// Derives the handle offset from a row box and its handle box.
    #[must_use]
    pub fn from_boxes(row: &BoundingBox, handle: &BoundingBox) -> Self {
        Self {
            handle_offset_x: handle.center().x - row.x,
        }
    }
}

/// Computes the release point for a drop onto `target_box`.
///
/// [`DropPlacement::OnSelf`] releases on the target's top edge; callers
/// dropping a row onto itself use the handle center instead.
#[must_use]
pub fn drop_point(
    target_box: &BoundingBox,
    placement: DropPlacement,
    geometry: DragGeometry,
    offset_px: f64,
) -> Point {
    let x = target_box.x + geometry.handle_offset_x;
    let y = match placement {
        DropPlacement::After => target_box.y + offset_px,
        DropPlacement::Before => target_box.y - offset_px,
        DropPlacement::OnSelf => target_box.y,
    };
    Point::new(x, y)
}

// ============================================================================
// SECTION: Driver
// ============================================================================

/// Result of one drag gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DragOutcome {
    /// Position the row was dragged from.
    pub source: usize,
    /// Position the row was dropped at.
    pub target: usize,
    /// Insertion zone used.
    pub placement: DropPlacement,
    /// Pointer release point.
    pub release: Point,
}

/// Issues reorder gestures and mirrors them into the tracker.
#[derive(Debug, Clone)]
pub struct DragDriver {
    /// Admin UI selectors.
    ui: AdminUi,
    /// Source and candidate targets.
    policy: DragPolicy,
    /// Gesture tuning.
    settings: DragSettings,
    /// Handle offset captured from the first row.
    geometry: DragGeometry,
}

impl DragDriver {
    /// Captures drag geometry from the first row and its drag handle.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Geometry`] when either element is not rendered.
    pub async fn capture<B>(
        session: &B,
        ui: AdminUi,
        policy: DragPolicy,
        settings: DragSettings,
    ) -> Result<Self, HarnessError>
    where
        B: BrowserSession + ?Sized,
    {
        let row = require_box(session, &ui.row(0), "capturing drag geometry").await?;
        let handle =
            require_box(session, &ui.first_drag_handle(), "capturing drag geometry").await?;
        let geometry = DragGeometry::from_boxes(&row, &handle);
        debug!(handle_offset_x = geometry.handle_offset_x, "captured drag geometry");
        Ok(Self {
            ui,
            policy,
            settings,
            geometry,
        })
    }

    /// Returns the captured geometry.
    #[must_use]
    pub const fn geometry(&self) -> DragGeometry {
        self.geometry
    }

    /// Drags the policy's source row onto a randomly chosen candidate.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError`] when the gesture or tracker update fails.
    pub async fn drag_random<B, R, T>(
        &self,
        session: &B,
        tracker: &mut ExpectedOrder<T>,
        rng: &mut R,
    ) -> Result<DragOutcome, HarnessError>
    where
        B: BrowserSession + ?Sized,
        R: Rng + ?Sized,
        T: Send,
    {
        let target = self
            .policy
            .choose_target(rng)
            .ok_or_else(|| HarnessError::Fixture("drag policy has no candidates".to_string()))?;
        self.drag(session, tracker, self.policy.source, target).await
    }

    /// Drags the row at `source` onto `target`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Geometry`] when the target row is not rendered
    /// or lies outside the viewport, and [`HarnessError::Browser`] when a
    /// pointer action fails.
    pub async fn drag<B, T>(
        &self,
        session: &B,
        tracker: &mut ExpectedOrder<T>,
        source: usize,
        target: usize,
    ) -> Result<DragOutcome, HarnessError>
    where
        B: BrowserSession + ?Sized,
        T: Send,
    {
        let placement = DropPlacement::between(source, target);
        let handle = self.ui.drag_handle(source);
        let release = if placement == DropPlacement::OnSelf {
            require_box(session, &handle, "dropping a row onto itself").await?.center()
        } else {
            let context = format!("resolving drop target {target}");
            let target_box = require_box(session, &self.ui.row(target), &context).await?;
            drop_point(&target_box, placement, self.geometry, self.settings.drop_offset_px)
        };

        session.hover(&handle).await?;
        session.pointer_down().await?;
        session.pointer_move(release, self.settings.move_steps).await.map_err(|err| match err {
            BrowserError::OutOfBounds(detail) => HarnessError::Geometry {
                selector: self.ui.row(target),
                context: format!(
                    "release point ({}, {}) is off screen: {detail}",
                    release.x, release.y
                ),
            },
            other => HarnessError::Browser(other),
        })?;
        session.pointer_up().await?;

        tracker.reorder(source, target)?;
        debug!(source, target, ?placement, x = release.x, y = release.y, "dragged block");
        Ok(DragOutcome {
            source,
            target,
            placement,
            release,
        })
    }
}

/// Resolves a bounding box or fails with a geometry fault.
async fn require_box<B>(
    session: &B,
    selector: &Selector,
    context: &str,
) -> Result<BoundingBox, HarnessError>
where
    B: BrowserSession + ?Sized,
{
    session.bounding_box(selector).await?.ok_or_else(|| HarnessError::Geometry {
        selector: selector.clone(),
        context: format!("not rendered while {context}"),
    })
}
