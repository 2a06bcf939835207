//! Per-card gesture tracking and swipe-commit animation.

use std::sync::Arc;

use parking_lot::Mutex;
use shared::domain::{Card, CardId, SwipeDirection};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    animator::{AnimationError, Animator, MotionTarget, Transition},
    config::DeckConfig,
};

pub const COMMIT_THRESHOLD: f64 = 100.0;
pub const PREVIEW_THRESHOLD: f64 = 50.0;
pub const DRAG_ROTATION_FACTOR: f64 = 0.1;

/// Called exactly once per committed card, after its exit animation finished.
pub type RemovalHandler = Arc<dyn Fn(&Card, SwipeDirection) + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Offset {
    pub dx: f64,
    pub dy: f64,
}

impl Offset {
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

/// Visual state of a card while it is being dragged.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DragFrame {
    pub offset: Offset,
    pub rotation: f64,
    pub preview: Option<SwipeDirection>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    Idle,
    Dragging,
    Committing(SwipeDirection),
    Returning,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Release {
    Commit(SwipeDirection),
    ReturnToCenter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    Committed(SwipeDirection),
    Returned,
    /// The card was not in a phase that accepts this input.
    Ignored,
}

#[derive(Debug, Error)]
pub enum MotionError {
    #[error("exit animation for card {card_id} ({direction}) failed: {source}")]
    Exit {
        card_id: CardId,
        direction: SwipeDirection,
        #[source]
        source: AnimationError,
    },
    #[error("return animation for card {card_id} failed: {source}")]
    Settle {
        card_id: CardId,
        #[source]
        source: AnimationError,
    },
}

// Vertical wins over horizontal so diagonal gestures resolve the same way
// every time.
fn classify(dx: f64, dy: f64, threshold: f64) -> Option<SwipeDirection> {
    if dy < -threshold {
        Some(SwipeDirection::Superlike)
    } else if dx > threshold {
        Some(SwipeDirection::Like)
    } else if dx < -threshold {
        Some(SwipeDirection::Nope)
    } else {
        None
    }
}

/// Decides what a drag ending at `(dx, dy)` does.
pub fn resolve_release(dx: f64, dy: f64) -> Release {
    match classify(dx, dy, COMMIT_THRESHOLD) {
        Some(direction) => Release::Commit(direction),
        None => Release::ReturnToCenter,
    }
}

/// Badge shown while dragging. Purely cosmetic.
pub fn preview_direction(dx: f64, dy: f64) -> Option<SwipeDirection> {
    classify(dx, dy, PREVIEW_THRESHOLD)
}

struct MotionInner {
    phase: MotionPhase,
    frame: DragFrame,
}

/// Owns one card's drag → commit/return → removal lifecycle.
pub struct CardMotionController {
    card: Card,
    animator: Arc<dyn Animator>,
    on_removed: RemovalHandler,
    exit: Transition,
    settle: Transition,
    inner: Mutex<MotionInner>,
}

impl CardMotionController {
    pub fn new(card: Card, animator: Arc<dyn Animator>, on_removed: RemovalHandler) -> Self {
        Self::with_config(card, animator, on_removed, &DeckConfig::default())
    }

    pub fn with_config(
        card: Card,
        animator: Arc<dyn Animator>,
        on_removed: RemovalHandler,
        config: &DeckConfig,
    ) -> Self {
        Self {
            card,
            animator,
            on_removed,
            exit: config.exit,
            settle: config.settle,
            inner: Mutex::new(MotionInner {
                phase: MotionPhase::Idle,
                frame: DragFrame::default(),
            }),
        }
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn phase(&self) -> MotionPhase {
        self.inner.lock().phase
    }

    pub fn frame(&self) -> DragFrame {
        self.inner.lock().frame
    }

    pub fn drag_start(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.phase != MotionPhase::Idle {
            debug!(card_id = %self.card.id, phase = ?inner.phase, "drag refused");
            return false;
        }
        inner.phase = MotionPhase::Dragging;
        inner.frame = DragFrame::default();
        true
    }

    pub fn drag_move(&self, offset: Offset) -> Option<DragFrame> {
        let mut inner = self.inner.lock();
        if inner.phase != MotionPhase::Dragging {
            return None;
        }
        inner.frame = DragFrame {
            offset,
            rotation: offset.dx * DRAG_ROTATION_FACTOR,
            preview: preview_direction(offset.dx, offset.dy),
        };
        Some(inner.frame)
    }

    pub async fn drag_end(&self, offset: Offset) -> Result<MotionOutcome, MotionError> {
        let release = resolve_release(offset.dx, offset.dy);
        {
            let mut inner = self.inner.lock();
            if inner.phase != MotionPhase::Dragging {
                return Ok(MotionOutcome::Ignored);
            }
            inner.frame.offset = offset;
            inner.frame.preview = None;
            inner.phase = match release {
                Release::Commit(direction) => MotionPhase::Committing(direction),
                Release::ReturnToCenter => MotionPhase::Returning,
            };
        }

        match release {
            Release::Commit(direction) => {
                info!(card_id = %self.card.id, %direction, "drag released past threshold");
                self.commit(direction).await
            }
            Release::ReturnToCenter => {
                debug!(card_id = %self.card.id, "no swipe detected, returning to center");
                self.return_to_center().await
            }
        }
    }

    /// External command entry point. Only an idle card reacts; any other
    /// phase resolves to [`MotionOutcome::Ignored`] without side effects.
    pub async fn trigger_swipe(
        &self,
        direction: SwipeDirection,
    ) -> Result<MotionOutcome, MotionError> {
        {
            let mut inner = self.inner.lock();
            if inner.phase != MotionPhase::Idle {
                debug!(
                    card_id = %self.card.id,
                    phase = ?inner.phase,
                    %direction,
                    "swipe command ignored, card is busy"
                );
                return Ok(MotionOutcome::Ignored);
            }
            inner.phase = MotionPhase::Committing(direction);
        }

        info!(card_id = %self.card.id, %direction, "button swipe triggered");
        self.commit(direction).await
    }

    async fn commit(&self, direction: SwipeDirection) -> Result<MotionOutcome, MotionError> {
        let result = self
            .animator
            .animate(&self.card.id, MotionTarget::exit(direction), self.exit)
            .await;

        match result {
            Ok(()) => {
                self.inner.lock().phase = MotionPhase::Removed;
                debug!(card_id = %self.card.id, %direction, "exit animation complete");
                (self.on_removed)(&self.card, direction);
                Ok(MotionOutcome::Committed(direction))
            }
            Err(source) => {
                {
                    let mut inner = self.inner.lock();
                    inner.phase = MotionPhase::Idle;
                    inner.frame = DragFrame::default();
                }
                warn!(card_id = %self.card.id, %direction, error = %source, "exit animation failed");
                Err(MotionError::Exit {
                    card_id: self.card.id.clone(),
                    direction,
                    source,
                })
            }
        }
    }

    async fn return_to_center(&self) -> Result<MotionOutcome, MotionError> {
        let result = self
            .animator
            .animate(&self.card.id, MotionTarget::REST, self.settle)
            .await;

        {
            let mut inner = self.inner.lock();
            inner.phase = MotionPhase::Idle;
            inner.frame = DragFrame::default();
        }

        result
            .map(|()| MotionOutcome::Returned)
            .map_err(|source| MotionError::Settle {
                card_id: self.card.id.clone(),
                source,
            })
    }
}

#[cfg(test)]
#[path = "tests/motion_tests.rs"]
mod tests;
