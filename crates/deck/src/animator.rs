//! Animation seam between card motion logic and whatever renders it.

use std::time::Duration;

use async_trait::async_trait;
use shared::domain::{CardId, SwipeDirection};
use thiserror::Error;

const EXIT_DURATION: Duration = Duration::from_millis(400);
const SETTLE_DURATION: Duration = Duration::from_millis(300);

/// Pose a card animates toward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionTarget {
    pub x: f64,
    pub y: f64,
    pub rotate: f64,
    pub opacity: f64,
    pub scale: f64,
}

impl MotionTarget {
    pub const REST: MotionTarget = MotionTarget {
        x: 0.0,
        y: 0.0,
        rotate: 0.0,
        opacity: 1.0,
        scale: 1.0,
    };

    /// Offscreen pose for a committed swipe.
    pub fn exit(direction: SwipeDirection) -> Self {
        let (x, y, rotate) = match direction {
            SwipeDirection::Like => (1000.0, 0.0, 20.0),
            SwipeDirection::Nope => (-1000.0, 0.0, -20.0),
            SwipeDirection::Superlike => (0.0, -2000.0, 0.0),
        };
        Self {
            x,
            y,
            rotate,
            opacity: 0.0,
            scale: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Easing {
    EaseOut,
    Spring,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub duration: Duration,
    pub easing: Easing,
}

impl Transition {
    pub fn exit() -> Self {
        Self {
            duration: EXIT_DURATION,
            easing: Easing::EaseOut,
        }
    }

    pub fn settle() -> Self {
        Self {
            duration: SETTLE_DURATION,
            easing: Easing::Spring,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnimationError {
    #[error("animation of card {0} was interrupted")]
    Interrupted(CardId),
    #[error("animation backend failed: {0}")]
    Backend(String),
}

/// Drives one animation to completion. The returned future resolves only once
/// the card has reached `target` (or the animation failed).
#[async_trait]
pub trait Animator: Send + Sync {
    async fn animate(
        &self,
        card_id: &CardId,
        target: MotionTarget,
        transition: Transition,
    ) -> Result<(), AnimationError>;
}

/// Waits out the transition on the tokio clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct TimedAnimator;

#[async_trait]
impl Animator for TimedAnimator {
    async fn animate(
        &self,
        card_id: &CardId,
        target: MotionTarget,
        transition: Transition,
    ) -> Result<(), AnimationError> {
        tracing::trace!(%card_id, ?target, ?transition, "animating card");
        tokio::time::sleep(transition.duration).await;
        Ok(())
    }
}

/// Completes every animation immediately.
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantAnimator;

#[async_trait]
impl Animator for InstantAnimator {
    async fn animate(
        &self,
        _card_id: &CardId,
        _target: MotionTarget,
        _transition: Transition,
    ) -> Result<(), AnimationError> {
        Ok(())
    }
}
