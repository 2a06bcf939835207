//! Swipe deck core: per-card gesture/commit state machine, the stack that
//! owns history and tally, and loading of deck contents.

pub mod animator;
pub mod catalog;
pub mod config;
pub mod motion;
pub mod seed;
pub mod stack;

pub use animator::{AnimationError, Animator, InstantAnimator, MotionTarget, TimedAnimator, Transition};
pub use catalog::{load_deck, CatalogClient, CatalogError, DeckOrigin, LoadedDeck};
pub use config::DeckConfig;
pub use motion::{
    preview_direction, resolve_release, CardMotionController, DragFrame, MotionError,
    MotionOutcome, MotionPhase, Offset, Release, RemovalHandler,
};
pub use seed::seed_cards;
pub use stack::{DeckSnapshot, DeckState, IgnoreReason, StackController, SwipeOutcome};
