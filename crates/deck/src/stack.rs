//! The deck: card stack, swipe history, tally and the swipe-in-flight guard.
//!
//! [`DeckState`] holds the data and its invariants with no async or locking
//! concerns. [`StackController`] wraps it for a running UI: it mounts a
//! [`CardMotionController`] for the top card, forwards commands and gestures
//! to it, and arms a watchdog for every swipe it lets through.

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;
use shared::domain::{Card, CardId, HistoryEntry, SwipeDirection, Tally};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    animator::Animator,
    config::DeckConfig,
    motion::{
        resolve_release, CardMotionController, DragFrame, MotionError, MotionOutcome,
        MotionPhase, Offset, Release, RemovalHandler,
    },
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    InFlight,
    EmptyStack,
    NoActiveCard,
    NotDragging,
    CardBusy,
    /// The swipe finished after a reset or a watchdog timeout had already
    /// given up on it.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwipeOutcome {
    Committed {
        card_id: CardId,
        direction: SwipeDirection,
    },
    Returned,
    Ignored(IgnoreReason),
    /// The animation failed; the card is still the active card.
    Failed { card_id: CardId, reason: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SwipeGuard {
    in_flight: bool,
    removing: Option<CardId>,
    epoch: u64,
}

/// Proof that a swipe took the guard; carries the epoch used to release it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeTicket {
    pub epoch: u64,
    pub card_id: CardId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeckSnapshot {
    pub stack: Vec<CardId>,
    pub active: Option<CardId>,
    pub history: Vec<(CardId, SwipeDirection)>,
    pub tally: Tally,
    pub in_flight: bool,
    pub removing: Option<CardId>,
}

/// Invariant: `tally.get(d)` equals the number of history entries swiped `d`.
#[derive(Debug, Clone)]
pub struct DeckState {
    seed: Vec<Card>,
    stack: Vec<Card>,
    history: Vec<HistoryEntry>,
    tally: Tally,
    guard: SwipeGuard,
}

impl DeckState {
    pub fn new(seed: Vec<Card>) -> Self {
        Self {
            stack: seed.clone(),
            seed,
            history: Vec::new(),
            tally: Tally::default(),
            guard: SwipeGuard::default(),
        }
    }

    pub fn active_card(&self) -> Option<&Card> {
        self.stack.last()
    }

    pub fn stack(&self) -> &[Card] {
        &self.stack
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn tally(&self) -> Tally {
        self.tally
    }

    pub fn is_in_flight(&self) -> bool {
        self.guard.in_flight
    }

    pub fn begin_swipe(&mut self) -> Result<SwipeTicket, IgnoreReason> {
        if self.guard.in_flight {
            return Err(IgnoreReason::InFlight);
        }
        let card_id = self
            .active_card()
            .map(|card| card.id.clone())
            .ok_or(IgnoreReason::EmptyStack)?;

        self.guard.epoch += 1;
        self.guard.in_flight = true;
        self.guard.removing = Some(card_id.clone());
        Ok(SwipeTicket {
            epoch: self.guard.epoch,
            card_id,
        })
    }

    /// Applies a committed swipe. Returns false, changing nothing, when the
    /// card is no longer in the stack (a repeated completion signal).
    pub fn record_removal(&mut self, card: &Card, direction: SwipeDirection) -> bool {
        let Some(position) = self.stack.iter().position(|c| c.id == card.id) else {
            return false;
        };
        let removed = self.stack.remove(position);
        if self.guard.removing.as_ref() == Some(&removed.id) {
            self.clear_guard();
        }
        self.tally.increment(direction);
        self.history.push(HistoryEntry {
            card: removed,
            swipe: direction,
        });
        true
    }

    /// Clears the guard if it is still held by the swipe with `epoch`.
    pub fn release(&mut self, epoch: u64) -> bool {
        if self.guard.in_flight && self.guard.epoch == epoch {
            self.clear_guard();
            true
        } else {
            false
        }
    }

    pub fn undo(&mut self) -> Option<HistoryEntry> {
        if self.guard.in_flight {
            return None;
        }
        let entry = self.history.pop()?;
        self.tally.decrement(entry.swipe);
        self.stack.push(entry.card.clone());
        Some(entry)
    }

    pub fn reset(&mut self) {
        self.stack = self.seed.clone();
        self.history.clear();
        self.tally = Tally::default();
        self.clear_guard();
    }

    pub fn snapshot(&self) -> DeckSnapshot {
        DeckSnapshot {
            stack: self.stack.iter().map(|card| card.id.clone()).collect(),
            active: self.active_card().map(|card| card.id.clone()),
            history: self
                .history
                .iter()
                .map(|entry| (entry.card.id.clone(), entry.swipe))
                .collect(),
            tally: self.tally,
            in_flight: self.guard.in_flight,
            removing: self.guard.removing.clone(),
        }
    }

    fn clear_guard(&mut self) {
        self.guard.in_flight = false;
        self.guard.removing = None;
    }
}

struct Deck {
    state: DeckState,
    active: Option<Arc<CardMotionController>>,
    watchdog: Option<JoinHandle<()>>,
    // Bumped on reset so completions from before the reset are dropped.
    generation: u64,
}

struct DeckShared {
    deck: Mutex<Deck>,
    animator: Arc<dyn Animator>,
    config: DeckConfig,
}

impl DeckShared {
    fn removal_handler(self: &Arc<Self>, generation: u64) -> RemovalHandler {
        let weak: Weak<DeckShared> = Arc::downgrade(self);
        Arc::new(move |card: &Card, direction: SwipeDirection| {
            if let Some(shared) = weak.upgrade() {
                shared.card_removed(generation, card, direction);
            }
        })
    }

    fn card_removed(self: &Arc<Self>, generation: u64, card: &Card, direction: SwipeDirection) {
        let mut deck = self.deck.lock();
        if deck.generation != generation {
            debug!(card_id = %card.id, "dropping removal from before the last reset");
            return;
        }
        if !deck.state.record_removal(card, direction) {
            debug!(card_id = %card.id, %direction, "duplicate removal signal ignored");
            return;
        }
        info!(
            card_id = %card.id,
            %direction,
            remaining = deck.state.stack().len(),
            "card removed"
        );
        if !deck.state.is_in_flight() {
            if let Some(watchdog) = deck.watchdog.take() {
                watchdog.abort();
            }
        }
        self.mount_top(&mut deck);
    }

    fn mount_top(self: &Arc<Self>, deck: &mut Deck) {
        let Some(top) = deck.state.active_card() else {
            deck.active = None;
            return;
        };
        let reusable = deck.active.as_ref().is_some_and(|controller| {
            controller.card().id == top.id && controller.phase() != MotionPhase::Removed
        });
        if reusable {
            return;
        }

        let controller = CardMotionController::with_config(
            top.clone(),
            Arc::clone(&self.animator),
            self.removal_handler(deck.generation),
            &self.config,
        );
        debug!(card_id = %top.id, "mounted active card");
        deck.active = Some(Arc::new(controller));
    }

    // Liveness net for lost completion signals; it does not fix whatever
    // lost the signal.
    fn arm_watchdog(self: &Arc<Self>, deck: &mut Deck, epoch: u64) {
        if let Some(previous) = deck.watchdog.take() {
            previous.abort();
        }
        let weak = Arc::downgrade(self);
        let timeout = self.config.watchdog_timeout;
        deck.watchdog = Some(tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let mut deck = shared.deck.lock();
            if !deck.state.release(epoch) {
                return;
            }
            warn!(
                epoch,
                ?timeout,
                "swipe still in flight at watchdog timeout; force-resetting guard"
            );
            // The stuck card is treated as unmounted: its late signals are
            // dropped and the top card gets a fresh controller.
            deck.generation += 1;
            deck.active = None;
            shared.mount_top(&mut deck);
        }));
    }

    fn release(&self, epoch: u64) {
        let mut deck = self.deck.lock();
        if deck.state.release(epoch) {
            if let Some(watchdog) = deck.watchdog.take() {
                watchdog.abort();
            }
        }
    }

    fn finish_swipe(
        &self,
        ticket: SwipeTicket,
        result: Result<MotionOutcome, MotionError>,
    ) -> SwipeOutcome {
        match result {
            Ok(MotionOutcome::Committed(direction)) => {
                let still_stacked = self
                    .deck
                    .lock()
                    .state
                    .stack()
                    .iter()
                    .any(|card| card.id == ticket.card_id);
                if still_stacked {
                    debug!(
                        card_id = %ticket.card_id,
                        %direction,
                        "late swipe completion dropped"
                    );
                    return SwipeOutcome::Ignored(IgnoreReason::Superseded);
                }
                SwipeOutcome::Committed {
                    card_id: ticket.card_id,
                    direction,
                }
            }
            Ok(MotionOutcome::Returned | MotionOutcome::Ignored) => {
                self.release(ticket.epoch);
                SwipeOutcome::Ignored(IgnoreReason::CardBusy)
            }
            Err(error) => {
                warn!(card_id = %ticket.card_id, %error, "swipe did not complete, card stays active");
                self.release(ticket.epoch);
                SwipeOutcome::Failed {
                    card_id: ticket.card_id,
                    reason: error.to_string(),
                }
            }
        }
    }
}

enum DragPlan {
    Commit(SwipeTicket),
    Return,
    Refused(IgnoreReason),
}

/// Owns the deck and is its only writer. Cloning yields another handle to
/// the same deck.
#[derive(Clone)]
pub struct StackController {
    shared: Arc<DeckShared>,
}

impl StackController {
    pub fn new(seed: Vec<Card>, animator: Arc<dyn Animator>) -> Self {
        Self::with_config(seed, animator, DeckConfig::default())
    }

    pub fn with_config(seed: Vec<Card>, animator: Arc<dyn Animator>, config: DeckConfig) -> Self {
        let shared = Arc::new(DeckShared {
            deck: Mutex::new(Deck {
                state: DeckState::new(seed),
                active: None,
                watchdog: None,
                generation: 0,
            }),
            animator,
            config,
        });
        {
            let mut deck = shared.deck.lock();
            shared.mount_top(&mut deck);
        }
        Self { shared }
    }

    /// Swipes the active card as if its button was pressed.
    pub async fn swipe_active(&self, direction: SwipeDirection) -> SwipeOutcome {
        let (controller, ticket) = {
            let mut deck = self.shared.deck.lock();
            if deck.state.is_in_flight() {
                debug!(%direction, "swipe already in flight, skipping");
                return SwipeOutcome::Ignored(IgnoreReason::InFlight);
            }
            if deck.state.active_card().is_none() {
                debug!(%direction, "no cards to swipe");
                return SwipeOutcome::Ignored(IgnoreReason::EmptyStack);
            }
            let Some(controller) = deck.active.clone() else {
                warn!(%direction, "no active card controller registered");
                return SwipeOutcome::Ignored(IgnoreReason::NoActiveCard);
            };
            let ticket = match deck.state.begin_swipe() {
                Ok(ticket) => ticket,
                Err(reason) => return SwipeOutcome::Ignored(reason),
            };
            self.shared.arm_watchdog(&mut deck, ticket.epoch);
            (controller, ticket)
        };

        let result = controller.trigger_swipe(direction).await;
        self.shared.finish_swipe(ticket, result)
    }

    pub fn drag_start(&self) -> bool {
        let deck = self.shared.deck.lock();
        if deck.state.is_in_flight() {
            debug!("drag refused while a swipe is in flight");
            return false;
        }
        deck.active
            .as_ref()
            .is_some_and(|controller| controller.drag_start())
    }

    pub fn drag_move(&self, offset: Offset) -> Option<DragFrame> {
        let controller = self.shared.deck.lock().active.clone()?;
        controller.drag_move(offset)
    }

    pub async fn drag_end(&self, offset: Offset) -> SwipeOutcome {
        let (controller, plan) = {
            let mut deck = self.shared.deck.lock();
            let Some(controller) = deck.active.clone() else {
                return SwipeOutcome::Ignored(IgnoreReason::NoActiveCard);
            };
            if controller.phase() != MotionPhase::Dragging {
                return SwipeOutcome::Ignored(IgnoreReason::NotDragging);
            }
            let plan = match resolve_release(offset.dx, offset.dy) {
                Release::ReturnToCenter => DragPlan::Return,
                Release::Commit(_) => match deck.state.begin_swipe() {
                    Ok(ticket) => {
                        self.shared.arm_watchdog(&mut deck, ticket.epoch);
                        DragPlan::Commit(ticket)
                    }
                    Err(reason) => DragPlan::Refused(reason),
                },
            };
            (controller, plan)
        };

        match plan {
            DragPlan::Commit(ticket) => {
                let result = controller.drag_end(offset).await;
                self.shared.finish_swipe(ticket, result)
            }
            DragPlan::Return => match controller.drag_end(offset).await {
                Ok(MotionOutcome::Returned) => SwipeOutcome::Returned,
                Ok(_) => SwipeOutcome::Ignored(IgnoreReason::CardBusy),
                Err(error) => {
                    warn!(card_id = %controller.card().id, %error, "return to center failed");
                    SwipeOutcome::Failed {
                        card_id: controller.card().id.clone(),
                        reason: error.to_string(),
                    }
                }
            },
            DragPlan::Refused(reason) => {
                if let Err(error) = controller.drag_end(Offset::ZERO).await {
                    warn!(card_id = %controller.card().id, %error, "return to center failed");
                }
                SwipeOutcome::Ignored(reason)
            }
        }
    }

    pub fn undo(&self) -> Option<HistoryEntry> {
        let mut deck = self.shared.deck.lock();
        let Some(entry) = deck.state.undo() else {
            debug!(
                in_flight = deck.state.is_in_flight(),
                "nothing to undo right now"
            );
            return None;
        };
        info!(card_id = %entry.card.id, swipe = %entry.swipe, "swipe undone");
        self.shared.mount_top(&mut deck);
        Some(entry)
    }

    pub fn reset(&self) {
        let mut deck = self.shared.deck.lock();
        deck.state.reset();
        deck.generation += 1;
        if let Some(watchdog) = deck.watchdog.take() {
            watchdog.abort();
        }
        deck.active = None;
        self.shared.mount_top(&mut deck);
        info!(cards = deck.state.stack().len(), "deck reset");
    }

    /// Registers `controller` as the command target. Only the top card's
    /// controller is accepted.
    pub fn register_active(&self, controller: Arc<CardMotionController>) -> bool {
        let mut deck = self.shared.deck.lock();
        let is_top = deck
            .state
            .active_card()
            .is_some_and(|top| top.id == controller.card().id);
        if !is_top {
            warn!(card_id = %controller.card().id, "refusing to register a card that is not on top");
            return false;
        }
        deck.active = Some(controller);
        true
    }

    pub fn unmount_active(&self) -> Option<Arc<CardMotionController>> {
        self.shared.deck.lock().active.take()
    }

    /// Removal callback bound to this deck, for controllers built outside it.
    pub fn removal_handler(&self) -> RemovalHandler {
        let generation = self.shared.deck.lock().generation;
        self.shared.removal_handler(generation)
    }

    pub fn active_controller(&self) -> Option<Arc<CardMotionController>> {
        self.shared.deck.lock().active.clone()
    }

    pub fn active_card(&self) -> Option<Card> {
        self.shared.deck.lock().state.active_card().cloned()
    }

    pub fn history(&self) -> Vec<HistoryEntry> {
        self.shared.deck.lock().state.history().to_vec()
    }

    pub fn tally(&self) -> Tally {
        self.shared.deck.lock().state.tally()
    }

    pub fn is_in_flight(&self) -> bool {
        self.shared.deck.lock().state.is_in_flight()
    }

    pub fn len(&self) -> usize {
        self.shared.deck.lock().state.stack().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> DeckSnapshot {
        self.shared.deck.lock().state.snapshot()
    }
}

#[cfg(test)]
#[path = "tests/stack_tests.rs"]
mod tests;
