use std::time::Duration;

use crate::animator::Transition;

const DEFAULT_WATCHDOG_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeckConfig {
    /// How long a swipe may stay in flight before the guard is force-cleared.
    pub watchdog_timeout: Duration,
    pub exit: Transition,
    pub settle: Transition,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            watchdog_timeout: DEFAULT_WATCHDOG_TIMEOUT,
            exit: Transition::exit(),
            settle: Transition::settle(),
        }
    }
}

impl DeckConfig {
    pub fn with_watchdog_timeout(mut self, timeout: Duration) -> Self {
        self.watchdog_timeout = timeout;
        self
    }
}
