//! Debounce for rapidly changing input.
//!
//! Every [`Debouncer::push`] bumps a generation counter and cancels the
//! previous timer. A timer only releases its value if its generation is still
//! the latest when it fires, so identity is the push, not the value: `a, b, a`
//! inside one window releases the final `a` exactly `delay` after it was
//! pushed.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::common::task::Task;

/// Outcome of a push.
#[derive(Debug)]
pub enum Push<T> {
    /// Zero delay, the value settles in the same tick
    Immediate(T),
    /// A timer was armed; run it and hand its generation to
    /// [`Debouncer::fire`]
    Scheduled(DebounceTimer),
}

/// Cancellable timer for one pushed generation.
#[derive(Debug)]
pub struct DebounceTimer {
    generation: u64,
    deadline: Instant,
    token: CancellationToken,
}

impl DebounceTimer {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Sleep for the window. Resolves to `None` if superseded or cancelled.
    pub async fn wait(self) -> Option<u64> {
        tokio::select! {
            biased;
            _ = self.token.cancelled() => None,
            _ = tokio::time::sleep_until(self.deadline) => Some(self.generation),
        }
    }

    pub fn into_task<M: Send + 'static>(
        self,
        f: impl FnOnce(u64) -> M + Send + 'static,
    ) -> Task<M> {
        let generation = self.generation;
        Task::cancellable(
            self.token,
            tokio::time::sleep_until(self.deadline),
            move |_| f(generation),
        )
    }
}

#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    generation: u64,
    pending: Option<(u64, T)>,
    timer: Option<CancellationToken>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            generation: 0,
            pending: None,
            timer: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Record `value` as the latest input, superseding any pending one.
    pub fn push(&mut self, value: T) -> Push<T> {
        self.cancel();
        self.generation += 1;

        if self.delay.is_zero() {
            return Push::Immediate(value);
        }

        let token = CancellationToken::new();
        self.timer = Some(token.clone());
        self.pending = Some((self.generation, value));
        Push::Scheduled(DebounceTimer {
            generation: self.generation,
            deadline: Instant::now() + self.delay,
            token,
        })
    }

    /// Release the pending value if `generation` is still the latest push.
    pub fn fire(&mut self, generation: u64) -> Option<T> {
        match self.pending.take() {
            Some((pending, value)) if pending == generation => {
                self.timer = None;
                Some(value)
            }
            other => {
                self.pending = other;
                None
            }
        }
    }

    /// Drop the pending value and stop its timer.
    pub fn cancel(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
        self.pending = None;
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        if let Some(token) = self.timer.take() {
            token.cancel();
        }
    }
}
