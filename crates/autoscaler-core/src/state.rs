//! Cooldown and tick bookkeeping, owned by the `Reconciler`.

use std::time::{Duration, Instant};

/// Process-local reconciler state, mutated only by the reconciler.
///
/// This is deliberately a plain value passed through / closed over by the
/// reconciler rather than module-level mutable state — it carries no
/// interior mutability of its own so the
/// reconciler can reason about a single owned copy per tick.
#[derive(Debug, Clone)]
pub struct ControllerState {
    last_scale_at: Instant,
    last_tick_at: Option<Instant>,
    tick_count: u64,
}

impl ControllerState {
    /// Initializes state so the first tick is never in cooldown, per
    /// the invariant `last_scale_at = now - COOLDOWN`.
    pub fn new(cooldown: Duration) -> Self {
        Self {
            last_scale_at: Instant::now()
                .checked_sub(cooldown)
                .unwrap_or_else(Instant::now),
            last_tick_at: None,
            tick_count: 0,
        }
    }

    /// Seconds remaining before the cooldown expires, `0` if already expired.
    pub fn cooldown_remaining(&self, cooldown: Duration, now: Instant) -> Duration {
        let elapsed = now.saturating_duration_since(self.last_scale_at);
        cooldown.saturating_sub(elapsed)
    }

    /// Records that a scaling action completed successfully at `now`.
    pub fn record_scale(&mut self, now: Instant) {
        self.last_scale_at = now;
    }

    /// Records that a tick completed (regardless of its decision).
    pub fn record_tick(&mut self, now: Instant) {
        self.last_tick_at = Some(now);
        self.tick_count += 1;
    }

    pub fn last_scale_at(&self) -> Instant {
        self.last_scale_at
    }

    pub fn last_tick_at(&self) -> Option<Instant> {
        self.last_tick_at
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}
