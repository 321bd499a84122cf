//! Cancellable delayed continuation on the tick loop
//!
//! Nothing sleeps: the owner advances the delay with the frame's `dt` and
//! acts when [`Delay::advance`] reports that it fired.

/// A single pending continuation, fired at most once per schedule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Delay {
    remaining: Option<f32>,
}

impl Delay {
    pub fn new() -> Self {
        Self { remaining: None }
    }

    /// Arm the delay, replacing any pending one
    pub fn schedule(&mut self, seconds: f32) {
        self.remaining = Some(seconds.max(0.0));
    }

    /// Drop the pending continuation, if any
    pub fn cancel(&mut self) {
        self.remaining = None;
    }

    pub fn is_pending(&self) -> bool {
        self.remaining.is_some()
    }

    /// Seconds until the continuation fires
    pub fn remaining(&self) -> Option<f32> {
        self.remaining
    }

    /// Advance by `dt`. Returns true exactly once, on the tick the delay elapses.
    pub fn advance(&mut self, dt: f32) -> bool {
        match self.remaining {
            Some(left) => {
                let left = left - dt.max(0.0);
                if left <= 0.0 {
                    self.remaining = None;
                    true
                } else {
                    self.remaining = Some(left);
                    false
                }
            }
            None => false,
        }
    }
}
