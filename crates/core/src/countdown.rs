/// Local exam countdown, in whole seconds.
///
/// Purely a display guard: the server enforces the real deadline. The value
/// saturates at zero and never goes negative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Countdown {
    remaining: u64,
}

impl Countdown {
    #[must_use]
    pub fn new(remaining: u64) -> Self {
        Self { remaining }
    }

    /// Builds a countdown from the backend's fractional remaining-seconds budget.
    ///
    /// Fractions are floored; negative or non-finite budgets become zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_budget(seconds: f64) -> Self {
        let remaining = if seconds.is_finite() && seconds > 0.0 {
            seconds.floor() as u64
        } else {
            0
        };
        Self { remaining }
    }

    #[must_use]
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining == 0
    }

    /// Advances one second. Returns `false` once already at zero.
    pub fn tick(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        true
    }
}
