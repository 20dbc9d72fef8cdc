//! Single-shot debounce timer for autosave.
//!
//! The timer owns one deadline slot. Arming again moves the deadline instead
//! of stacking a second timer. Time is whatever clock the host passes in
//! (milliseconds), which keeps the timer testable with a fake clock.

#[cfg(test)]
#[path = "autosave_test.rs"]
mod autosave_test;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AutosaveTimer {
    delay_ms: f64,
    deadline: Option<f64>,
}

impl AutosaveTimer {
    #[must_use]
    pub fn new(delay_ms: f64) -> Self {
        Self { delay_ms, deadline: None }
    }

    /// (Re)start the countdown from `now`.
    pub fn arm_on_dirty(&mut self, now: f64) {
        self.deadline = Some(now + self.delay_ms);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Disarm and report whether a save was pending, for callers that want
    /// to save immediately instead of waiting.
    pub fn fire_now(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Fire if the deadline has passed. A fired timer is disarmed.
    pub fn poll(&mut self, now: f64) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    #[must_use]
    pub fn deadline(&self) -> Option<f64> {
        self.deadline
    }
}
