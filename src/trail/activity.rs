/// Net count of activations whose sequence is still in flight.
///
/// Idle is derived, never stored: the tracker is idle exactly when the count
/// is zero.
#[derive(Debug, Default)]
pub struct ActivityTracker {
    active: usize,
}

impl ActivityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an activation start.
    pub fn begin(&mut self) {
        self.active += 1;
    }

    /// Records an activation's terminal completion. Returns `false` if
    /// there was nothing in flight to complete.
    pub fn finish(&mut self) -> bool {
        if self.active == 0 {
            log::warn!("ActivityTracker::finish: completion with no active activation");
            return false;
        }
        self.active -= 1;
        true
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn is_idle(&self) -> bool {
        self.active == 0
    }
}
