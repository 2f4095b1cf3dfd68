use crate::animation::timeline::{Animator, Style, Target};
use crate::trail::activity::ActivityTracker;
use crate::trail::surface::Surface;
use crate::utils::geometry::Rect;

/// Index of a slot inside its pool.
pub type SlotId = usize;

/// Identifies one activation so late completion reports can be matched
/// against the slot's current occupant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActivationId(pub u64);

/// Base stacking value; the z-order counter returns here when idle.
pub const BASE_Z_INDEX: u32 = 1;

#[derive(Debug)]
struct Slot {
    rect: Rect,
    in_flight: Option<ActivationId>,
}

/// Fixed-size ring of reusable slots.
#[derive(Debug)]
pub struct SlotPool {
    slots: Vec<Slot>,
    cursor: usize,
    z_index: u32,
    next_activation: u64,
}

impl SlotPool {
    /// Builds one slot per element the surface reports, measuring each.
    pub fn measure(surface: &dyn Surface) -> Self {
        let rects = (0..surface.slot_count())
            .map(|slot| surface.measure_slot(slot))
            .collect();
        Self::from_rects(rects)
    }

    pub fn from_rects(rects: Vec<Rect>) -> Self {
        Self {
            slots: rects
                .into_iter()
                .map(|rect| Slot {
                    rect,
                    in_flight: None,
                })
                .collect(),
            cursor: 0,
            z_index: BASE_Z_INDEX,
            next_activation: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn z_index(&self) -> u32 {
        self.z_index
    }

    pub fn reset_z_index(&mut self) {
        self.z_index = BASE_Z_INDEX;
    }

    /// Cached geometry of `slot`, zero-sized for an unknown slot.
    pub fn rect(&self, slot: SlotId) -> Rect {
        self.slots.get(slot).map(|s| s.rect).unwrap_or_default()
    }

    pub fn is_in_flight(&self, slot: SlotId) -> bool {
        self.slots
            .get(slot)
            .is_some_and(|s| s.in_flight.is_some())
    }

    /// Moves the cursor to the next slot (wrapping) and raises the z-order
    /// counter. `None` for an empty pool.
    pub fn advance(&mut self) -> Option<SlotId> {
        if self.slots.is_empty() {
            return None;
        }
        self.z_index += 1;
        self.cursor = if self.cursor + 1 < self.slots.len() {
            self.cursor + 1
        } else {
            0
        };
        Some(self.cursor)
    }

    /// Interrupts whatever is running on `slot`. If an activation still
    /// occupied the slot, its accounting ends here: the animator will never
    /// report it.
    pub fn cancel_pending(
        &mut self,
        slot: SlotId,
        animator: &mut dyn Animator,
        tracker: &mut ActivityTracker,
    ) {
        let Some(entry) = self.slots.get_mut(slot) else {
            return;
        };
        animator.kill_tweens_of(slot);
        if let Some(replaced) = entry.in_flight.take() {
            log::debug!("SlotPool::cancel_pending: slot={slot} replaced={replaced:?}");
            tracker.finish();
        }
    }

    /// Marks `slot` as occupied by a fresh activation.
    pub fn occupy(&mut self, slot: SlotId) -> ActivationId {
        let id = ActivationId(self.next_activation);
        self.next_activation += 1;
        if let Some(entry) = self.slots.get_mut(slot) {
            entry.in_flight = Some(id);
        }
        id
    }

    /// Applies a completion report. Reports for an activation that no longer
    /// occupies its slot are stale and ignored.
    pub fn complete(
        &mut self,
        slot: SlotId,
        activation: ActivationId,
        tracker: &mut ActivityTracker,
    ) -> bool {
        match self.slots.get_mut(slot) {
            Some(entry) if entry.in_flight == Some(activation) => {
                entry.in_flight = None;
                tracker.finish()
            }
            _ => {
                log::debug!(
                    "SlotPool::complete: stale completion slot={slot} activation={activation:?}"
                );
                false
            }
        }
    }

    /// Resets every slot to its default look and re-measures it.
    pub fn resize(&mut self, surface: &dyn Surface, animator: &mut dyn Animator) {
        let default_style = Style::slot_default();
        for (index, slot) in self.slots.iter_mut().enumerate() {
            animator.set(Target::Slot(index), &default_style);
            slot.rect = surface.measure_slot(index);
        }
    }

    /// Cancels every slot, settling the accounting of whatever was in flight.
    pub fn cancel_all(&mut self, animator: &mut dyn Animator, tracker: &mut ActivityTracker) {
        for slot in 0..self.slots.len() {
            self.cancel_pending(slot, animator, tracker);
        }
    }

    /// Slot that was current `window` activations before `position`.
    pub fn predecessor_of(&self, position: SlotId, window: usize) -> SlotId {
        let len = self.slots.len();
        if len == 0 {
            return 0;
        }
        let offset = window % len;
        (position % len + len - offset) % len
    }
}
