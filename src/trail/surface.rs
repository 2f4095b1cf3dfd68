use crate::trail::slot_pool::SlotId;
use crate::utils::geometry::Rect;

/// The host page as seen by one trail container.
pub trait Surface {
    /// Container bounds in client coordinates.
    fn container_bounds(&self) -> Rect;

    /// Number of image elements inside the container. Read once when the
    /// pool is built.
    fn slot_count(&self) -> usize;

    /// Current bounding box of a slot element.
    fn measure_slot(&self, slot: SlotId) -> Rect;
}
