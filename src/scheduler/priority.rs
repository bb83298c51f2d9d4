//! Priority ("Intelligent") admission: vehicles wait in a queue kept sorted by urgency
//! and the most urgent ones are drained into `charging` first.

use tracing::trace;

use crate::vehicle::Vehicle;

/// Appends `idx` to `waiting` if it is not already queued or charging, then stable-sorts
/// `waiting` by descending priority so the most urgent vehicle is always at the front.
pub fn admit(waiting: &mut Vec<usize>, charging: &[usize], idx: usize, vehicles: &mut [Vehicle], tick_minutes: f64) {
    if !waiting.contains(&idx) && !charging.contains(&idx) {
        trace!(idx, "priority: admitting vehicle to waiting queue");
        waiting.push(idx);
    }
    waiting.sort_by(|&a, &b| {
        let pa = vehicles[a].priority(tick_minutes);
        let pb = vehicles[b].priority(tick_minutes);
        pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Drains the front of `waiting` into `charging` until capacity is reached; relies on
/// `waiting` already being priority-sorted by [`admit`].
pub fn refill_charging(waiting: &mut Vec<usize>, charging: &mut Vec<usize>, capacity: usize) {
    while !waiting.is_empty() && charging.len() < capacity {
        let idx = waiting.remove(0);
        trace!(idx, "priority: moving most urgent vehicle to charging");
        charging.push(idx);
    }
}

/// Empties `charging`; the next tick's [`admit`]/[`refill_charging`] re-selects from the
/// freshly re-sorted waiting queue.
pub fn evict(charging: &mut Vec<usize>) {
    if !charging.is_empty() {
        trace!(count = charging.len(), "priority: evicting charging set for re-selection");
    }
    charging.clear();
}
