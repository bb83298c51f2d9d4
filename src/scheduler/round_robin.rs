//! Round-robin admission: each tick rotates through the vehicle list starting just
//! past the last vehicle served, filling `charging` up to capacity.

use tracing::trace;

use crate::vehicle::Vehicle;

/// Rebuilds `charging` from scratch for this tick by walking the vehicle list
/// circularly starting at `(last_served_index + 1) mod N`, taking every present,
/// not-full vehicle until `capacity` is filled or the whole list has been visited.
/// Returns the new `last_served_index` (the index of the last vehicle admitted), or
/// the prior value if nothing was admitted.
pub fn refill_charging(
    charging: &mut Vec<usize>,
    vehicles: &[Vehicle],
    capacity: usize,
    last_served_index: Option<usize>,
) -> Option<usize> {
    charging.clear();
    let n = vehicles.len();
    if n == 0 || capacity == 0 {
        return last_served_index;
    }

    let start = last_served_index.map_or(0, |i| (i + 1) % n);
    let mut served = last_served_index;

    for offset in 0..n {
        if charging.len() >= capacity {
            break;
        }
        let i = (start + offset) % n;
        let v = &vehicles[i];
        if v.is_present() && !v.is_full() {
            trace!(idx = i, "round_robin: admitting vehicle to charging");
            charging.push(i);
            served = Some(i);
        }
    }

    served
}
