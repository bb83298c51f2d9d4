//! First-in-first-out admission: vehicles charge in the order they start waiting and
//! are never evicted early to make room for a later arrival.

use tracing::trace;

use crate::vehicle::Vehicle;

pub fn admit(waiting: &mut Vec<usize>, charging: &[usize], idx: usize) {
    if !waiting.contains(&idx) && !charging.contains(&idx) {
        trace!(idx, "fifo: admitting vehicle to waiting queue");
        waiting.push(idx);
    }
}

pub fn refill_charging(waiting: &mut Vec<usize>, charging: &mut Vec<usize>, capacity: usize) {
    while !waiting.is_empty() && charging.len() < capacity {
        let idx = waiting.remove(0);
        trace!(idx, "fifo: moving vehicle from waiting to charging");
        charging.push(idx);
    }
}

/// Drops vehicles that became full, and truncates `charging` to `capacity` (keeping the
/// earliest-admitted prefix) if the capacity shrank below the current occupancy.
pub fn evict(charging: &mut Vec<usize>, vehicles: &[Vehicle], capacity: usize) {
    let before = charging.len();
    charging.retain(|&idx| !vehicles[idx].is_full());
    if before != charging.len() {
        trace!(evicted = before - charging.len(), "fifo: evicted full vehicles");
    }
    if charging.len() > capacity {
        trace!(capacity, occupied = charging.len(), "fifo: truncating charging to reduced capacity");
        charging.truncate(capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{TripPlan, Vehicle, VehicleParams};

    fn vehicle(battery: f64) -> Vehicle {
        let params = VehicleParams {
            name: "v".into(),
            max_battery_kwh: 20.0,
            efficiency_km_per_kwh: 5.0,
            avg_speed_kmh: 40.0,
            trip_plan: TripPlan::from_trips(vec![]),
        };
        Vehicle::new(params, battery, 0.0)
    }

    #[test]
    fn admit_is_idempotent() {
        let mut waiting = Vec::new();
        let charging = Vec::new();
        admit(&mut waiting, &charging, 0);
        admit(&mut waiting, &charging, 0);
        assert_eq!(waiting, vec![0]);
    }

    #[test]
    fn refill_drains_in_fifo_order() {
        let mut waiting = vec![2, 0, 1];
        let mut charging = Vec::new();
        refill_charging(&mut waiting, &mut charging, 2);
        assert_eq!(charging, vec![2, 0]);
        assert_eq!(waiting, vec![1]);
    }

    #[test]
    fn evict_only_drops_full_or_over_capacity() {
        let vehicles = vec![vehicle(20.0), vehicle(5.0), vehicle(5.0)];
        let mut charging = vec![0, 1, 2];
        evict(&mut charging, &vehicles, 3);
        assert_eq!(charging, vec![1, 2]);
    }

    #[test]
    fn evict_truncates_when_capacity_shrinks() {
        let vehicles = vec![vehicle(5.0), vehicle(5.0), vehicle(5.0)];
        let mut charging = vec![0, 1, 2];
        evict(&mut charging, &vehicles, 1);
        assert_eq!(charging, vec![0]);
    }
}
