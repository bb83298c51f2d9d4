//! Per-vehicle daily trip schedule generation and driving-state queries.

use crate::error::ConfigError;
use crate::random::RandomSource;

/// One trip: `(departure_tick, arrival_tick)`, both counted from the start of the run.
pub type Trip = (usize, usize);

/// An ordered, non-overlapping sequence of trips for a single simulated day.
#[derive(Debug, Clone)]
pub struct TripPlan {
    trips: Vec<Trip>,
}

impl TripPlan {
    /// Generates a trip plan with `trip_count` trips whose departure/arrival ticks fall
    /// within `[first_tick, last_tick]`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the window is too narrow to fit `trip_count` disjoint
    /// departure/arrival ticks.
    pub fn generate(
        rng: &mut RandomSource,
        first_tick: usize,
        last_tick: usize,
        trip_count: usize,
    ) -> Result<Self, ConfigError> {
        let slots = last_tick.saturating_sub(first_tick);
        let needed = trip_count * 2;
        if needed > slots + 1 {
            return Err(ConfigError::new(
                "CANT_SALIDAS",
                format!(
                    "{trip_count} trips need {needed} distinct ticks but only {} are available \
                     between HORA_PRIMERA_SALIDA and HORA_ULTIMO_REGRESO",
                    slots + 1
                ),
            ));
        }

        let mut picks = rng.sample_without_replacement(slots + 1, needed);
        picks.iter_mut().for_each(|p| *p += first_tick);

        let trips = picks
            .chunks_exact(2)
            .map(|pair| (pair[0], pair[1]))
            .collect();

        Ok(Self { trips })
    }

    /// Builds a trip plan directly from already-computed pairs (used by tests and by
    /// scenarios with a fixed, non-randomized schedule).
    pub fn from_trips(trips: Vec<Trip>) -> Self {
        Self { trips }
    }

    pub fn trips(&self) -> &[Trip] {
        &self.trips
    }

    pub fn len(&self) -> usize {
        self.trips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trips.is_empty()
    }

    /// Whether tick `t` falls within trip `trips[idx]`'s driving window, applying the
    /// symmetric midpoint grace interval for trips longer than `grace_ticks`.
    ///
    /// For a trip `(departure, arrival)` with `arrival - departure > grace_ticks`, the
    /// vehicle is *not* considered driving during `[departure + grace_ticks/2, arrival -
    /// grace_ticks/2]` — it is treated as parked mid-trip. Short trips are driving for
    /// their entire `[departure, arrival]` span.
    pub fn is_driving_at(&self, idx: usize, t: usize, grace_ticks: usize) -> bool {
        let Some(&(departure, arrival)) = self.trips.get(idx) else {
            return false;
        };
        if t < departure || t > arrival {
            return false;
        }
        let span = arrival - departure;
        if span > grace_ticks {
            let half = grace_ticks / 2;
            let grace_start = departure + half;
            let grace_end = arrival - half;
            !(grace_start..=grace_end).contains(&t)
        } else {
            true
        }
    }

    /// Energy (kWh) required to complete trip `idx`, given the vehicle's efficiency
    /// (km/kWh) and average speed (km/h) and tick length in minutes.
    pub fn trip_energy_kwh(&self, idx: usize, efficiency: f64, avg_speed: f64, tick_minutes: f64) -> f64 {
        let Some(&(departure, arrival)) = self.trips.get(idx) else {
            return 0.0;
        };
        let duration_hours = ((arrival - departure) as f64) * tick_minutes / 60.0;
        let distance_km = duration_hours * avg_speed;
        distance_km / efficiency
    }

    /// Sum of [`TripPlan::trip_energy_kwh`] over every trip in the plan.
    pub fn total_energy_kwh(&self, efficiency: f64, avg_speed: f64, tick_minutes: f64) -> f64 {
        (0..self.trips.len())
            .map(|i| self.trip_energy_kwh(i, efficiency, avg_speed, tick_minutes))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_trips_are_sorted_and_disjoint() {
        let mut rng = RandomSource::new(5);
        let plan = TripPlan::generate(&mut rng, 0, 96, 3).unwrap();
        assert_eq!(plan.len(), 3);
        let mut last_end = None;
        for &(dep, arr) in plan.trips() {
            assert!(arr > dep);
            if let Some(prev) = last_end {
                assert!(dep > prev);
            }
            last_end = Some(arr);
        }
    }

    #[test]
    fn rejects_window_too_narrow() {
        let mut rng = RandomSource::new(1);
        let result = TripPlan::generate(&mut rng, 0, 2, 3);
        assert!(result.is_err());
    }

    #[test]
    fn short_trip_is_driving_for_entire_span() {
        let plan = TripPlan::from_trips(vec![(10, 12)]);
        assert!(!plan.is_driving_at(0, 9, 4));
        assert!(plan.is_driving_at(0, 10, 4));
        assert!(plan.is_driving_at(0, 11, 4));
        assert!(plan.is_driving_at(0, 12, 4));
        assert!(!plan.is_driving_at(0, 13, 4));
    }

    #[test]
    fn long_trip_grants_midpoint_grace() {
        // departure=0 arrival=20, grace_ticks=4 -> grace window is [2, 18]
        let plan = TripPlan::from_trips(vec![(0, 20)]);
        assert!(plan.is_driving_at(0, 0, 4));
        assert!(plan.is_driving_at(0, 1, 4));
        assert!(!plan.is_driving_at(0, 2, 4));
        assert!(!plan.is_driving_at(0, 10, 4));
        assert!(!plan.is_driving_at(0, 18, 4));
        assert!(plan.is_driving_at(0, 19, 4));
        assert!(plan.is_driving_at(0, 20, 4));
    }

    #[test]
    fn trip_energy_is_distance_over_efficiency() {
        let plan = TripPlan::from_trips(vec![(0, 4)]);
        // 4 ticks * 15 min = 1h, at 40 km/h -> 40km, at 5 km/kWh -> 8 kWh
        let kwh = plan.trip_energy_kwh(0, 5.0, 40.0, 15.0);
        assert!((kwh - 8.0).abs() < 1e-9);
    }
}
