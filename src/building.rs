//! Binds a policy, a vehicle fleet, and a power model into one building's per-tick
//! update, and records the resulting tick rows.

use crate::error::SchedulerInvariantViolation;
use crate::power_model::PowerModel;
use crate::scheduler::{ChargeScheduler, HighDemandWindow, Policy, TickOutcome};
use crate::vehicle::{NeedsChargeMode, Vehicle};

/// Slack allowed when comparing the scheduler's reported energy draw against the
/// capacity-derived bound, to absorb floating-point rounding.
const POWER_USED_EPSILON_KWH: f64 = 1e-6;

/// One row of output for a single building at a single tick.
#[derive(Debug, Clone)]
pub struct TickRow {
    pub timestamp: String,
    pub available_power_kw: f64,
    pub power_used_kw: f64,
    pub battery_ratios: Vec<f64>,
    pub priorities: Option<Vec<f64>>,
}

/// A named building running one scheduler policy over one fleet of vehicles.
pub struct Building {
    pub name: String,
    /// The consumption-table column name this building reads its input from, distinct
    /// from `name` (which also carries the policy label for the output table stem).
    pub source_name: String,
    pub policy: Policy,
    power_model: PowerModel,
    scheduler: ChargeScheduler,
    vehicles: Vec<Vehicle>,
    tick_minutes: f64,
    grace_ticks: usize,
    needs_charge_mode: NeedsChargeMode,
    high_demand: Option<HighDemandWindow>,
    max_chargers: Option<usize>,
}

impl Building {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        source_name: String,
        policy: Policy,
        power_model: PowerModel,
        vehicles: Vec<Vehicle>,
        tick_minutes: f64,
        grace_ticks: usize,
        needs_charge_mode: NeedsChargeMode,
        high_demand: Option<HighDemandWindow>,
        max_chargers: Option<usize>,
    ) -> Self {
        Self {
            name,
            source_name,
            scheduler: ChargeScheduler::new(policy),
            policy,
            power_model,
            vehicles,
            tick_minutes,
            grace_ticks,
            needs_charge_mode,
            high_demand,
            max_chargers,
        }
    }

    pub fn vehicle_names(&self) -> Vec<&str> {
        self.vehicles.iter().map(Vehicle::name).collect()
    }

    fn capacity(&self) -> usize {
        let charger_power = self.power_model.charger_power_kw();
        if charger_power <= 0.0 {
            return 0;
        }
        let raw = (self.power_model.available_kw() / charger_power).floor() as usize;
        match self.max_chargers {
            Some(cap) => raw.min(cap),
            None => raw,
        }
    }

    /// Runs tick `t` (tick-of-day, for fault/high-demand windows and trip timing) with
    /// the given consumption percentage, and returns the output row for this building.
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerInvariantViolation`] if the scheduler's result for this tick
    /// violates one of the runtime invariants every tick must satisfy (capacity,
    /// queue disjointness, absent-vehicle exclusion, battery bounds, or energy draw).
    pub fn tick(
        &mut self,
        t: usize,
        timestamp: String,
        consumption_pct: f64,
    ) -> Result<TickRow, SchedulerInvariantViolation> {
        self.power_model.update(t, consumption_pct);
        let capacity = self.capacity();
        let charger_power_kw = self.power_model.charger_power_kw();

        let outcome = self.scheduler.tick(
            t,
            &mut self.vehicles,
            capacity,
            charger_power_kw,
            self.tick_minutes,
            self.grace_ticks,
            self.needs_charge_mode,
            self.high_demand.as_ref(),
        );

        self.check_invariants(t, capacity, charger_power_kw, &outcome)?;

        let battery_ratios = self.vehicles.iter().map(Vehicle::battery_ratio).collect();
        let priorities = if self.policy == Policy::Priority {
            let tick_minutes = self.tick_minutes;
            Some(
                self.vehicles
                    .iter_mut()
                    .map(|v| v.priority(tick_minutes))
                    .collect(),
            )
        } else {
            None
        };

        Ok(TickRow {
            timestamp,
            available_power_kw: self.power_model.available_kw(),
            power_used_kw: outcome.power_used_kw,
            battery_ratios,
            priorities,
        })
    }

    /// Checks the five runtime invariants every tick must satisfy, returning a
    /// [`SchedulerInvariantViolation`] naming this building, the offending tick, and
    /// the queue contents on the first violation found.
    fn check_invariants(
        &self,
        t: usize,
        capacity: usize,
        charger_power_kw: f64,
        outcome: &TickOutcome,
    ) -> Result<(), SchedulerInvariantViolation> {
        let violation = |detail: String| SchedulerInvariantViolation {
            building: self.name.clone(),
            tick: t,
            detail,
        };

        if outcome.charging.len() > capacity {
            return Err(violation(format!(
                "charging set has {} vehicles but capacity is {capacity} (charging={:?})",
                outcome.charging.len(),
                outcome.charging
            )));
        }

        if outcome.waiting.iter().any(|w| outcome.charging.contains(w)) {
            return Err(violation(format!(
                "waiting and charging sets overlap (waiting={:?}, charging={:?})",
                outcome.waiting, outcome.charging
            )));
        }

        for (idx, vehicle) in self.vehicles.iter().enumerate() {
            if !vehicle.is_present() && (outcome.waiting.contains(&idx) || outcome.charging.contains(&idx)) {
                return Err(violation(format!(
                    "vehicle {idx} is absent but still queued (waiting={:?}, charging={:?})",
                    outcome.waiting, outcome.charging
                )));
            }
            if vehicle.battery_kwh() < 0.0 || vehicle.battery_kwh() > vehicle.max_battery_kwh() {
                return Err(violation(format!(
                    "vehicle {idx} battery {} kWh out of bounds [0, {}]",
                    vehicle.battery_kwh(),
                    vehicle.max_battery_kwh()
                )));
            }
        }

        let energy_used_kwh = outcome.power_used_kw * (self.tick_minutes / 60.0);
        let energy_bound_kwh =
            outcome.charging.len() as f64 * charger_power_kw * (self.tick_minutes / 60.0) + POWER_USED_EPSILON_KWH;
        if energy_used_kwh > energy_bound_kwh {
            return Err(violation(format!(
                "energy used {energy_used_kwh} kWh exceeds bound {energy_bound_kwh} kWh for {} charging vehicles at {charger_power_kw} kW",
                outcome.charging.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vehicle::{TripPlan, VehicleParams};

    fn test_vehicles() -> Vec<Vehicle> {
        (0..3)
            .map(|i| {
                let params = VehicleParams {
                    name: format!("V{i}"),
                    max_battery_kwh: 20.0,
                    efficiency_km_per_kwh: 5.0,
                    avg_speed_kmh: 40.0,
                    trip_plan: TripPlan::from_trips(vec![]),
                };
                Vehicle::new(params, 5.0, 0.0)
            })
            .collect()
    }

    #[test]
    fn capacity_derives_from_available_power_and_charger_rating() {
        let power_model = PowerModel::new(30.0, 10.0, 100.0, None);
        let mut building = Building::new(
            "B1".into(),
            "B1".into(),
            Policy::Fifo,
            power_model,
            test_vehicles(),
            15.0,
            999,
            NeedsChargeMode::DayTotal,
            None,
            None,
        );
        let row = building.tick(0, "t0".into(), 0.0).unwrap();
        assert_eq!(row.battery_ratios.len(), 3);
        assert!(row.available_power_kw > 0.0);
    }

    #[test]
    fn max_chargers_caps_capacity_below_power_derived_value() {
        let power_model = PowerModel::new(30.0, 10.0, 100.0, None);
        let mut building = Building::new(
            "B1".into(),
            "B1".into(),
            Policy::Fifo,
            power_model,
            test_vehicles(),
            15.0,
            999,
            NeedsChargeMode::DayTotal,
            None,
            Some(1),
        );
        let row = building.tick(0, "t0".into(), 0.0).unwrap();
        // available power would allow 3 chargers; max_chargers caps it to 1
        let charging_count = row
            .battery_ratios
            .iter()
            .filter(|&&r| (r - 7.5 / 20.0).abs() < 1e-9)
            .count();
        assert_eq!(charging_count, 1);
    }

    #[test]
    fn priority_rows_carry_priorities_other_policies_do_not() {
        let power_model = PowerModel::new(30.0, 10.0, 100.0, None);
        let mut building = Building::new(
            "B1".into(),
            "B1".into(),
            Policy::Priority,
            power_model,
            test_vehicles(),
            15.0,
            999,
            NeedsChargeMode::DayTotal,
            None,
            None,
        );
        let row = building.tick(0, "t0".into(), 0.0).unwrap();
        assert!(row.priorities.is_some());

        let power_model = PowerModel::new(30.0, 10.0, 100.0, None);
        let mut fifo = Building::new(
            "B2".into(),
            "B2".into(),
            Policy::Fifo,
            power_model,
            test_vehicles(),
            15.0,
            999,
            NeedsChargeMode::DayTotal,
            None,
            None,
        );
        let row = fifo.tick(0, "t0".into(), 0.0).unwrap();
        assert!(row.priorities.is_none());
    }

    #[test]
    fn invariant_violation_reports_building_and_tick() {
        let power_model = PowerModel::new(30.0, 10.0, 100.0, None);
        let mut building = Building::new(
            "B1".into(),
            "B1".into(),
            Policy::Fifo,
            power_model,
            test_vehicles(),
            15.0,
            999,
            NeedsChargeMode::DayTotal,
            None,
            None,
        );
        let outcome = crate::scheduler::TickOutcome {
            power_used_kw: 0.0,
            charging: vec![0, 1],
            waiting: vec![1],
        };
        let err = building.check_invariants(3, 5, 10.0, &outcome).unwrap_err();
        assert_eq!(err.building, "B1");
        assert_eq!(err.tick, 3);
        assert!(err.detail.contains("overlap"));
    }
}
