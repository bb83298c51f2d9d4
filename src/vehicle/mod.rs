//! Vehicle state: battery, trip schedule, and the `needs_charge`/`priority` model
//! consumed by the charge scheduler.

pub mod trip_plan;

pub use trip_plan::TripPlan;

/// Which rule decides whether a parked vehicle currently needs charging.
///
/// The source model carries two coexisting definitions. This implementation treats
/// [`NeedsChargeMode::DayTotal`] as the default and exposes [`NeedsChargeMode::NextTrip`]
/// only as a configuration toggle (`NECESITA_CARGA_MODO`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NeedsChargeMode {
    /// `battery < day_total_need * max_battery`.
    DayTotal,
    /// `battery < energy needed for the vehicle's next trip`.
    NextTrip,
}

/// Parameters fixed for a vehicle's whole lifetime.
#[derive(Debug, Clone)]
pub struct VehicleParams {
    pub name: String,
    pub max_battery_kwh: f64,
    pub efficiency_km_per_kwh: f64,
    pub avg_speed_kmh: f64,
    pub trip_plan: TripPlan,
}

/// A single vehicle belonging to exactly one building.
///
/// Vehicles are mutated only by the scheduler that owns them; they hold no reference
/// back to their building. [`Vehicle::charge`] returns the energy actually absorbed so
/// the caller can accumulate it into the building's own counter, avoiding a cyclic
/// ownership between `Vehicle` and `Building`.
#[derive(Debug, Clone)]
pub struct Vehicle {
    params: VehicleParams,
    battery_kwh: f64,
    next_trip_index: usize,
    present: bool,
    needs_charge: bool,
    time_waiting_ticks: u32,
    day_total_need: Option<f64>,
    high_demand_slack: f64,
}

impl Vehicle {
    pub fn new(params: VehicleParams, initial_battery_kwh: f64, high_demand_slack: f64) -> Self {
        Self {
            battery_kwh: initial_battery_kwh.clamp(0.0, params.max_battery_kwh),
            params,
            next_trip_index: 0,
            present: true,
            needs_charge: false,
            time_waiting_ticks: 0,
            day_total_need: None,
            high_demand_slack,
        }
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn battery_kwh(&self) -> f64 {
        self.battery_kwh
    }

    pub fn max_battery_kwh(&self) -> f64 {
        self.params.max_battery_kwh
    }

    pub fn battery_ratio(&self) -> f64 {
        self.battery_kwh / self.params.max_battery_kwh
    }

    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn is_full(&self) -> bool {
        self.battery_kwh >= self.params.max_battery_kwh
    }

    pub fn needs_charge(&self) -> bool {
        self.needs_charge
    }

    pub fn time_waiting_ticks(&self) -> u32 {
        self.time_waiting_ticks
    }

    pub fn trip_plan(&self) -> &TripPlan {
        &self.params.trip_plan
    }

    /// Fraction of a full battery required to cover every trip in the day's plan, plus
    /// the configured high-demand slack. Memoized after first computation.
    pub fn day_total_need(&mut self, tick_minutes: f64) -> f64 {
        if let Some(cached) = self.day_total_need {
            return cached;
        }
        let total_kwh = self.params.trip_plan.total_energy_kwh(
            self.params.efficiency_km_per_kwh,
            self.params.avg_speed_kmh,
            tick_minutes,
        );
        let need = total_kwh / self.params.max_battery_kwh + self.high_demand_slack;
        self.day_total_need = Some(need);
        need
    }

    /// Urgency score used by the priority policy: higher means more urgent.
    pub fn priority(&mut self, tick_minutes: f64) -> f64 {
        self.day_total_need(tick_minutes) - self.battery_ratio()
    }

    /// Recomputes `present`/`needs_charge` for tick `t` and advances the trip cursor
    /// when `t` crosses the current trip's arrival tick.
    pub fn step_status(
        &mut self,
        t: usize,
        tick_minutes: f64,
        grace_ticks: usize,
        mode: NeedsChargeMode,
    ) {
        self.needs_charge = match mode {
            NeedsChargeMode::DayTotal => {
                self.battery_kwh < self.day_total_need(tick_minutes) * self.params.max_battery_kwh
            }
            NeedsChargeMode::NextTrip => {
                let next_need = self.params.trip_plan.trip_energy_kwh(
                    self.next_trip_index,
                    self.params.efficiency_km_per_kwh,
                    self.params.avg_speed_kmh,
                    tick_minutes,
                );
                self.battery_kwh < next_need
            }
        };

        let driving = self
            .params
            .trip_plan
            .is_driving_at(self.next_trip_index, t, grace_ticks);

        self.present = !driving;

        if let Some(&(_, arrival)) = self.params.trip_plan.trips().get(self.next_trip_index)
            && t >= arrival
            && !self.params.trip_plan.is_empty()
        {
            self.next_trip_index = (self.next_trip_index + 1) % self.params.trip_plan.len();
        }

        if self.present {
            self.time_waiting_ticks += 1;
        } else {
            self.time_waiting_ticks = 0;
        }
    }

    /// Consumes battery for one tick of driving, clamped at zero.
    pub fn drive_one_tick(&mut self, tick_minutes: f64) {
        let hours = tick_minutes / 60.0;
        let distance_km = hours * self.params.avg_speed_kmh;
        let consumed = distance_km / self.params.efficiency_km_per_kwh;
        self.battery_kwh = (self.battery_kwh - consumed).max(0.0);
    }

    /// Adds at most `energy_kwh` to the battery, clamped to capacity, and returns the
    /// energy actually absorbed. Resets the waiting-time counter.
    pub fn charge(&mut self, energy_kwh: f64) -> f64 {
        let before = self.battery_kwh;
        self.battery_kwh = (self.battery_kwh + energy_kwh).min(self.params.max_battery_kwh);
        self.time_waiting_ticks = 0;
        self.battery_kwh - before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vehicle_with_trip(dep: usize, arr: usize) -> Vehicle {
        let params = VehicleParams {
            name: "V1".into(),
            max_battery_kwh: 20.0,
            efficiency_km_per_kwh: 5.0,
            avg_speed_kmh: 40.0,
            trip_plan: TripPlan::from_trips(vec![(dep, arr)]),
        };
        Vehicle::new(params, 10.0, 0.0)
    }

    #[test]
    fn charge_clamps_to_max_and_returns_absorbed_delta() {
        let mut v = vehicle_with_trip(100, 110);
        let absorbed = v.charge(5.0);
        assert_eq!(absorbed, 5.0);
        assert_eq!(v.battery_kwh(), 15.0);

        let absorbed = v.charge(100.0);
        assert_eq!(absorbed, 5.0);
        assert_eq!(v.battery_kwh(), 20.0);
        assert!(v.is_full());
    }

    #[test]
    fn drive_one_tick_never_goes_negative() {
        let mut v = vehicle_with_trip(0, 100);
        v.battery_kwh = 0.1;
        v.drive_one_tick(15.0);
        assert_eq!(v.battery_kwh(), 0.0);
    }

    #[test]
    fn step_status_marks_driving_absent() {
        let mut v = vehicle_with_trip(10, 12);
        v.step_status(9, 15.0, 4, NeedsChargeMode::DayTotal);
        assert!(v.is_present());
        v.step_status(10, 15.0, 4, NeedsChargeMode::DayTotal);
        assert!(!v.is_present());
        v.step_status(11, 15.0, 4, NeedsChargeMode::DayTotal);
        assert!(!v.is_present());
    }

    #[test]
    fn trip_cursor_advances_past_arrival() {
        let params = VehicleParams {
            name: "V1".into(),
            max_battery_kwh: 20.0,
            efficiency_km_per_kwh: 5.0,
            avg_speed_kmh: 40.0,
            trip_plan: TripPlan::from_trips(vec![(10, 12), (20, 22)]),
        };
        let mut v = Vehicle::new(params, 10.0, 0.0);
        v.step_status(12, 15.0, 4, NeedsChargeMode::DayTotal);
        assert_eq!(v.next_trip_index, 1);
        v.step_status(13, 15.0, 4, NeedsChargeMode::DayTotal);
        assert!(v.is_present());
    }

    #[test]
    fn day_total_need_is_memoized() {
        let mut v = vehicle_with_trip(0, 4);
        let first = v.day_total_need(15.0);
        v.battery_kwh = 0.0; // would change the result if recomputed from scratch incorrectly
        let second = v.day_total_need(15.0);
        assert_eq!(first, second);
    }
}
