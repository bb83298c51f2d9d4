//! The per-building charge scheduler: three policy variants sharing one tick driver.
//!
//! Modeled as a closed set of tagged variants (mirroring how this codebase models
//! closed device-model choices elsewhere) rather than trait objects, since the set of
//! policies is fixed and known at compile time.

mod fifo;
mod priority;
mod round_robin;

use tracing::{debug, instrument};

use crate::vehicle::{NeedsChargeMode, Vehicle};

/// Selects which admission policy a [`ChargeScheduler`] runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    Fifo,
    RoundRobin,
    Priority,
}

impl Policy {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fifo => "FIFO",
            Self::RoundRobin => "RoundRobin",
            Self::Priority => "Priority",
        }
    }
}

/// A window of tick-of-day values during which vehicles that already hold enough
/// charge for the day are skipped for admission, easing pressure during peak demand.
#[derive(Debug, Clone)]
pub struct HighDemandWindow {
    pub start_tick_of_day: usize,
    pub end_tick_of_day: usize,
}

impl HighDemandWindow {
    fn contains(&self, t: usize) -> bool {
        if self.start_tick_of_day <= self.end_tick_of_day {
            (self.start_tick_of_day..=self.end_tick_of_day).contains(&t)
        } else {
            t >= self.start_tick_of_day || t <= self.end_tick_of_day
        }
    }
}

/// Outcome of a single scheduler tick, used by the building runner to build an output
/// row without re-deriving state from the vehicle slice.
#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub power_used_kw: f64,
    pub charging: Vec<usize>,
    pub waiting: Vec<usize>,
}

/// Drives vehicle status transitions, admission, capacity-bound charging, and eviction
/// for one building, for one of the three policy variants.
pub struct ChargeScheduler {
    policy: Policy,
    waiting: Vec<usize>,
    charging: Vec<usize>,
    last_served_index: Option<usize>,
}

impl ChargeScheduler {
    pub fn new(policy: Policy) -> Self {
        Self {
            policy,
            waiting: Vec::new(),
            charging: Vec::new(),
            last_served_index: None,
        }
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn charging(&self) -> &[usize] {
        &self.charging
    }

    pub fn waiting(&self) -> &[usize] {
        &self.waiting
    }

    /// Runs one tick's worth of status updates, admission, charging, and eviction.
    ///
    /// `capacity` must already reflect `available_power / charger_power`, capped by any
    /// enabled charger-count limit; that derivation belongs to the caller (the building
    /// runner), since it also depends on the power model, which this scheduler does not
    /// own.
    #[allow(clippy::too_many_arguments)]
    #[instrument(skip(self, vehicles, high_demand), fields(policy = self.policy.label()))]
    pub fn tick(
        &mut self,
        t: usize,
        vehicles: &mut [Vehicle],
        capacity: usize,
        charger_power_kw: f64,
        tick_minutes: f64,
        grace_ticks: usize,
        needs_charge_mode: NeedsChargeMode,
        high_demand: Option<&HighDemandWindow>,
    ) -> TickOutcome {
        for idx in 0..vehicles.len() {
            vehicles[idx].step_status(t, tick_minutes, grace_ticks, needs_charge_mode);
            if !vehicles[idx].is_present() {
                self.waiting.retain(|&w| w != idx);
                self.charging.retain(|&c| c != idx);
                vehicles[idx].drive_one_tick(tick_minutes);
            }
        }

        let high_demand_active = high_demand.is_some_and(|w| w.contains(t));
        let mut to_consider: Vec<usize> = (0..vehicles.len())
            .filter(|&i| vehicles[i].is_present() && !vehicles[i].is_full())
            .collect();
        to_consider.sort_by_key(|&i| std::cmp::Reverse(vehicles[i].needs_charge()));

        for idx in to_consider {
            if high_demand_active {
                let need = vehicles[idx].day_total_need(tick_minutes);
                if vehicles[idx].battery_ratio() >= need {
                    continue;
                }
            }
            match self.policy {
                Policy::Fifo => fifo::admit(&mut self.waiting, &self.charging, idx),
                Policy::RoundRobin => {}
                Policy::Priority => {
                    priority::admit(&mut self.waiting, &self.charging, idx, vehicles, tick_minutes)
                }
            }
        }

        match self.policy {
            Policy::Fifo => fifo::refill_charging(&mut self.waiting, &mut self.charging, capacity),
            Policy::RoundRobin => {
                self.last_served_index = round_robin::refill_charging(
                    &mut self.charging,
                    vehicles,
                    capacity,
                    self.last_served_index,
                );
            }
            Policy::Priority => priority::refill_charging(&mut self.waiting, &mut self.charging, capacity),
        }
        debug!(
            charging = self.charging.len(),
            waiting = self.waiting.len(),
            capacity,
            "admission settled for tick"
        );

        let quantum_kwh = charger_power_kw * tick_minutes / 60.0;
        let mut power_used_kw = 0.0;
        for &idx in &self.charging {
            power_used_kw += vehicles[idx].charge(quantum_kwh);
        }
        // convert absorbed kWh this tick back to an average kW figure for the output row
        if tick_minutes > 0.0 {
            power_used_kw = power_used_kw / (tick_minutes / 60.0);
        }

        match self.policy {
            Policy::Fifo => fifo::evict(&mut self.charging, vehicles, capacity),
            Policy::RoundRobin => {}
            Policy::Priority => priority::evict(&mut self.charging),
        }
        debug!(charging = self.charging.len(), power_used_kw, "eviction settled for tick");

        TickOutcome {
            power_used_kw,
            charging: self.charging.clone(),
            waiting: self.waiting.clone(),
        }
    }
}
