//! Per-tick computation of a building's available charging power.

/// An optional daily fault window during which declared power and charger power drop.
#[derive(Debug, Clone)]
pub struct FaultWindow {
    pub start_tick_of_day: usize,
    pub end_tick_of_day: usize,
    pub reduction_pct: f64,
    pub min_charger_power_kw: f64,
}

impl FaultWindow {
    /// Whether tick-of-day `t` falls inside the window, allowing the window to cross
    /// midnight (`start > end`).
    fn contains(&self, t: usize) -> bool {
        if self.start_tick_of_day <= self.end_tick_of_day {
            (self.start_tick_of_day..=self.end_tick_of_day).contains(&t)
        } else {
            t >= self.start_tick_of_day || t <= self.end_tick_of_day
        }
    }
}

/// Computes `available_power` and the charger rating in effect for the current tick.
#[derive(Debug, Clone)]
pub struct PowerModel {
    declared_baseline_kw: f64,
    charger_power_baseline_kw: f64,
    scale_factor_pct: f64,
    fault: Option<FaultWindow>,
    declared_kw: f64,
    charger_power_kw: f64,
    available_kw: f64,
}

impl PowerModel {
    pub fn new(
        declared_kw: f64,
        charger_power_kw: f64,
        scale_factor_pct: f64,
        fault: Option<FaultWindow>,
    ) -> Self {
        Self {
            declared_baseline_kw: declared_kw,
            charger_power_baseline_kw: charger_power_kw,
            scale_factor_pct,
            fault,
            declared_kw,
            charger_power_kw,
            available_kw: 0.0,
        }
    }

    pub fn charger_power_kw(&self) -> f64 {
        self.charger_power_kw
    }

    pub fn available_kw(&self) -> f64 {
        self.available_kw
    }

    /// Recomputes `available_kw`/`charger_power_kw` for tick-of-day `t` given the
    /// current consumption percentage `consumption_pct` (0-100 or greater).
    pub fn update(&mut self, t: usize, consumption_pct: f64) {
        match &self.fault {
            Some(fault) if fault.contains(t) => {
                self.declared_kw = self.declared_baseline_kw * fault.reduction_pct / 100.0;
                self.charger_power_kw = fault.min_charger_power_kw;
            }
            _ => {
                self.declared_kw = self.declared_baseline_kw;
                self.charger_power_kw = self.charger_power_baseline_kw;
            }
        }

        let avail_frac = (1.0 - consumption_pct / 100.0) * (self.scale_factor_pct / 100.0);
        self.available_kw = (self.declared_kw * avail_frac).max(0.0);
    }
}
