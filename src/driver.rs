//! Reads the consumption table, builds one building per (declared building name,
//! enabled policy) pair, and advances the tick loop to completion.

use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::building::Building;
use crate::clock::Clock;
use crate::config::SimulationConfig;
use crate::error::{ConfigError, InputError, SimError};
use crate::io::{InputTable, OutputFormat, OutputWriter, read_table};
use crate::power_model::{FaultWindow, PowerModel};
use crate::random::RandomSource;
use crate::scheduler::{HighDemandWindow, Policy};
use crate::vehicle::{TripPlan, Vehicle, VehicleParams};

/// Vehicles and a power model for one building, constructed once and cloned per
/// enabled policy so every policy variant sees identical vehicle parameters, trip
/// plans, and initial batteries.
struct BuildingTemplate {
    name: String,
    power_model: PowerModel,
    vehicles: Vec<Vehicle>,
}

fn parse_tick_of_day(s: &str, mins_por_ciclo: u32) -> Option<usize> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u32 = h.trim().parse().ok()?;
    let m: u32 = m.trim().parse().ok()?;
    Some(((h * 60 + m) / mins_por_ciclo) as usize)
}

fn build_template(
    name: &str,
    cfg: &SimulationConfig,
    rng: &mut RandomSource,
) -> Result<BuildingTemplate, ConfigError> {
    let first_tick = parse_tick_of_day(&cfg.hora_primera_salida, cfg.mins_por_ciclo)
        .ok_or_else(|| ConfigError::new("HORA_PRIMERA_SALIDA", "must be H:MM"))?;
    let last_tick = parse_tick_of_day(&cfg.hora_ultimo_regreso, cfg.mins_por_ciclo)
        .ok_or_else(|| ConfigError::new("HORA_ULTIMO_REGRESO", "must be H:MM"))?;

    let mut vehicles = Vec::with_capacity(cfg.cant_vehiculos_por_edificio as usize);
    for i in 0..cfg.cant_vehiculos_por_edificio {
        let max_battery = rng.normal_truncated(cfg.avg_bateria_max, cfg.var_bateria_max).max(1.0);
        let initial_battery = rng
            .normal_truncated(cfg.avg_bateria_ini, cfg.var_bateria_ini)
            .min(max_battery);
        let efficiency = rng.normal_truncated(cfg.avg_rendimiento, cfg.var_rendimiento).max(0.1);

        let trip_count = cfg
            .cant_salidas
            .unwrap_or_else(|| rng.uniform_int(cfg.min_salidas as i64, cfg.max_salidas as i64) as u32);

        let trip_plan = TripPlan::generate(rng, first_tick, last_tick, trip_count as usize)?;

        let params = VehicleParams {
            name: format!("{name}_V{i}"),
            max_battery_kwh: max_battery,
            efficiency_km_per_kwh: efficiency,
            avg_speed_kmh: cfg.velocidad_promedio,
            trip_plan,
        };
        vehicles.push(Vehicle::new(params, initial_battery, cfg.high_demand_slack));
    }

    let fault = if cfg.hay_falla {
        Some(FaultWindow {
            start_tick_of_day: parse_tick_of_day(&cfg.inicio_horario_falla, cfg.mins_por_ciclo)
                .ok_or_else(|| ConfigError::new("INICIO_HORARIO_FALLA", "must be H:MM"))?,
            end_tick_of_day: parse_tick_of_day(&cfg.final_horario_falla, cfg.mins_por_ciclo)
                .ok_or_else(|| ConfigError::new("FINAL_HORARIO_FALLA", "must be H:MM"))?,
            reduction_pct: cfg.reduccion_en_falla,
            min_charger_power_kw: cfg.potencia_min_cargadores,
        })
    } else {
        None
    };

    let power_model = PowerModel::new(
        cfg.potencia_declarada,
        cfg.potencia_cargadores,
        cfg.escala_potencia_pct,
        fault,
    );

    Ok(BuildingTemplate {
        name: name.to_string(),
        power_model,
        vehicles,
    })
}

fn enabled_policies(cfg: &SimulationConfig) -> Vec<Policy> {
    let mut policies = Vec::new();
    if cfg.simular_fifo {
        policies.push(Policy::Fifo);
    }
    if cfg.simular_roundrobin {
        policies.push(Policy::RoundRobin);
    }
    if cfg.simular_inteligente {
        policies.push(Policy::Priority);
    }
    policies
}

/// Runs the full simulation described by `cfg` against the consumption table at
/// `input_path`, writing every output table under `out_dir`.
#[instrument(skip(cfg))]
pub fn run(cfg: &SimulationConfig, input_path: &std::path::Path, out_dir: &std::path::Path) -> Result<(), SimError> {
    let table: InputTable = read_table(input_path).map_err(SimError::Io)?;
    if table.buildings.is_empty() {
        return Err(SimError::Input(InputError::NoBuildingsConfigured));
    }

    let policies = enabled_policies(cfg);
    let grace_ticks = (cfg.tope_tiempo_de_manejo / cfg.mins_por_ciclo.max(1)) as usize;
    let needs_charge_mode = cfg.needs_charge_mode();
    let high_demand = if cfg.hay_demanda_alta {
        Some(HighDemandWindow {
            start_tick_of_day: parse_tick_of_day(&cfg.inicio_demanda_alta, cfg.mins_por_ciclo)
                .ok_or_else(|| SimError::Config(ConfigError::new("INICIO_DEMANDA_ALTA", "must be H:MM")))?,
            end_tick_of_day: parse_tick_of_day(&cfg.final_demanda_alta, cfg.mins_por_ciclo)
                .ok_or_else(|| SimError::Config(ConfigError::new("FINAL_DEMANDA_ALTA", "must be H:MM")))?,
        })
    } else {
        None
    };
    let max_chargers = cfg.limitar_cargadores.then_some(cfg.tope_de_cargadores);

    let mut buildings: Vec<Building> = Vec::with_capacity(table.buildings.len() * policies.len());

    for building_name in &table.buildings {
        // One RNG per building, shared by every policy's cloned template, so FIFO/RR/
        // Priority all see identical vehicle parameters and trip plans.
        let mut rng = RandomSource::new(cfg.seed);
        let template = build_template(building_name, cfg, &mut rng).map_err(SimError::Config)?;

        for &policy in &policies {
            buildings.push(Building::new(
                format!("{} {}", template.name, policy.label()),
                template.name.clone(),
                policy,
                template.power_model.clone(),
                template.vehicles.clone(),
                cfg.mins_por_ciclo as f64,
                grace_ticks,
                needs_charge_mode,
                high_demand.clone(),
                max_chargers,
            ));
        }
    }

    let start_date = NaiveDate::from_ymd_opt(2024, 1, 1).expect("valid hardcoded date");
    let mut clock = Clock::new(start_date);
    let mut writer = OutputWriter::new(
        out_dir,
        OutputFormat::parse(&cfg.output_format).unwrap_or(OutputFormat::Csv),
    );

    for (row_idx, row) in table.rows.iter().enumerate() {
        clock.set_hh_mm(row_idx, &row.tiempo).map_err(SimError::Input)?;
        let timestamp = clock.format_current();
        let tick_of_day = parse_tick_of_day(&row.tiempo, cfg.mins_por_ciclo).ok_or_else(|| {
            SimError::Input(InputError::BadTimeFormat {
                row: row_idx,
                value: row.tiempo.clone(),
            })
        })?;

        for building in &mut buildings {
            let col_idx = table
                .buildings
                .iter()
                .position(|b| b == &building.source_name)
                .ok_or_else(|| InputError::MissingConsumption {
                    row: row_idx,
                    building: building.source_name.clone(),
                })
                .map_err(SimError::Input)?;
            let raw = row.values.get(col_idx).ok_or_else(|| InputError::MissingConsumption {
                row: row_idx,
                building: building.source_name.clone(),
            })
            .map_err(SimError::Input)?;
            let consumption_pct: f64 = raw.trim().parse().map_err(|_| {
                SimError::Input(InputError::BadConsumptionValue {
                    row: row_idx,
                    building: building.source_name.clone(),
                    value: raw.clone(),
                })
            })?;

            let vehicle_names = building.vehicle_names();
            let tick_row = building
                .tick(tick_of_day, timestamp.clone(), consumption_pct)
                .map_err(SimError::Invariant)?;
            debug!(building = %building.name, tick = tick_of_day, power_used = tick_row.power_used_kw, "tick processed");

            if let Some(priorities) = &tick_row.priorities {
                writer.push_priority_row(
                    &format!("Prioridades {}", building.name),
                    &vehicle_names,
                    &timestamp,
                    priorities,
                );
            }
            writer.push_building_row(&building.name, &vehicle_names, &tick_row);
        }
    }

    writer.flush().map_err(SimError::Io)?;
    for building in &buildings {
        info!(building = %building.name, rows = table.rows.len(), "building simulation complete");
    }
    Ok(())
}
