//! Flat key/value configuration, parsed as a restricted (table-free) TOML document.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::vehicle::NeedsChargeMode;

/// All recognized configuration keys, defaulted and validated as a single flat record.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct SimulationConfig {
    pub mins_por_ciclo: u32,
    pub seed: u64,

    pub simular_fifo: bool,
    pub simular_roundrobin: bool,
    pub simular_inteligente: bool,

    pub potencia_declarada: f64,
    pub potencia_cargadores: f64,
    pub potencia_min_cargadores: f64,
    pub escala_potencia_pct: f64,

    pub limitar_cargadores: bool,
    pub tope_de_cargadores: usize,

    pub hay_falla: bool,
    pub inicio_horario_falla: String,
    pub final_horario_falla: String,
    pub reduccion_en_falla: f64,

    pub cant_salidas: Option<u32>,
    pub min_salidas: u32,
    pub max_salidas: u32,
    pub hora_primera_salida: String,
    pub hora_ultimo_regreso: String,

    pub avg_bateria_max: f64,
    pub var_bateria_max: f64,
    pub avg_bateria_ini: f64,
    pub var_bateria_ini: f64,
    pub avg_rendimiento: f64,
    pub var_rendimiento: f64,
    pub velocidad_promedio: f64,

    pub tope_tiempo_de_manejo: u32,

    pub output_format: String,
    pub input_file: String,
    pub log_level: String,

    pub necesita_carga_modo: String,
    pub high_demand_slack: f64,

    pub hay_demanda_alta: bool,
    pub inicio_demanda_alta: String,
    pub final_demanda_alta: String,

    pub cant_vehiculos_por_edificio: u32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            mins_por_ciclo: 15,
            seed: 20,
            simular_fifo: true,
            simular_roundrobin: true,
            simular_inteligente: true,
            potencia_declarada: 30.0,
            potencia_cargadores: 10.0,
            potencia_min_cargadores: 2.0,
            escala_potencia_pct: 100.0,
            limitar_cargadores: false,
            tope_de_cargadores: 10,
            hay_falla: false,
            inicio_horario_falla: "0:00".to_string(),
            final_horario_falla: "0:00".to_string(),
            reduccion_en_falla: 50.0,
            cant_salidas: Some(2),
            min_salidas: 1,
            max_salidas: 3,
            hora_primera_salida: "6:00".to_string(),
            hora_ultimo_regreso: "22:00".to_string(),
            avg_bateria_max: 60.0,
            var_bateria_max: 5.0,
            avg_bateria_ini: 30.0,
            var_bateria_ini: 10.0,
            avg_rendimiento: 5.0,
            var_rendimiento: 0.5,
            velocidad_promedio: 40.0,
            tope_tiempo_de_manejo: 90,
            output_format: "csv".to_string(),
            input_file: "potencia_consumida.csv".to_string(),
            log_level: "info".to_string(),
            necesita_carga_modo: "day_total".to_string(),
            high_demand_slack: 0.1,
            hay_demanda_alta: false,
            inicio_demanda_alta: "17:00".to_string(),
            final_demanda_alta: "20:00".to_string(),
            cant_vehiculos_por_edificio: 10,
        }
    }
}

impl SimulationConfig {
    /// Loads configuration from `path`. A missing file falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file exists but fails to parse.
    pub fn from_file_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(_) => Ok(Self::default()),
        }
    }

    /// Parses configuration from a string containing flat `KEY = VALUE` lines, which is
    /// valid as a restricted (table-free) TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the content is not valid TOML for this schema.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("file", e.to_string()))
    }

    /// Parsed `NECESITA_CARGA_MODO`, defaulting to [`NeedsChargeMode::DayTotal`] for any
    /// unrecognized value (validation rejects unrecognized values before this is used).
    pub fn needs_charge_mode(&self) -> NeedsChargeMode {
        match self.necesita_carga_modo.as_str() {
            "next_trip" => NeedsChargeMode::NextTrip,
            _ => NeedsChargeMode::DayTotal,
        }
    }

    /// Validates every field, collecting all constraint violations rather than failing
    /// on the first one found.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.mins_por_ciclo == 0 {
            errors.push(ConfigError::new("MINS_POR_CICLO", "must be > 0"));
        }
        if self.potencia_declarada <= 0.0 {
            errors.push(ConfigError::new("POTENCIA_DECLARADA", "must be > 0"));
        }
        if self.potencia_cargadores <= 0.0 {
            errors.push(ConfigError::new("POTENCIA_CARGADORES", "must be > 0"));
        }
        if self.potencia_min_cargadores <= 0.0 {
            errors.push(ConfigError::new("POTENCIA_MIN_CARGADORES", "must be > 0"));
        }
        if self.limitar_cargadores && self.tope_de_cargadores == 0 {
            errors.push(ConfigError::new(
                "TOPE_DE_CARGADORES",
                "must be > 0 when LIMITAR_CARGADORES is true",
            ));
        }
        if self.min_salidas > self.max_salidas {
            errors.push(ConfigError::new("MIN_SALIDAS", "must be <= MAX_SALIDAS"));
        }
        if let Some(c) = self.cant_salidas
            && (c < self.min_salidas || c > self.max_salidas)
        {
            errors.push(ConfigError::new(
                "CANT_SALIDAS",
                "must fall within [MIN_SALIDAS, MAX_SALIDAS]",
            ));
        }
        if parse_hh_mm(&self.hora_primera_salida).is_none() {
            errors.push(ConfigError::new("HORA_PRIMERA_SALIDA", "must be H:MM"));
        }
        if parse_hh_mm(&self.hora_ultimo_regreso).is_none() {
            errors.push(ConfigError::new("HORA_ULTIMO_REGRESO", "must be H:MM"));
        }
        if self.avg_bateria_max <= 0.0 {
            errors.push(ConfigError::new("AVG_BATERIA_MAX", "must be > 0"));
        }
        if self.avg_rendimiento <= 0.0 {
            errors.push(ConfigError::new("AVG_RENDIMIENTO", "must be > 0"));
        }
        if self.velocidad_promedio <= 0.0 {
            errors.push(ConfigError::new("VELOCIDAD_PROMEDIO", "must be > 0"));
        }
        if !matches!(self.output_format.as_str(), "csv" | "tsv" | "xlsx") {
            errors.push(ConfigError::new(
                "OUTPUT_FORMAT",
                format!("must be one of csv, tsv, xlsx, got \"{}\"", self.output_format),
            ));
        }
        if !matches!(self.necesita_carga_modo.as_str(), "day_total" | "next_trip") {
            errors.push(ConfigError::new(
                "NECESITA_CARGA_MODO",
                format!(
                    "must be one of day_total, next_trip, got \"{}\"",
                    self.necesita_carga_modo
                ),
            ));
        }
        if self.hay_falla && parse_hh_mm(&self.inicio_horario_falla).is_none() {
            errors.push(ConfigError::new("INICIO_HORARIO_FALLA", "must be H:MM"));
        }
        if self.hay_falla && parse_hh_mm(&self.final_horario_falla).is_none() {
            errors.push(ConfigError::new("FINAL_HORARIO_FALLA", "must be H:MM"));
        }
        if self.hay_demanda_alta && parse_hh_mm(&self.inicio_demanda_alta).is_none() {
            errors.push(ConfigError::new("INICIO_DEMANDA_ALTA", "must be H:MM"));
        }
        if self.hay_demanda_alta && parse_hh_mm(&self.final_demanda_alta).is_none() {
            errors.push(ConfigError::new("FINAL_DEMANDA_ALTA", "must be H:MM"));
        }
        if self.cant_vehiculos_por_edificio == 0 {
            errors.push(ConfigError::new(
                "CANT_VEHICULOS_POR_EDIFICIO",
                "must be > 0",
            ));
        }

        errors
    }
}

fn parse_hh_mm(s: &str) -> Option<(u8, u8)> {
    let (h, m) = s.trim().split_once(':')?;
    let h: u8 = h.trim().parse().ok()?;
    let m: u8 = m.trim().parse().ok()?;
    if h > 23 || m > 59 { None } else { Some((h, m)) }
}
