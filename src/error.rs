//! Domain error types shared across the configuration loader, table I/O, and scheduler.

use std::fmt;

use thiserror::Error;

/// Top-level error returned by configuration loading, I/O, and the simulation driver.
///
/// Each variant carries the structured context a caller needs to report the failure
/// without re-parsing a message string; the CLI entry point matches on variant to
/// pick a process exit code.
#[derive(Debug, Error)]
pub enum SimError {
    /// A configuration value failed validation or the file could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The consumption table was malformed or missing required data.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// An invariant the scheduler is supposed to maintain was violated.
    #[error("scheduler invariant violated: {0}")]
    Invariant(#[from] SchedulerInvariantViolation),

    /// Reading or writing a table failed at the filesystem/format layer.
    #[error("I/O error: {0}")]
    Io(#[from] IoError),
}

impl SimError {
    /// Process exit code this error should map to.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Input(_) => 3,
            Self::Invariant(_) => 4,
            Self::Io(_) => 5,
        }
    }
}

/// A single configuration field that failed validation, or a file-level parse failure.
#[derive(Debug, Clone)]
pub struct ConfigError {
    /// Name of the offending key, or a pseudo-field like `"file"` for parse errors.
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} — {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// A problem with the consumption input table.
#[derive(Debug, Clone)]
pub enum InputError {
    /// A `Tiempo` cell did not parse as `H:MM` or `HH:MM`.
    BadTimeFormat { row: usize, value: String },
    /// The header row had no building columns after `Tiempo`.
    NoBuildingsConfigured,
    /// A declared building column was absent from a data row.
    MissingConsumption { row: usize, building: String },
    /// A consumption cell did not parse as a number.
    BadConsumptionValue { row: usize, building: String, value: String },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadTimeFormat { row, value } => {
                write!(f, "row {row}: \"{value}\" is not a valid H:MM timestamp")
            }
            Self::NoBuildingsConfigured => {
                write!(f, "input header declares no building columns after \"Tiempo\"")
            }
            Self::MissingConsumption { row, building } => {
                write!(f, "row {row}: missing consumption value for building \"{building}\"")
            }
            Self::BadConsumptionValue { row, building, value } => {
                write!(
                    f,
                    "row {row}: consumption \"{value}\" for building \"{building}\" is not numeric"
                )
            }
        }
    }
}

impl std::error::Error for InputError {}

/// A scheduler invariant that should never be violated was violated; indicates a bug.
#[derive(Debug, Clone)]
pub struct SchedulerInvariantViolation {
    pub building: String,
    pub tick: usize,
    pub detail: String,
}

impl fmt::Display for SchedulerInvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "building \"{}\" at tick {}: {}",
            self.building, self.tick, self.detail
        )
    }
}

impl std::error::Error for SchedulerInvariantViolation {}

/// A filesystem or table-format failure.
#[derive(Debug)]
pub struct IoError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\": {}", self.path, self.message)
    }
}

impl std::error::Error for IoError {}

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        Self {
            path: String::new(),
            message: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_variant_maps_to_a_distinct_exit_code() {
        let config = SimError::Config(ConfigError::new("FIELD", "bad"));
        let input = SimError::Input(InputError::NoBuildingsConfigured);
        let invariant = SimError::Invariant(SchedulerInvariantViolation {
            building: "B1".to_string(),
            tick: 4,
            detail: "charging exceeds capacity".to_string(),
        });
        let io = SimError::Io(IoError {
            path: "out.csv".to_string(),
            message: "permission denied".to_string(),
        });

        assert_eq!(config.exit_code(), 2);
        assert_eq!(input.exit_code(), 3);
        assert_eq!(invariant.exit_code(), 4);
        assert_eq!(io.exit_code(), 5);
    }

    #[test]
    fn invariant_violation_display_names_building_and_tick() {
        let err = SchedulerInvariantViolation {
            building: "B1 FIFO".to_string(),
            tick: 12,
            detail: "waiting and charging sets overlap".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("B1 FIFO"));
        assert!(message.contains("12"));
        assert!(message.contains("overlap"));
    }
}
