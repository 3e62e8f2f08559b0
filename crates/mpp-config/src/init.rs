//! Environment handed to the library at initialization.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Calendar used for model time.
///
/// Integer values match the native calendar codes and cross the C
/// boundary unchanged.
#[repr(i32)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarType {
    /// Twelve 30-day months.
    ThirtyDayMonths = 1,
    /// Julian calendar.
    Julian = 2,
    /// Gregorian calendar.
    Gregorian = 3,
    /// 365-day years.
    #[default]
    NoLeap = 4,
}

impl FromStr for CalendarType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "thirty_day_months" | "thirty_day" | "360_day" => Ok(Self::ThirtyDayMonths),
            "julian" => Ok(Self::Julian),
            "gregorian" => Ok(Self::Gregorian),
            "noleap" | "no_leap" | "365_day" => Ok(Self::NoLeap),
            other => Err(ConfigError::invalid(
                "calendar",
                "init",
                format!("unknown calendar '{other}'"),
            )),
        }
    }
}

impl TryFrom<i32> for CalendarType {
    type Error = ConfigError;

    fn try_from(v: i32) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(Self::ThirtyDayMonths),
            2 => Ok(Self::Julian),
            3 => Ok(Self::Gregorian),
            4 => Ok(Self::NoLeap),
            _ => Err(ConfigError::invalid(
                "calendar",
                "init",
                format!("calendar code {v} is not 1..=4"),
            )),
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::ThirtyDayMonths => "thirty_day_months",
            Self::Julian => "julian",
            Self::Gregorian => "gregorian",
            Self::NoLeap => "noleap",
        };
        f.write_str(s)
    }
}

/// Initialization settings.
///
/// Every field is optional; `InitConfig::default()` is a valid
/// configuration.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InitConfig {
    /// Namelist file to read instead of the default `input.nml`.
    pub alt_input_nml_path: Option<PathBuf>,
    /// Communicator handle supplied by the host. Opaque here.
    pub comm_handle: Option<i32>,
    /// Calendar. Default: [`CalendarType::NoLeap`].
    pub calendar: CalendarType,
}

impl InitConfig {
    /// Parse from YAML text. Unknown keys are rejected.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Check that a given namelist path exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(p) = &self.alt_input_nml_path {
            if !Path::new(p).is_file() {
                return Err(ConfigError::invalid(
                    "alt_input_nml_path",
                    "init",
                    format!("{} is not a file", p.display()),
                ));
            }
        }
        Ok(())
    }
}
