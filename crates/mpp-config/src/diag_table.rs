//! The diagnostics table: output files and the variables bound to them.
//!
//! ```yaml
//! title: c96_run
//! base_date: 2000 1 1 0 0 0
//! diag_files:
//! - file_name: atmos_daily
//!   freq: 1 days
//!   time_units: hours
//!   unlimdim: time
//!   varlist:
//!   - module: atmos_mod
//!     var_name: temp
//!     reduction: average
//!     kind: r4
//! ```
//!
//! The table is parsed and checked only; nothing here writes output.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::debug;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::error::ConfigError;
use crate::yaml;

/// A unit of time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    /// Seconds.
    Seconds,
    /// Minutes.
    Minutes,
    /// Hours.
    Hours,
    /// Days.
    Days,
    /// Calendar months.
    Months,
    /// Calendar years.
    Years,
}

impl FromStr for TimeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().trim_end_matches('s') {
            "second" => Ok(Self::Seconds),
            "minute" => Ok(Self::Minutes),
            "hour" => Ok(Self::Hours),
            "day" => Ok(Self::Days),
            "month" => Ok(Self::Months),
            "year" => Ok(Self::Years),
            other => Err(format!("unknown time unit '{other}'")),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
            Self::Hours => "hours",
            Self::Days => "days",
            Self::Months => "months",
            Self::Years => "years",
        };
        f.write_str(s)
    }
}

/// Output cadence: every `count` `units`.
///
/// `count == 0` writes every time step; `count == -1` writes once at the
/// end of the run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Frequency {
    /// Number of units between writes.
    pub count: i32,
    /// The unit.
    pub units: TimeUnit,
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        let (Some(n), Some(u), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("expected 'N units', got '{s}'"));
        };
        let count: i32 = n.parse().map_err(|_| format!("'{n}' is not an integer"))?;
        if count < -1 {
            return Err(format!("count {count} is below -1"));
        }
        Ok(Self {
            count,
            units: u.parse()?,
        })
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.count, self.units)
    }
}

/// How samples are reduced over an output interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reduction {
    /// Instantaneous value.
    None,
    /// Time mean.
    Average,
    /// Minimum.
    Min,
    /// Maximum.
    Max,
    /// Root mean square.
    Rms,
    /// Mean of the given power.
    Pow(u32),
    /// Diurnal mean with the given number of samples per day.
    Diurnal(u32),
}

impl FromStr for Reduction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_lowercase();
        let counted = |prefix: &str| -> Option<Result<u32, String>> {
            let rest = s.strip_prefix(prefix)?;
            Some(match rest.parse::<u32>() {
                Ok(n) if n > 0 => Ok(n),
                _ => Err(format!("'{s}' needs a positive count after '{prefix}'")),
            })
        };
        match s.as_str() {
            "none" => return Ok(Self::None),
            "average" => return Ok(Self::Average),
            "min" => return Ok(Self::Min),
            "max" => return Ok(Self::Max),
            "rms" => return Ok(Self::Rms),
            _ => {}
        }
        if let Some(n) = counted("pow") {
            return n.map(Self::Pow);
        }
        if let Some(n) = counted("diurnal") {
            return n.map(Self::Diurnal);
        }
        Err(format!("unknown reduction '{s}'"))
    }
}

/// Precision of an output variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VarKind {
    /// 32-bit float.
    R4,
    /// 64-bit float.
    R8,
    /// 32-bit integer.
    I4,
    /// 64-bit integer.
    I8,
}

impl FromStr for VarKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "r4" => Ok(Self::R4),
            "r8" => Ok(Self::R8),
            "i4" => Ok(Self::I4),
            "i8" => Ok(Self::I8),
            other => Err(format!("unknown kind '{other}'")),
        }
    }
}

/// A variable bound to an output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagVar {
    /// Module registering the variable.
    pub module: String,
    /// Name as registered.
    pub var_name: String,
    /// Name in the file; defaults to `var_name`.
    pub output_name: String,
    /// Reduction over the output interval.
    pub reduction: Reduction,
    /// Stored precision.
    pub kind: VarKind,
}

/// One output file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagFile {
    /// File name without suffix.
    pub file_name: String,
    /// Write cadence.
    pub freq: Frequency,
    /// Units of the time axis.
    pub time_units: TimeUnit,
    /// Name of the unlimited dimension.
    pub unlimdim: String,
    /// Variables in the file.
    pub vars: Vec<DiagVar>,
}

/// A parsed diagnostics table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DiagTable {
    /// Experiment title.
    pub title: String,
    /// Reference date: year, month, day, hour, minute, second.
    pub base_date: [i32; 6],
    /// Output files.
    pub files: Vec<DiagFile>,
}

impl DiagTable {
    /// Parse from YAML text.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let doc = yaml::parse(text)?;
        let root = yaml::as_map(&doc, "document")?;
        let title = yaml::get_str(root, "title", "document")?;
        let base_date = base_date(yaml::get(root, "base_date", "document")?)?;

        let mut files: Vec<DiagFile> = Vec::new();
        for (n, item) in yaml::get_seq(root, "diag_files", "document")?.iter().enumerate() {
            let ctx = format!("diag_files[{n}]");
            let file = parse_file(yaml::as_map(item, &ctx)?, &ctx)?;
            if files.iter().any(|f| f.file_name == file.file_name) {
                return Err(ConfigError::invalid(
                    "file_name",
                    &ctx,
                    format!("'{}' appears twice", file.file_name),
                ));
            }
            files.push(file);
        }
        debug!("diag table '{title}': {} files", files.len());
        Ok(Self {
            title,
            base_date,
            files,
        })
    }

    /// Read and parse a YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_yaml_str(&yaml::read_file(path.as_ref())?)
    }

    /// The file named `name`.
    pub fn file(&self, name: &str) -> Option<&DiagFile> {
        self.files.iter().find(|f| f.file_name == name)
    }

    /// Every `(file, var)` binding for `module`.
    pub fn vars_for_module<'a>(
        &'a self,
        module: &'a str,
    ) -> impl Iterator<Item = (&'a DiagFile, &'a DiagVar)> + 'a {
        self.files
            .iter()
            .flat_map(|f| f.vars.iter().map(move |v| (f, v)))
            .filter(move |(_, v)| v.module == module)
    }
}

fn base_date(v: &Value) -> Result<[i32; 6], ConfigError> {
    let parts: Vec<String> = match v {
        Value::Sequence(items) => items.iter().filter_map(yaml::scalar).collect(),
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        _ => Vec::new(),
    };
    let bad = || ConfigError::invalid("base_date", "document", "expected six integers");
    let nums = parts
        .iter()
        .map(|p| p.parse::<i32>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| bad())?;
    <[i32; 6]>::try_from(nums).map_err(|_| bad())
}

fn parse_file(map: &Mapping, ctx: &str) -> Result<DiagFile, ConfigError> {
    let file_name = yaml::get_str(map, "file_name", ctx)?;
    let freq = parsed(map, "freq", ctx)?;
    let time_units = parsed(map, "time_units", ctx)?;
    let unlimdim = yaml::get_str(map, "unlimdim", ctx)?;
    let mut vars = Vec::new();
    for (n, item) in yaml::get_seq(map, "varlist", ctx)?.iter().enumerate() {
        let ctx = format!("{ctx}.varlist[{n}]");
        let v = yaml::as_map(item, &ctx)?;
        let var_name = yaml::get_str(v, "var_name", &ctx)?;
        vars.push(DiagVar {
            module: yaml::get_str(v, "module", &ctx)?,
            output_name: yaml::opt_str(v, "output_name", &ctx)?.unwrap_or_else(|| var_name.clone()),
            var_name,
            reduction: parsed(v, "reduction", &ctx)?,
            kind: parsed(v, "kind", &ctx)?,
        });
    }
    Ok(DiagFile {
        file_name,
        freq,
        time_units,
        unlimdim,
        vars,
    })
}

fn parsed<T: FromStr<Err = String>>(map: &Mapping, key: &'static str, ctx: &str) -> Result<T, ConfigError> {
    yaml::get_str(map, key, ctx)?
        .parse()
        .map_err(|reason: String| ConfigError::invalid(key, ctx, reason))
}
