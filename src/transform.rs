//! Turning a [`ColumnHeader`] into a single column name.
//!
//! Two built-in strategies are provided: the friendly form produced by
//! [`FriendlyTransform`] (e.g. `Temp/Avg[°C]`) and the SQL-safe form produced
//! by [`sql_name`] (e.g. `temp_avg`). [`ColumnTransform`] selects between
//! them or wraps a caller supplied function.

use crate::error::ValidationError;
use crate::models::ColumnHeader;
use crate::validate;
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::warn;

/// Shorter versions of common units, used by [`FriendlyTransform`]
pub const SHORTER_UNITS: &[(&str, &str)] = &[
    ("meters/second", "m/s"),
    ("Deg C", "°C"),
    ("oC", "°C"),
    ("Volts", "V"),
    ("m^3/m^3", "m³/m³"),
    ("W/m^2", "W/m²"),
    ("Watts/meter^2", "W/m²"),
    ("nSec", "ns"),
    ("uSec", "μs"),
    ("hours", "hr"),
    ("micrometer", "μm"),
    ("degrees", "°"),
    ("Deg", "°"),
    ("unitless", ""),
];

/// [`SHORTER_UNITS`] as an owned lookup table
pub fn default_short_units() -> HashMap<String, String> {
    SHORTER_UNITS
        .iter()
        .map(|(long, short)| ((*long).to_string(), (*short).to_string()))
        .collect()
}

/// Characters that delimit the parts of a friendly name
const RESERVED_NAME_CHARS: &[char] = &['/', '[', ']'];

static SQL_INVALID_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z_0-9]+").expect("Invalid SQL character regex"));
static SQL_UNDERSCORE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{2,}").expect("Invalid underscore regex"));

/// Case-insensitive `ends_with`
fn ends_with_ignore_case(haystack: &str, suffix: &str) -> bool {
    haystack.to_lowercase().ends_with(&suffix.to_lowercase())
}

/// True if `name` already ends with `prc`, optionally followed by an index
/// suffix in parentheses (`Temp_Avg`, `Temp_Avg(2)`).
fn name_ends_with_prc(name: &str, prc: &str) -> bool {
    if ends_with_ignore_case(name, prc) {
        return true;
    }
    let Some(inner) = name.strip_suffix(')') else {
        return false;
    };
    // the group may open at any '(' after the last ')'
    let group_start = inner.rfind(')').map_or(0, |close| close + 1);
    inner[group_start..]
        .match_indices('(')
        .any(|(open, _)| ends_with_ignore_case(&inner[..group_start + open], prc))
}

/// The trimmed name, with `sep` and the data process appended unless the
/// name already carries it.
fn name_with_prc(col: &ColumnHeader, sep: &str) -> String {
    let name = col.name.trim();
    let prc = col.prc.trim();
    if !prc.is_empty() && !name_ends_with_prc(name, prc) {
        format!("{name}{sep}{prc}")
    } else {
        name.to_string()
    }
}

/// The default, slightly opinionated column name transformation.
///
/// - whitespace is trimmed from all fields,
/// - the data process is appended to the name with a slash, unless the name
///   already ends with it,
/// - the unit is shortened via the lookup table and appended in square
///   brackets, unless it is empty (or shortens to nothing) or it is the `TS`
///   or `RN` marker on the `TIMESTAMP` or `RECORD` column.
///
/// With `strict`, names containing `/`, `[` or `]` are rejected and fields
/// failing [`validate`](crate::validate::validate) are logged as warnings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendlyTransform {
    pub short_units: HashMap<String, String>,
    pub strict: bool,
}

impl Default for FriendlyTransform {
    fn default() -> Self {
        Self {
            short_units: default_short_units(),
            strict: true,
        }
    }
}

impl FriendlyTransform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the unit lookup table
    pub fn with_short_units(mut self, short_units: HashMap<String, String>) -> Self {
        self.short_units = short_units;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn transform(&self, col: &ColumnHeader) -> Result<String, ValidationError> {
        if self.strict {
            if col.name.contains(RESERVED_NAME_CHARS) {
                return Err(ValidationError::ReservedCharacter {
                    name: col.name.clone(),
                });
            }
            let report = validate::validate(col, false)?;
            if !report.is_empty() {
                warn!("{}", report);
            }
        }

        let mut out = name_with_prc(col, "/");
        let name = col.name.trim();
        let unit = col.unit.trim();
        let structural = (name == "TIMESTAMP" && unit == "TS") || (name == "RECORD" && unit == "RN");
        if !unit.is_empty() && !structural {
            let short = self
                .short_units
                .get(unit)
                .map(String::as_str)
                .unwrap_or(unit)
                .trim();
            if !short.is_empty() {
                out.push('[');
                out.push_str(short);
                out.push(']');
            }
        }
        Ok(out)
    }
}

/// Friendly name with the default table and strict checks.
///
/// Kept short because it is the usual way to label columns:
/// `header.columns.iter().map(short_name)`.
pub fn short_name(col: &ColumnHeader) -> Result<String, ValidationError> {
    FriendlyTransform::default().transform(col)
}

/// A column name suitable for SQL.
///
/// Appends the data process with an underscore (unless the name already ends
/// with it), turns every run of characters other than ASCII letters, digits
/// and underscore into a single underscore, collapses repeated underscores,
/// trims them from both ends and lowercases the result. Units are dropped.
///
/// Distinct headers can map to the same name: `Test_1`/`Volts`/`Smp` and
/// `Test(1)`//`Smp` both become `test_1_smp`. Check the results for
/// duplicates before using them as column names.
pub fn sql_name(col: &ColumnHeader) -> String {
    let joined = name_with_prc(col, "_");
    let replaced = SQL_INVALID_RUN.replace_all(&joined, "_");
    let collapsed = SQL_UNDERSCORE_RUN.replace_all(&replaced, "_");
    collapsed.trim_matches('_').to_lowercase()
}

/// Caller supplied transformation
pub type CustomTransform = Arc<dyn Fn(&ColumnHeader) -> String + Send + Sync>;

/// Strategy used to label columns
#[derive(Clone)]
pub enum ColumnTransform {
    Friendly(FriendlyTransform),
    Sql,
    Custom(CustomTransform),
}

impl Default for ColumnTransform {
    fn default() -> Self {
        ColumnTransform::Friendly(FriendlyTransform::default())
    }
}

impl fmt::Debug for ColumnTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnTransform::Friendly(t) => f.debug_tuple("Friendly").field(t).finish(),
            ColumnTransform::Sql => write!(f, "Sql"),
            ColumnTransform::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl ColumnTransform {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&ColumnHeader) -> String + Send + Sync + 'static,
    {
        ColumnTransform::Custom(Arc::new(f))
    }

    pub fn apply(&self, col: &ColumnHeader) -> Result<String, ValidationError> {
        match self {
            ColumnTransform::Friendly(t) => t.transform(col),
            ColumnTransform::Sql => Ok(sql_name(col)),
            ColumnTransform::Custom(f) => Ok(f(col)),
        }
    }
}
