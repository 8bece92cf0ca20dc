//! Configuration for reading TOA5 files into data frames.
//!
//! Defaults match the usual way of reading a TOA5 file: unique column
//! names, friendly column labels with strict checks, `NAN` as the missing
//! value marker and the `TIMESTAMP` column parsed as date-time.

use crate::transform::{ColumnTransform, FriendlyTransform, default_short_units};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Missing value marker written by the loggers
pub const TOA5_MISSING_VALUE: &str = "NAN";

/// Built-in column naming styles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameStyle {
    /// `Temp/Avg[°C]`
    #[default]
    Friendly,
    /// `temp_avg`
    Sql,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadConfig {
    /// Accept repeated names in the column name row
    pub allow_duplicate_names: bool,

    /// How column labels are derived from the header
    pub names: NameStyle,

    /// Reject names containing `/[]` and warn on unusual fields (friendly style only)
    pub strict: bool,

    /// Unit lookup table for the friendly style (built-in table when unset)
    pub short_units: Option<HashMap<String, String>>,

    /// Values read as null
    pub missing_values: Vec<String>,

    /// Parse the `TIMESTAMP` index column as date-time
    pub parse_timestamps: bool,

    /// Replaces `names`, `strict` and `short_units` when set
    #[serde(skip)]
    pub custom_transform: Option<ColumnTransform>,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            allow_duplicate_names: false,
            names: NameStyle::Friendly,
            strict: true,
            short_units: None,
            missing_values: vec![TOA5_MISSING_VALUE.to_string()],
            parse_timestamps: true,
            custom_transform: None,
        }
    }
}

impl ReadConfig {
    pub fn with_duplicate_names(mut self, allow: bool) -> Self {
        self.allow_duplicate_names = allow;
        self
    }

    pub fn with_names(mut self, names: NameStyle) -> Self {
        self.names = names;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_short_units(mut self, short_units: HashMap<String, String>) -> Self {
        self.short_units = Some(short_units);
        self
    }

    pub fn with_missing_values(mut self, missing_values: Vec<String>) -> Self {
        self.missing_values = missing_values;
        self
    }

    pub fn with_parse_timestamps(mut self, parse: bool) -> Self {
        self.parse_timestamps = parse;
        self
    }

    pub fn with_transform(mut self, transform: ColumnTransform) -> Self {
        self.custom_transform = Some(transform);
        self
    }

    /// The column transform this configuration describes
    pub fn transform(&self) -> ColumnTransform {
        if let Some(custom) = &self.custom_transform {
            return custom.clone();
        }
        match self.names {
            NameStyle::Friendly => ColumnTransform::Friendly(FriendlyTransform {
                short_units: self.short_units.clone().unwrap_or_else(default_short_units),
                strict: self.strict,
            }),
            NameStyle::Sql => ColumnTransform::Sql,
        }
    }
}
