//! Column header field validation.
//!
//! The rules are derived from what loggers are seen to emit in practice:
//!
//! - `name` starts with a letter, underscore or dollar sign, continues with
//!   letters, digits, underscores or dollar signs, and may end in a
//!   parenthesized list of indices such as `Temp(1,2)`. At most 255
//!   characters.
//! - `unit` allows printable ASCII except backslash, plus the degree sign.
//!   At most 64 characters.
//! - `prc` allows up to 32 letters, digits, underscores and dashes.

use crate::error::{Field, FieldProblem, ValidationError, join_problems};
use crate::models::ColumnHeader;
use regex::Regex;
use std::sync::LazyLock;

const MAX_NAME_CHARS: usize = 255;

static NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A[A-Za-z_$][A-Za-z0-9_$]*(?:\([0-9]+(?:,[0-9]+)*\))?\z")
        .expect("Invalid column name regex")
});

// 0x20..=0x7E without 0x5C (backslash)
static UNIT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A[\x20-\x5B\x5D-\x7E°]{0,64}\z").expect("Invalid unit regex")
});

static PRC_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[A-Za-z0-9_-]{0,32}\z").expect("Invalid data process regex"));

pub fn is_valid_name(name: &str) -> bool {
    name.chars().count() <= MAX_NAME_CHARS && NAME_REGEX.is_match(name)
}

pub fn is_valid_unit(unit: &str) -> bool {
    UNIT_REGEX.is_match(unit)
}

pub fn is_valid_prc(prc: &str) -> bool {
    PRC_REGEX.is_match(prc)
}

/// All fields of `col` that break a rule, in name/unit/prc order
pub fn problems(col: &ColumnHeader) -> Vec<FieldProblem> {
    let checks = [
        (Field::Name, &col.name, is_valid_name(&col.name)),
        (Field::Unit, &col.unit, is_valid_unit(&col.unit)),
        (Field::Prc, &col.prc, is_valid_prc(&col.prc)),
    ];
    checks
        .into_iter()
        .filter(|(_, _, ok)| !ok)
        .map(|(field, value, _)| FieldProblem {
            field,
            value: value.clone(),
        })
        .collect()
}

/// Check `col` against the field rules.
///
/// With `strict`, any problem is an error. Otherwise the problems are
/// described in the returned string, which is empty when everything passed.
pub fn validate(col: &ColumnHeader, strict: bool) -> Result<String, ValidationError> {
    let problems = problems(col);
    if problems.is_empty() {
        return Ok(String::new());
    }
    if strict {
        return Err(ValidationError::InvalidFields { problems });
    }
    Ok(format!("Unusual {}", join_problems(&problems)))
}

impl ColumnHeader {
    /// See [`validate`]
    pub fn validate(&self, strict: bool) -> Result<String, ValidationError> {
        validate(self, strict)
    }
}
