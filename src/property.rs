//! Lexical checks for typed property accessors.

use crate::decode::is_uint_literal;
use crate::error::MapError;

fn invalid(name: &str, value: &str, expected: &'static str) -> MapError {
    MapError::InvalidPropertyType {
        name: name.to_owned(),
        value: value.to_owned(),
        expected,
    }
}

/// `0|[1-9][0-9]*`, within `i32` range.
pub fn parse_int(name: &str, value: &str) -> Result<i32, MapError> {
    if !is_uint_literal(value) {
        return Err(invalid(name, value, "integer"));
    }
    value.parse().map_err(|_| invalid(name, value, "integer"))
}

/// `(0|[1-9][0-9]*)\.?[0-9]*`
pub fn parse_double(name: &str, value: &str) -> Result<f64, MapError> {
    let int_end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    let (int, rest) = value.split_at(int_end);
    let frac = rest.strip_prefix('.').unwrap_or(rest);
    if !is_uint_literal(int) || !frac.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(name, value, "double"));
    }
    value.parse().map_err(|_| invalid(name, value, "double"))
}

/// `true` or `false`, any case.
pub fn parse_bool(name: &str, value: &str) -> Result<bool, MapError> {
    if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(invalid(name, value, "boolean"))
    }
}
