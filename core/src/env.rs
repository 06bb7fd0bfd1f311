// autorent
// Copyright 2026 The autorent Authors
//
// Licensed under the Apache License, Version 2.0 (the "License"); you may not
// use this file except in compliance with the License.  You may obtain a copy
// of the License at:
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS, WITHOUT
// WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.  See the
// License for the specific language governing permissions and limitations
// under the License.

//! Typed access to configuration stored in environment variables.
//!
//! Settings of a component share a prefix (such as `PGSQL_PROD` or `STRIPE`) and each setting
//! lives in the variable `<prefix>_<suffix>`.  Errors are plain strings because they are only
//! ever shown to the operator at startup.

use std::env;
use std::time::Duration;

/// Result type for this module.
type Result<T> = std::result::Result<T, String>;

/// Raw contents of an environment variable, to be converted into the type of a setting.
pub struct Value(String);

impl TryFrom<Value> for String {
    type Error = String;

    fn try_from(value: Value) -> Result<Self> {
        Ok(value.0)
    }
}

impl TryFrom<Value> for bool {
    type Error = String;

    fn try_from(value: Value) -> Result<Self> {
        let lower = value.0.to_ascii_lowercase();
        if ["1", "true", "yes"].contains(&lower.as_str()) {
            Ok(true)
        } else if ["0", "false", "no"].contains(&lower.as_str()) {
            Ok(false)
        } else {
            Err(format!("Invalid bool: {}", value.0))
        }
    }
}

impl TryFrom<Value> for Duration {
    type Error = String;

    /// Accepts a number of seconds with an optional `s`, `m`, `h` or `d` unit, as in `90` or
    /// `5m`.
    fn try_from(value: Value) -> Result<Self> {
        let text = value.0.trim();
        if text.is_empty() {
            return Err("Invalid duration: empty value".to_owned());
        }

        let split = text.find(|c: char| !c.is_ascii_digit()).unwrap_or(text.len());
        let (digits, unit) = text.split_at(split);
        let unit_secs: u64 = match unit {
            "" | "s" => 1,
            "m" => 60,
            "h" => 3600,
            "d" => 86400,
            _ => return Err(format!("Invalid duration '{}': unknown unit", text)),
        };
        let count = digits.parse::<u64>().map_err(|e| format!("Invalid duration '{}': {}", text, e))?;
        count
            .checked_mul(unit_secs)
            .map(Duration::from_secs)
            .ok_or_else(|| format!("Invalid duration '{}': too large", text))
    }
}

/// Implements `TryFrom<Value>` for the integer types, which parse with `FromStr`.
macro_rules! value_into_integer {
    ( $( $t:ty ),+ ) => {
        $(
            impl TryFrom<Value> for $t {
                type Error = String;

                fn try_from(value: Value) -> Result<Self> {
                    value.0.parse::<$t>().map_err(|e| format!("Invalid {}: {}", stringify!($t), e))
                }
            }
        )+
    };
}

value_into_integer!(i32, i64, u16, u32, u64, usize);

/// Computes the name of the variable holding `suffix` for the component `prefix`.
///
/// An empty `prefix` names the variable `suffix` as is.
fn var_name(prefix: &str, suffix: &str) -> String {
    if prefix.is_empty() {
        suffix.to_owned()
    } else {
        format!("{}_{}", prefix, suffix)
    }
}

/// Reads and converts the variable `name`, which may be unset.
fn read_var<T: TryFrom<Value, Error = String>>(name: &str) -> Result<Option<T>> {
    let raw = match env::var(name) {
        Ok(raw) => raw,
        Err(env::VarError::NotPresent) => return Ok(None),
        Err(env::VarError::NotUnicode(_)) => {
            return Err(format!("Invalid value in environment variable {}", name));
        }
    };
    T::try_from(Value(raw))
        .map(Some)
        .map_err(|e| format!("Invalid type in environment variable {}: {}", name, e))
}

/// Reads the setting `suffix` of the component `prefix`, failing if it is unset.
pub fn get_required_var<T: TryFrom<Value, Error = String>>(prefix: &str, suffix: &str) -> Result<T> {
    let name = var_name(prefix, suffix);
    read_var(&name)?.ok_or_else(|| format!("Required environment variable {} not present", name))
}

/// Reads the setting `suffix` of the component `prefix`, which may be unset.
pub fn get_optional_var<T: TryFrom<Value, Error = String>>(
    prefix: &str,
    suffix: &str,
) -> Result<Option<T>> {
    read_var(&var_name(prefix, suffix))
}
