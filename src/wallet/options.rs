//! Transfer option resolution
//!
//! Callers configure transfers through a string key/value bag. The bag is
//! resolved once, at the API boundary, into a typed `HoursSelection`;
//! everything past that point works with the tagged union and never
//! re-parses strings.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Option key selecting how output hours are chosen ("auto" or "manual")
pub const OPT_HOURS_SELECTION_TYPE: &str = "CoinHoursSelectionType";

/// Option key for the share of input hours burned in auto mode
pub const OPT_BURN_FACTOR: &str = "BurnFactor";

/// Errors resolving transfer options
#[derive(Error, Debug, PartialEq)]
pub enum OptionsError {
    #[error("Unknown hours selection type `{0}`")]
    UnknownSelectionType(String),
    #[error("Invalid burn factor `{0}`")]
    InvalidBurnFactor(String),
    #[error("Receiver {0} has no hours set in manual selection mode")]
    MissingHours(usize),
}

/// Free-form transfer options. Unrecognized keys are ignored by the
/// resolver so callers can pass backend-specific extras through.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransferOptions {
    values: HashMap<String, String>,
}

impl TransferOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_value(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    pub fn get_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

/// A transfer destination. Hours are optional; manual hours selection
/// requires them, auto mode ignores them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Receiver {
    pub address: String,
    pub coins: u64,
    pub hours: Option<u64>,
}

impl Receiver {
    pub fn new(address: &str, coins: u64) -> Self {
        Self {
            address: address.to_string(),
            coins,
            hours: None,
        }
    }

    pub fn with_hours(address: &str, coins: u64, hours: u64) -> Self {
        Self {
            address: address.to_string(),
            coins,
            hours: Some(hours),
        }
    }
}

/// How hours are assigned to the outputs of a new transaction
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HoursSelection {
    /// Burn `share_factor` of the input hours, spread the rest
    Auto { share_factor: f64 },
    /// Per-receiver hours, positionally matched
    Manual { hours: Vec<u64> },
}

/// Resolves the option bag into a validated `HoursSelection`.
///
/// Absent selection type defaults to auto with a 0.5 burn share.
pub fn resolve_hours_selection(
    options: &TransferOptions,
    receivers: &[Receiver],
) -> Result<HoursSelection, OptionsError> {
    match options.get_value(OPT_HOURS_SELECTION_TYPE).unwrap_or("auto") {
        "auto" => {
            let share_factor = match options.get_value(OPT_BURN_FACTOR) {
                Some(raw) => {
                    let f: f64 = raw
                        .parse()
                        .map_err(|_| OptionsError::InvalidBurnFactor(raw.to_string()))?;
                    if !f.is_finite() || !(0.0..=1.0).contains(&f) {
                        return Err(OptionsError::InvalidBurnFactor(raw.to_string()));
                    }
                    f
                }
                None => 0.5,
            };
            Ok(HoursSelection::Auto { share_factor })
        }
        "manual" => {
            let mut hours = Vec::with_capacity(receivers.len());
            for (i, receiver) in receivers.iter().enumerate() {
                hours.push(receiver.hours.ok_or(OptionsError::MissingHours(i))?);
            }
            Ok(HoursSelection::Manual { hours })
        }
        other => Err(OptionsError::UnknownSelectionType(other.to_string())),
    }
}
