//! Configuration validation.
//!
//! Semantic checks only; serde handles syntax. Returns every problem found,
//! not just the first.

use std::str::FromStr;

use thiserror::Error;
use tracing::Level;
use url::Url;

use crate::config::environment::{option_spec, OptionKind};
use crate::config::schema::DemoConfig;

/// A single semantic problem in a config file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),

    #[error("option `{0}` is not provisioned")]
    MissingOption(&'static str),

    #[error("option `{name}` = {value:?}: {reason}")]
    InvalidValue {
        name: String,
        value: String,
        reason: String,
    },

    #[error("server.{field} must be greater than zero")]
    ZeroDuration { field: &'static str },
}

/// Validate a parsed config file.
pub fn validate_config(config: &DemoConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (name, value) in &config.environment {
        match option_spec(name) {
            Some(spec) => {
                if let Err(reason) = check_value(spec.kind, value) {
                    errors.push(ValidationError::InvalidValue {
                        name: name.clone(),
                        value: value.clone(),
                        reason,
                    });
                }
            }
            None => errors.push(ValidationError::UnknownOption(name.clone())),
        }
    }

    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroDuration {
            field: "request_timeout_secs",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Check that `value` is readable as `kind`.
pub fn check_value(kind: OptionKind, value: &str) -> Result<(), String> {
    match kind {
        OptionKind::Text => Ok(()),
        OptionKind::Url => Url::parse(value).map(drop).map_err(|e| e.to_string()),
        OptionKind::Integer => value.parse::<u64>().map(drop).map_err(|e| e.to_string()),
        OptionKind::Float => match value.parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(()),
            Ok(_) => Err("must be finite".to_string()),
            Err(e) => Err(e.to_string()),
        },
        OptionKind::Bool => value.parse::<bool>().map(drop).map_err(|e| e.to_string()),
        OptionKind::IntArray => serde_json::from_str::<Vec<u64>>(value)
            .map(drop)
            .map_err(|e| e.to_string()),
        OptionKind::Host => {
            if value.trim().is_empty() {
                Err("must not be empty".to_string())
            } else {
                Ok(())
            }
        }
        OptionKind::Port => match value.parse::<u16>() {
            Ok(0) => Err("port 0 is not bindable".to_string()),
            Ok(_) => Ok(()),
            Err(e) => Err(e.to_string()),
        },
        OptionKind::LogLevel => Level::from_str(value).map(drop).map_err(|e| e.to_string()),
    }
}
