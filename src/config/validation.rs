//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, tokens and value ranges
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Route declarations are not checked here: discovery skips bad ones
//!   individually instead of refusing the whole config

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::{CacheBackend, RouterConfig, PLACEHOLDER_API_KEY};

/// One semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            field,
            format!("'{}' is not a socket address", value),
        ));
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "listener.bind_address", &config.listener.bind_address);

    let token = &config.routing.wildcard_token;
    if token.is_empty() {
        errors.push(ValidationError::new("routing.wildcard_token", "must not be empty"));
    } else if token.contains('/') || token.starts_with(':') {
        errors.push(ValidationError::new(
            "routing.wildcard_token",
            "must not contain '/' or start with ':'",
        ));
    }

    let prefix = &config.routing.api_prefix;
    if !prefix.is_empty() && (!prefix.starts_with('/') || prefix.ends_with('/')) {
        errors.push(ValidationError::new(
            "routing.api_prefix",
            "must be empty or start with '/' and not end with '/'",
        ));
    }

    if config.routing.generic_crud && config.routing.crud_handler_class.trim().is_empty() {
        errors.push(ValidationError::new(
            "routing.crud_handler_class",
            "required when generic_crud is enabled",
        ));
    }

    if config.cache.backend == CacheBackend::File && config.cache.path.trim().is_empty() {
        errors.push(ValidationError::new("cache.path", "required for the file backend"));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if tracing_subscriber::EnvFilter::try_new(&config.observability.log_level).is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("'{}' is not a valid filter", config.observability.log_level),
        ));
    }

    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    if config.admin.enabled {
        check_address(&mut errors, "admin.bind_address", &config.admin.bind_address);
        if config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY {
            errors.push(ValidationError::new(
                "admin.api_key",
                "set a real key before enabling the admin API",
            ));
        }
    }

    for (i, model) in config.models.iter().enumerate() {
        if model.name.trim().is_empty() {
            errors.push(ValidationError::new(
                "models.name",
                format!("model #{} has no name", i + 1),
            ));
        }
    }

    for (i, controller) in config.controllers.iter().enumerate() {
        if controller.name.trim().is_empty() {
            errors.push(ValidationError::new(
                "controllers.name",
                format!("controller #{} has no name", i + 1),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
