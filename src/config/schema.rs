//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::declaration::RouteDeclaration;

/// Root configuration for the API router.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// API listener configuration.
    pub listener: ListenerConfig,

    /// Route matching behavior.
    pub routing: RoutingConfig,

    /// Route table persistence.
    pub cache: CacheConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    pub admin: AdminConfig,

    /// Controllers with explicit route lists.
    pub controllers: Vec<ControllerConfig>,

    /// Models declaring their own routes.
    pub models: Vec<ModelConfig>,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Route matching configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Path prefix the API is mounted under; stripped before routing.
    pub api_prefix: String,

    /// Path segment that marks a wildcard in declarations.
    pub wildcard_token: String,

    /// Compare literal segments ignoring ASCII case.
    pub case_insensitive: bool,

    /// Register the generic CRUD controller routes.
    pub generic_crud: bool,

    /// Handler class the generic CRUD routes resolve to.
    pub crud_handler_class: String,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            wildcard_token: "?".to_string(),
            case_insensitive: false,
            generic_crud: true,
            crud_handler_class: "CrudController".to_string(),
        }
    }
}

/// Where the route table snapshot lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    File,
}

/// Route cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Snapshot file, used by the `file` backend.
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            path: "var/cache/routes.json".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

/// Placeholder key; refused by validation when the admin API is enabled.
pub const PLACEHOLDER_API_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_API_KEY.to_string(),
            bind_address: "127.0.0.1:8081".to_string(),
        }
    }
}

/// A route entry under `[[controllers]]` or `[[models]]`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RouteConfig {
    pub method: String,

    pub path: String,

    /// Defaults to the owning controller or model.
    #[serde(default)]
    pub handler_class: Option<String>,

    pub handler_method: String,

    #[serde(default)]
    pub parameter_names: Option<Vec<String>>,
}

impl RouteConfig {
    pub fn to_declaration(&self, default_class: &str) -> RouteDeclaration {
        RouteDeclaration {
            method: self.method.clone(),
            path: self.path.clone(),
            handler_class: self
                .handler_class
                .clone()
                .unwrap_or_else(|| default_class.to_string()),
            handler_method: self.handler_method.clone(),
            parameter_names: self.parameter_names.clone(),
        }
    }
}

/// A controller and the routes it registers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ControllerConfig {
    pub name: String,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}

/// A model and the routes it adds on top of the generic CRUD routes.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelConfig {
    pub name: String,

    /// Handler class for this model's routes; defaults to the model name.
    #[serde(default)]
    pub controller: Option<String>,

    #[serde(default)]
    pub routes: Vec<RouteConfig>,
}
