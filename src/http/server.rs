//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Derive the serve configuration from the option table
//! - Wire up middleware (request ID, timeout, access log)
//! - Bind and serve until the shutdown future resolves
//! - Bound the drain with a grace period

use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::validation::{check_value, ValidationError};
use crate::config::{ConfigError, ConfigurationSet, OptionKind};
use crate::http::request::RequestIdMaker;

/// Errors raised while serving.
#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Parameters the service host is started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    /// Lowercase tracing level name.
    pub log_level: String,
    pub reload: bool,
    pub access_log: bool,
}

impl ServeConfig {
    /// Build from `API_HOST`, `API_PORT` and `LOG_LEVEL`. Reload is always
    /// off and access logging always on.
    pub fn from_options(options: &ConfigurationSet) -> Result<Self, ConfigError> {
        let mut errors = Vec::new();
        let host = read(options, "API_HOST", OptionKind::Host, &mut errors);
        let port = read(options, "API_PORT", OptionKind::Port, &mut errors);
        let log_level = read(options, "LOG_LEVEL", OptionKind::LogLevel, &mut errors);

        match (host, port.and_then(|p| p.parse::<u16>().ok()), log_level) {
            (Some(host), Some(port), Some(log_level)) if errors.is_empty() => Ok(Self {
                host: host.to_string(),
                port,
                log_level: log_level.to_ascii_lowercase(),
                reload: false,
                access_log: true,
            }),
            _ => Err(ConfigError::Validation(errors)),
        }
    }

    /// `host:port`, bracketing IPv6 literals.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

fn read<'a>(
    options: &'a ConfigurationSet,
    name: &'static str,
    kind: OptionKind,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a str> {
    let Some(value) = options.get(name) else {
        errors.push(ValidationError::MissingOption(name));
        return None;
    };
    match check_value(kind, value) {
        Ok(()) => Some(value),
        Err(reason) => {
            errors.push(ValidationError::InvalidValue {
                name: name.to_string(),
                value: value.to_string(),
                reason,
            });
            None
        }
    }
}

/// Something that can serve the demo application.
pub trait ServiceHost {
    /// Serve until `shutdown` resolves or an unrecoverable error occurs.
    fn serve<F>(self, config: ServeConfig, shutdown: F) -> impl Future<Output = Result<(), ServeError>> + Send
    where
        F: Future<Output = ()> + Send + 'static;
}

/// Serves an axum application over plain HTTP.
pub struct AxumHost {
    app: Router,
    request_timeout: Duration,
    shutdown_grace: Duration,
}

impl AxumHost {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            request_timeout: Duration::from_secs(30),
            shutdown_grace: Duration::from_secs(10),
        }
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn shutdown_grace(mut self, grace: Duration) -> Self {
        self.shutdown_grace = grace;
        self
    }

    /// Wrap the application with the middleware stack.
    #[allow(deprecated)]
    fn build_router(app: Router, request_timeout: Duration, access_log: bool) -> Router {
        let app = app.layer(
            ServiceBuilder::new()
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(TimeoutLayer::new(request_timeout)),
        );
        let app = if access_log {
            app.layer(
                TraceLayer::new_for_http()
                    .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                    .on_response(DefaultOnResponse::new().level(Level::INFO)),
            )
        } else {
            app
        };
        app.layer(SetRequestIdLayer::x_request_id(RequestIdMaker))
    }
}

impl ServiceHost for AxumHost {
    async fn serve<F>(self, config: ServeConfig, shutdown: F) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let address = config.bind_address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServeError::Bind {
                address: address.clone(),
                source,
            })?;
        let local_addr = listener.local_addr()?;

        if config.reload {
            tracing::warn!("Auto-reload is not supported, serving without it");
        }

        tracing::info!(
            address = %local_addr,
            access_log = config.access_log,
            log_level = %config.log_level,
            "HTTP server starting"
        );

        let app = Self::build_router(self.app, self.request_timeout, config.access_log);

        let (draining_tx, draining_rx) = oneshot::channel::<()>();
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown.await;
                let _ = draining_tx.send(());
            })
            .into_future();

        let grace = self.shutdown_grace;
        let deadline = async move {
            if draining_rx.await.is_ok() {
                tokio::time::sleep(grace).await;
            } else {
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            result = server => result?,
            _ = deadline => {
                tracing::warn!(grace_secs = grace.as_secs(), "Grace period elapsed, dropping open connections");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_defaults() {
        let config = ServeConfig::from_options(&ConfigurationSet::defaults()).unwrap();
        assert_eq!(
            config,
            ServeConfig {
                host: "0.0.0.0".into(),
                port: 8000,
                log_level: "info".into(),
                reload: false,
                access_log: true,
            }
        );
        assert_eq!(config.bind_address(), "0.0.0.0:8000");
    }

    #[test]
    fn test_ipv6_bind_address() {
        let mut overrides = BTreeMap::new();
        overrides.insert("API_HOST".to_string(), "::1".to_string());
        let config = ServeConfig::from_options(&ConfigurationSet::provision(&overrides)).unwrap();
        assert_eq!(config.bind_address(), "[::1]:8000");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let mut overrides = BTreeMap::new();
        overrides.insert("API_PORT".to_string(), "99999".to_string());
        let err = ServeConfig::from_options(&ConfigurationSet::provision(&overrides)).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_unprovisioned_option_is_missing_not_unknown() {
        let mut errors = Vec::new();
        let defaults = ConfigurationSet::defaults();
        let value = read(&defaults, "API_SOCKET", OptionKind::Host, &mut errors);
        assert_eq!(value, None);
        assert_eq!(errors, vec![ValidationError::MissingOption("API_SOCKET")]);
    }
}
