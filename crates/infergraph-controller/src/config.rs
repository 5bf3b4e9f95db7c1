//! Configuration for the inference graph controller

use infergraph_types::{DeploymentMode, RouterConfig};
use serde::{Deserialize, Serialize};

/// Main controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControllerConfig {
    /// Router image and default sizing
    #[serde(default)]
    pub router: RouterConfig,

    /// How graph URLs are formed
    #[serde(default)]
    pub ingress: IngressConfig,

    /// Mode for graphs without a deployment-mode annotation
    #[serde(default)]
    pub default_deployment_mode: DeploymentMode,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            router: RouterConfig::default(),
            ingress: IngressConfig::default(),
            default_deployment_mode: DeploymentMode::RawDeployment,
            logging: LoggingConfig::default(),
        }
    }
}

/// Ingress configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngressConfig {
    /// Cluster ingress domain
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Scheme of published URLs
    #[serde(default = "default_url_scheme")]
    pub url_scheme: String,
}

impl Default for IngressConfig {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            url_scheme: default_url_scheme(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level or filter directive
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_domain() -> String {
    "example.com".to_string()
}

fn default_url_scheme() -> String {
    "http".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ControllerConfig {
    /// Load configuration from defaults, an optional file and the environment
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&ControllerConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        // Add environment variables with INFERGRAPH_ prefix, e.g.
        // INFERGRAPH_INGRESS__DOMAIN
        builder = builder.add_source(
            config::Environment::with_prefix("INFERGRAPH")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Externally reachable URL of graph `name` in `namespace`
    pub fn graph_url(&self, name: &str, namespace: &str) -> String {
        format!(
            "{}://{}-{}.{}",
            self.ingress.url_scheme, name, namespace, self.ingress.domain
        )
    }
}
