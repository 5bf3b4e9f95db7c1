//! Router configuration
//!
//! Operator-supplied settings for the router process that executes a graph:
//! its image, default resource sizing and header forwarding. Read once per
//! reconciliation and never modified by the controller.

use crate::constants::{PROPAGATE_HEADERS_KEY, ROUTER_CONFIG_KEY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Router image and default sizing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    pub image: String,

    #[serde(default = "default_cpu_request")]
    pub cpu_request: String,

    #[serde(default = "default_cpu_limit")]
    pub cpu_limit: String,

    #[serde(default = "default_memory_request")]
    pub memory_request: String,

    #[serde(default = "default_memory_limit")]
    pub memory_limit: String,

    /// Header lists keyed by purpose; `propagate` lists headers to forward
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            image: "kserve/router:latest".to_string(),
            cpu_request: default_cpu_request(),
            cpu_limit: default_cpu_limit(),
            memory_request: default_memory_request(),
            memory_limit: default_memory_limit(),
            headers: BTreeMap::new(),
        }
    }
}

fn default_cpu_request() -> String {
    "100m".to_string()
}

fn default_cpu_limit() -> String {
    "1".to_string()
}

fn default_memory_request() -> String {
    "100Mi".to_string()
}

fn default_memory_limit() -> String {
    "1Gi".to_string()
}

/// Errors loading router configuration
#[derive(Debug, Error)]
pub enum RouterConfigError {
    #[error("config map has no \"{0}\" entry")]
    MissingKey(String),

    #[error("invalid router config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("router image must not be empty")]
    EmptyImage,
}

impl RouterConfig {
    /// Parse the router JSON document
    pub fn from_json(json: &str) -> Result<Self, RouterConfigError> {
        let config: RouterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read the router document from a config map data block
    pub fn from_config_map(data: &BTreeMap<String, String>) -> Result<Self, RouterConfigError> {
        let json = data
            .get(ROUTER_CONFIG_KEY)
            .ok_or_else(|| RouterConfigError::MissingKey(ROUTER_CONFIG_KEY.to_string()))?;
        Self::from_json(json)
    }

    pub fn validate(&self) -> Result<(), RouterConfigError> {
        if self.image.trim().is_empty() {
            return Err(RouterConfigError::EmptyImage);
        }
        Ok(())
    }

    /// Headers to forward, if forwarding is configured at all
    pub fn propagated_headers(&self) -> Option<&[String]> {
        self.headers.get(PROPAGATE_HEADERS_KEY).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_with_headers() {
        let config = RouterConfig::from_json(
            r#"{
                "image": "kserve/router:v0.10.0",
                "cpuRequest": "100m",
                "cpuLimit": "100m",
                "memoryRequest": "100Mi",
                "memoryLimit": "500Mi",
                "headers": { "propagate": ["Authorization", "Intuit_tid"] }
            }"#,
        )
        .unwrap();

        assert_eq!(config.image, "kserve/router:v0.10.0");
        assert_eq!(config.memory_limit, "500Mi");
        assert_eq!(
            config.propagated_headers(),
            Some(&["Authorization".to_string(), "Intuit_tid".to_string()][..])
        );
    }

    #[test]
    fn test_missing_sizing_falls_back_to_defaults() {
        let config = RouterConfig::from_json(r#"{"image":"router:v1"}"#).unwrap();
        assert_eq!(config.cpu_request, "100m");
        assert_eq!(config.memory_limit, "1Gi");
        assert!(config.propagated_headers().is_none());
    }

    #[test]
    fn test_config_map_errors() {
        let empty = BTreeMap::new();
        assert!(matches!(
            RouterConfig::from_config_map(&empty),
            Err(RouterConfigError::MissingKey(_))
        ));

        let bad = BTreeMap::from([("router".to_string(), "{not json".to_string())]);
        assert!(matches!(
            RouterConfig::from_config_map(&bad),
            Err(RouterConfigError::Parse(_))
        ));

        let blank = BTreeMap::from([("router".to_string(), r#"{"image":" "}"#.to_string())]);
        assert!(matches!(
            RouterConfig::from_config_map(&blank),
            Err(RouterConfigError::EmptyImage)
        ));
    }
}
