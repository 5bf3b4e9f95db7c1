//! Deployment mode and autoscaler class markers

use crate::constants::{AUTOSCALER_CLASS_ANNOTATION, DEPLOYMENT_MODE_ANNOTATION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How a graph is turned into running processes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeploymentMode {
    /// Plain Deployment plus HorizontalPodAutoscaler
    #[default]
    RawDeployment,
    /// Managed by a serverless platform, outside this controller
    Serverless,
}

impl DeploymentMode {
    /// Mode named by the deployment-mode annotation, if it names a known one
    pub fn from_annotations(annotations: Option<&BTreeMap<String, String>>) -> Option<Self> {
        annotations?
            .get(DEPLOYMENT_MODE_ANNOTATION)
            .and_then(|v| v.parse().ok())
    }
}

impl FromStr for DeploymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RawDeployment" => Ok(DeploymentMode::RawDeployment),
            "Serverless" => Ok(DeploymentMode::Serverless),
            other => Err(format!("unknown deployment mode: {other}")),
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentMode::RawDeployment => write!(f, "RawDeployment"),
            DeploymentMode::Serverless => write!(f, "Serverless"),
        }
    }
}

/// Who owns the autoscaling policy object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutoscalerClass {
    /// This controller derives and converges a HorizontalPodAutoscaler
    #[default]
    Hpa,
    /// Scaling is handled elsewhere; no policy object is managed
    External,
}

impl AutoscalerClass {
    /// Class named by the autoscaler-class annotation, defaulting to `Hpa`
    pub fn from_annotations(annotations: Option<&BTreeMap<String, String>>) -> Self {
        annotations
            .and_then(|a| a.get(AUTOSCALER_CLASS_ANNOTATION))
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for AutoscalerClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hpa" => Ok(AutoscalerClass::Hpa),
            "external" => Ok(AutoscalerClass::External),
            other => Err(format!("unknown autoscaler class: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotations(key: &str, value: &str) -> BTreeMap<String, String> {
        BTreeMap::from([(key.to_string(), value.to_string())])
    }

    #[test]
    fn test_deployment_mode_annotation() {
        let raw = annotations(DEPLOYMENT_MODE_ANNOTATION, "RawDeployment");
        assert_eq!(
            DeploymentMode::from_annotations(Some(&raw)),
            Some(DeploymentMode::RawDeployment)
        );

        let bogus = annotations(DEPLOYMENT_MODE_ANNOTATION, "Sideways");
        assert_eq!(DeploymentMode::from_annotations(Some(&bogus)), None);
        assert_eq!(DeploymentMode::from_annotations(None), None);
    }

    #[test]
    fn test_autoscaler_class_defaults_to_hpa() {
        assert_eq!(AutoscalerClass::from_annotations(None), AutoscalerClass::Hpa);

        let external = annotations(AUTOSCALER_CLASS_ANNOTATION, "external");
        assert_eq!(
            AutoscalerClass::from_annotations(Some(&external)),
            AutoscalerClass::External
        );

        let unknown = annotations(AUTOSCALER_CLASS_ANNOTATION, "keda");
        assert_eq!(AutoscalerClass::from_annotations(Some(&unknown)), AutoscalerClass::Hpa);
    }
}
