//! Ordered configuration layers
//!
//! A [`Precedence`] lists the places a value may come from, highest priority
//! first. Resolution takes the first layer that holds a value.

use std::fmt;

/// Where a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSource {
    Annotation(&'static str),
    ExtensionSpec(&'static str),
    Default,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Annotation(key) => write!(f, "annotation {key}"),
            ConfigSource::ExtensionSpec(field) => write!(f, "extension spec {field}"),
            ConfigSource::Default => write!(f, "default"),
        }
    }
}

/// A value together with the layer that supplied it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<T> {
    pub value: T,
    pub source: ConfigSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precedence<T> {
    layers: Vec<(ConfigSource, Option<T>)>,
}

impl<T> Default for Precedence<T> {
    fn default() -> Self {
        Self { layers: Vec::new() }
    }
}

impl<T> Precedence<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a lower-priority layer
    pub fn layer(mut self, source: ConfigSource, value: Option<T>) -> Self {
        self.layers.push((source, value));
        self
    }

    /// Layer order, highest priority first
    pub fn sources(&self) -> Vec<ConfigSource> {
        self.layers.iter().map(|(source, _)| *source).collect()
    }

    /// First present value, if any
    pub fn resolve(self) -> Option<Resolved<T>> {
        self.layers
            .into_iter()
            .find_map(|(source, value)| value.map(|value| Resolved { value, source }))
    }

    /// First present value, or `default`
    pub fn resolve_or(self, default: T) -> Resolved<T> {
        self.resolve().unwrap_or(Resolved {
            value: default,
            source: ConfigSource::Default,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_present_wins() {
        let resolved = Precedence::new()
            .layer(ConfigSource::Annotation("a"), None)
            .layer(ConfigSource::ExtensionSpec("b"), Some(2))
            .layer(ConfigSource::Annotation("c"), Some(3))
            .resolve_or(9);

        assert_eq!(
            resolved,
            Resolved {
                value: 2,
                source: ConfigSource::ExtensionSpec("b"),
            }
        );
    }

    #[test]
    fn test_default_when_all_absent() {
        let resolved = Precedence::<i32>::new()
            .layer(ConfigSource::Annotation("a"), None)
            .resolve_or(80);
        assert_eq!(resolved.value, 80);
        assert_eq!(resolved.source, ConfigSource::Default);
    }

    #[test]
    fn test_sources_keep_order() {
        let precedence = Precedence::<i32>::new()
            .layer(ConfigSource::ExtensionSpec("x"), None)
            .layer(ConfigSource::Annotation("y"), None);
        assert_eq!(
            precedence.sources(),
            vec![ConfigSource::ExtensionSpec("x"), ConfigSource::Annotation("y")]
        );
        assert_eq!(precedence.resolve(), None);
    }
}
