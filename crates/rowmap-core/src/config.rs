//! Mapper configuration.

/// Configuration for the entity mapper.
#[derive(Debug, Clone)]
pub struct MapperConfig {
    /// Passphrase for encrypted column values.
    ///
    /// When unset (or empty), processing any encrypted property is a
    /// configuration error rather than a silent passthrough.
    pub passphrase: Option<String>,

    /// Maximum relation depth for one hydrate call.
    ///
    /// Bounds traversal of cyclic reference graphs; exceeding it aborts
    /// the call.
    pub max_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            passphrase: None,
            max_depth: 64,
        }
    }
}

impl MapperConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cipher passphrase.
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(passphrase.into());
        self
    }

    /// Set the relation depth bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MapperConfig::default();
        assert!(config.passphrase.is_none());
        assert_eq!(config.max_depth, 64);
    }

    #[test]
    fn test_builders() {
        let config = MapperConfig::new()
            .with_passphrase("secret")
            .with_max_depth(4);
        assert_eq!(config.passphrase.as_deref(), Some("secret"));
        assert_eq!(config.max_depth, 4);
    }
}
