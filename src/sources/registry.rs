use std::sync::Arc;
use url::Url;

use super::generic::GenericStrategy;
use super::traits::CandidateStrategy;
use super::vimeo::VimeoStrategy;
use crate::config::Config;
use crate::error::InputError;

/// Strategy name that picks the first registered strategy supporting the URL.
pub const AUTO: &str = "auto";

/// Named candidate strategies, consulted in registration order.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn CandidateStrategy>>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn register(&mut self, strategy: Arc<dyn CandidateStrategy>) {
        self.strategies.retain(|s| s.name() != strategy.name());
        self.strategies.push(strategy);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn CandidateStrategy>> {
        self.strategies.iter().find(|s| s.name() == name).cloned()
    }

    pub fn has_strategy(&self, name: &str) -> bool {
        name == AUTO || self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Resolve a configured strategy name for a concrete source URL.
    pub fn resolve(
        &self,
        name: &str,
        source_url: &str,
    ) -> Result<Arc<dyn CandidateStrategy>, InputError> {
        if name != AUTO {
            return self
                .get(name)
                .ok_or_else(|| InputError::UnknownStrategy(name.to_string()));
        }

        let source = source_url.trim();
        if source.is_empty() {
            return Err(InputError::MissingUrl);
        }
        let url = Url::parse(source).map_err(|e| InputError::InvalidUrl(e.to_string()))?;
        self.strategies
            .iter()
            .find(|s| s.supports(&url))
            .cloned()
            .ok_or_else(|| InputError::InvalidUrl(format!("no strategy handles '{}'", url.scheme())))
    }

    /// Built-in strategies: Vimeo first so `auto` prefers it for Vimeo hosts.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(VimeoStrategy::new(&config.vimeo)));
        registry.register(Arc::new(GenericStrategy::new()));
        registry
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_prefers_vimeo_for_vimeo_hosts() {
        let registry = StrategyRegistry::default();

        let strategy = registry.resolve(AUTO, "https://player.vimeo.com/video/1").unwrap();
        assert_eq!(strategy.name(), "vimeo");

        let strategy = registry.resolve(AUTO, "https://soundcloud.com/a/b").unwrap();
        assert_eq!(strategy.name(), "generic");
    }

    #[test]
    fn test_named_resolution_ignores_host() {
        let registry = StrategyRegistry::default();
        let strategy = registry.resolve("vimeo", "https://example.com/12345").unwrap();
        assert_eq!(strategy.name(), "vimeo");
    }

    #[test]
    fn test_unknown_strategy() {
        let registry = StrategyRegistry::default();
        assert!(matches!(
            registry.resolve("dailymotion", "https://example.com"),
            Err(InputError::UnknownStrategy(_))
        ));
        assert!(registry.has_strategy(AUTO));
        assert!(!registry.has_strategy("dailymotion"));
    }

    #[test]
    fn test_auto_rejects_unparseable_url() {
        let registry = StrategyRegistry::default();
        assert!(matches!(
            registry.resolve(AUTO, "vimeo 123"),
            Err(InputError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_register_replaces_same_name() {
        let mut registry = StrategyRegistry::default();
        registry.register(Arc::new(GenericStrategy::new()));
        assert_eq!(registry.names(), vec!["vimeo", "generic"]);
    }
}
