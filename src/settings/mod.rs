//! Configuration Registry (C9): a process-wide singleton holding default provider/
//! model, API keys, retry/timeout policy, and a provider-name -> factory registry
//! used to build an [`Lm`] on demand.
//!
//! Grounded on the teacher's `core/settings.rs` (`LazyLock<RwLock<Option<Settings>>>`
//! plus a `configure` free function) — generalized here to hold a provider registry
//! instead of a single fixed `LM`/`Adapter` pair, since this crate supports more than
//! one provider.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, RwLock};
use std::time::Duration;

use crate::cache::Cache;
use crate::core::ConfigurationError;
use crate::lm::Lm;
use crate::observability::{Collector, ObservabilityWrapper};
use crate::providers::DummyLm;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_RETRIES: u32 = 3;

/// Builds an [`Lm`] for a given model string, given the rest of [`Settings`] (API
/// keys, timeout) for context.
pub type ProviderFactory = Arc<dyn Fn(&str, &Settings) -> Result<Arc<dyn Lm>, ConfigurationError> + Send + Sync>;

pub struct Settings {
    pub default_provider: Option<String>,
    pub default_model: Option<String>,
    pub default_timeout: Duration,
    pub max_retries: u32,
    pub tracing_enabled: bool,
    pub api_keys: HashMap<String, String>,
    pub default_collector: Option<Arc<dyn Collector>>,
    pub default_cache: Option<Arc<Cache>>,
    pub cache_ttl: Option<Duration>,
    providers: HashMap<String, ProviderFactory>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut providers: HashMap<String, ProviderFactory> = HashMap::new();
        providers.insert(
            "dummy".to_string(),
            Arc::new(|model: &str, _settings: &Settings| {
                Ok(Arc::new(DummyLm::new().with_name(model)) as Arc<dyn Lm>)
            }),
        );
        Settings {
            default_provider: None,
            default_model: None,
            default_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            tracing_enabled: false,
            api_keys: HashMap::new(),
            default_collector: None,
            default_cache: None,
            cache_ttl: None,
            providers,
        }
    }
}

impl Settings {
    pub fn register_provider(&mut self, name: impl Into<String>, factory: ProviderFactory) {
        self.providers.insert(name.into(), factory);
    }

    pub fn api_key(&self, provider: &str) -> Option<&str> {
        self.api_keys.get(provider).map(String::as_str)
    }
}

pub static GLOBAL_SETTINGS: LazyLock<RwLock<Settings>> = LazyLock::new(|| RwLock::new(Settings::default()));

/// Applies a functional update to the global settings under a single write lock.
pub fn configure(f: impl FnOnce(&mut Settings)) {
    let mut settings = GLOBAL_SETTINGS.write().unwrap();
    f(&mut settings);
}

/// Parses `"provider/model"` into its two parts; a bare model with no recognized
/// prefix is returned unchanged with `provider == None` (spec §4.9: `openrouter/`,
/// `openai/`, `anthropic/` prefixes are stripped when present).
fn split_provider_prefix(model: &str) -> (Option<&str>, &str) {
    for prefix in ["openrouter", "openai", "anthropic"] {
        if let Some(rest) = model.strip_prefix(&format!("{prefix}/")) {
            return (Some(prefix), rest);
        }
    }
    match model.split_once('/') {
        Some((provider, rest)) => (Some(provider), rest),
        None => (None, model),
    }
}

/// Builds an [`Lm`] for `model` (or the configured default model if `None`),
/// wrapping it in [`ObservabilityWrapper`] when a default collector is configured.
/// Mirrors the teacher's `NewLM`-style factory, generalized to a provider registry.
pub fn new_lm(model: Option<&str>) -> Result<Arc<dyn Lm>, ConfigurationError> {
    let settings = GLOBAL_SETTINGS.read().unwrap();

    let requested = model
        .map(str::to_string)
        .or_else(|| settings.default_model.clone())
        .ok_or(ConfigurationError::NoModel)?;

    let (prefixed_provider, bare_model) = split_provider_prefix(&requested);
    let provider = prefixed_provider
        .map(str::to_string)
        .or_else(|| settings.default_provider.clone())
        .ok_or(ConfigurationError::NoProvider)?;

    let factory = settings
        .providers
        .get(&provider)
        .cloned()
        .ok_or_else(|| ConfigurationError::UnregisteredProvider(provider.clone()))?;

    let base = factory(bare_model, &settings)?;

    Ok(match &settings.default_collector {
        Some(collector) => Arc::new(
            ObservabilityWrapper::new(base)
                .with_provider(provider)
                .with_collector(collector.clone()),
        ),
        None => base,
    })
}

/// Applies `LLMRT_`-prefixed environment variables to the global settings:
/// `LLMRT_PROVIDER`, `LLMRT_MODEL`, `LLMRT_TIMEOUT_SECS`, `LLMRT_MAX_RETRIES`,
/// `LLMRT_TRACING`, and `LLMRT_API_KEY_<PROVIDER>` (provider name uppercased).
pub fn from_env() {
    configure(|settings| {
        if let Ok(provider) = std::env::var("LLMRT_PROVIDER") {
            settings.default_provider = Some(provider);
        }
        if let Ok(model) = std::env::var("LLMRT_MODEL") {
            settings.default_model = Some(model);
        }
        if let Ok(secs) = std::env::var("LLMRT_TIMEOUT_SECS") {
            if let Ok(secs) = secs.parse() {
                settings.default_timeout = Duration::from_secs(secs);
            }
        }
        if let Ok(retries) = std::env::var("LLMRT_MAX_RETRIES") {
            if let Ok(retries) = retries.parse() {
                settings.max_retries = retries;
            }
        }
        if let Ok(tracing) = std::env::var("LLMRT_TRACING") {
            settings.tracing_enabled = tracing == "1" || tracing.eq_ignore_ascii_case("true");
        }

        for (key, value) in std::env::vars() {
            if let Some(provider) = key.strip_prefix("LLMRT_API_KEY_") {
                settings.api_keys.insert(provider.to_lowercase(), value);
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;

    // Serializes tests against the process-global singleton.
    static TEST_LOCK: StdMutex<()> = StdMutex::new(());

    fn reset() {
        let mut settings = GLOBAL_SETTINGS.write().unwrap();
        *settings = Settings::default();
    }

    #[test]
    fn no_model_configured_is_a_configuration_error() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset();
        let result = new_lm(None);
        assert!(matches!(result, Err(ConfigurationError::NoModel)));
    }

    #[test]
    fn prefixed_model_strips_provider_and_resolves_factory() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset();
        let lm = new_lm(Some("dummy/my-model")).unwrap();
        assert_eq!(lm.name(), "my-model");
    }

    #[test]
    fn unregistered_provider_is_a_configuration_error() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset();
        let result = new_lm(Some("nonexistent/my-model"));
        assert!(matches!(result, Err(ConfigurationError::UnregisteredProvider(_))));
    }

    #[test]
    fn default_provider_and_model_are_used_when_none_given() {
        let _guard = TEST_LOCK.lock().unwrap();
        reset();
        configure(|s| {
            s.default_provider = Some("dummy".to_string());
            s.default_model = Some("fallback-model".to_string());
        });
        let lm = new_lm(None).unwrap();
        assert_eq!(lm.name(), "fallback-model");
    }
}
