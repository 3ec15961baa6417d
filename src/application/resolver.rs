use crate::domain::config::{ConfigSnapshot, ConfigValue, ValueKind, builtin_defaults};
use crate::domain::ports::ConfigStoreBox;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Resolves the active platform configuration.
///
/// Each resolution reads the persisted entries in one pass and lays them
/// over the built-in defaults. A missing, unknown, or malformed entry never
/// fails the resolution; the default is used and the fallback is logged.
pub struct ConfigResolver {
    store: ConfigStoreBox,
}

impl ConfigResolver {
    pub fn new(store: ConfigStoreBox) -> Self {
        Self { store }
    }

    pub async fn resolve(&self) -> ConfigSnapshot {
        let mut snapshot = ConfigSnapshot::defaults();

        let entries = match self.store.load_all().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "config store unavailable, using built-in defaults");
                return snapshot;
            }
        };

        let persisted: HashMap<_, _> = entries.into_iter().map(|e| (e.key.clone(), e)).collect();
        let known: Vec<&'static str> = builtin_defaults().iter().map(|d| d.key).collect();

        for key in persisted.keys() {
            if !known.iter().any(|k| *k == key.as_str()) {
                debug!(key = %key, "ignoring unknown config key");
            }
        }

        for default in builtin_defaults() {
            let Some(entry) = persisted.get(default.key) else {
                continue;
            };
            match coerce(&entry.value, default.value.kind()) {
                Some(value) => snapshot.set(default.key, value),
                None => {
                    warn!(
                        key = default.key,
                        stored = %entry.value,
                        "config value malformed, falling back to default"
                    );
                }
            }
        }

        snapshot
    }
}

/// Coerces a raw persisted value to the kind expected for its key.
fn coerce(raw: &serde_json::Value, expected: ValueKind) -> Option<ConfigValue> {
    match expected {
        // Numbers go through their decimal text form, so a stored 0.07
        // arrives as exactly 0.07 rather than the nearest f64.
        ValueKind::Number => match raw {
            serde_json::Value::Number(n) => n.to_string().parse::<Decimal>().ok(),
            serde_json::Value::String(s) => s.parse::<Decimal>().ok(),
            _ => None,
        }
        .map(ConfigValue::Number),
        ValueKind::Bool => raw.as_bool().map(ConfigValue::Bool),
        ValueKind::Record => raw.is_object().then(|| ConfigValue::Record(raw.clone())),
    }
}
