use crate::domain::breakdown::CommissionTier;
use chrono::Duration;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Built-in configuration keys. Every key the calculator or the ledger
/// depends on has a code-level default, so resolution succeeds with zero
/// persisted configuration.
pub mod keys {
    pub const WORKER_VERIFIED_FEE_PERCENT: &str = "commission.worker_verified_fee_percent";
    pub const WORKER_UNVERIFIED_FEE_PERCENT: &str = "commission.worker_unverified_fee_percent";
    pub const CLIENT_FEE_PERCENT: &str = "commission.client_fee_percent";
    pub const TDS_PERCENT: &str = "tax.tds_percent";
    pub const GST_ON_FEE_PERCENT: &str = "tax.gst_on_fee_percent";
    pub const RESERVATION_TTL_MINUTES: &str = "credits.reservation_ttl_minutes";
    pub const EXPIRY_SWEEP_SECONDS: &str = "credits.expiry_sweep_seconds";
    pub const SUBSCRIPTIONS_ENABLED: &str = "features.subscriptions_enabled";
    pub const INVOICE_SETTINGS: &str = "invoice.settings";
}

/// A typed configuration value. Persisted entries are coerced to the kind
/// expected for their key; a mismatch falls back to the default.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "value")]
pub enum ConfigValue {
    Number(Decimal),
    Bool(bool),
    Record(serde_json::Value),
}

/// The kind a given key is expected to parse to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Bool,
    Record,
}

impl ConfigValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            ConfigValue::Number(_) => ValueKind::Number,
            ConfigValue::Bool(_) => ValueKind::Bool,
            ConfigValue::Record(_) => ValueKind::Record,
        }
    }
}

/// A persisted configuration row as the durable store hands it over:
/// untyped value, validated only at resolution time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: serde_json::Value,
    pub description: String,
}

impl ConfigEntry {
    pub fn new(key: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            key: key.into(),
            value,
            description: String::new(),
        }
    }
}

/// One built-in key with its default value and expected kind.
pub struct ConfigDefault {
    pub key: &'static str,
    pub value: ConfigValue,
    pub description: &'static str,
}

/// The full table of built-in defaults, part of the core's code rather
/// than external configuration.
pub fn builtin_defaults() -> Vec<ConfigDefault> {
    vec![
        ConfigDefault {
            key: keys::WORKER_VERIFIED_FEE_PERCENT,
            value: ConfigValue::Number(dec!(0.05)),
            description: "Platform commission rate for KYC-verified workers",
        },
        ConfigDefault {
            key: keys::WORKER_UNVERIFIED_FEE_PERCENT,
            value: ConfigValue::Number(dec!(0.10)),
            description: "Platform commission rate for unverified workers",
        },
        ConfigDefault {
            key: keys::CLIENT_FEE_PERCENT,
            value: ConfigValue::Number(dec!(0.10)),
            description: "Flat platform commission rate for clients",
        },
        ConfigDefault {
            key: keys::TDS_PERCENT,
            value: ConfigValue::Number(dec!(0.10)),
            description: "Tax withheld at source from payee settlements",
        },
        ConfigDefault {
            key: keys::GST_ON_FEE_PERCENT,
            value: ConfigValue::Number(dec!(0.18)),
            description: "GST levied on the platform fee, reported for invoicing",
        },
        ConfigDefault {
            key: keys::RESERVATION_TTL_MINUTES,
            value: ConfigValue::Number(dec!(15)),
            description: "Minutes before an unsettled credit hold expires",
        },
        ConfigDefault {
            key: keys::EXPIRY_SWEEP_SECONDS,
            value: ConfigValue::Number(dec!(60)),
            description: "Interval between background expiry sweeps",
        },
        ConfigDefault {
            key: keys::SUBSCRIPTIONS_ENABLED,
            value: ConfigValue::Bool(true),
            description: "Whether subscription entitlements can be activated",
        },
        ConfigDefault {
            key: keys::INVOICE_SETTINGS,
            value: ConfigValue::Record(serde_json::json!({
                "number_prefix": "INV",
                "show_gst_breakup": true,
            })),
            description: "Invoice rendering settings for settlement receipts",
        },
    ]
}

/// An immutable point-in-time view of the platform configuration.
///
/// Always contains a value for every built-in key. Two snapshots taken
/// moments apart are not guaranteed to be identical.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    values: HashMap<&'static str, ConfigValue>,
}

impl ConfigSnapshot {
    /// A snapshot holding exactly the built-in defaults.
    pub fn defaults() -> Self {
        let values = builtin_defaults()
            .into_iter()
            .map(|d| (d.key, d.value))
            .collect();
        Self { values }
    }

    pub(crate) fn set(&mut self, key: &'static str, value: ConfigValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.values.get(key)
    }

    fn number(&self, key: &str, fallback: Decimal) -> Decimal {
        match self.values.get(key) {
            Some(ConfigValue::Number(n)) => *n,
            _ => fallback,
        }
    }

    fn bool(&self, key: &str, fallback: bool) -> bool {
        match self.values.get(key) {
            Some(ConfigValue::Bool(b)) => *b,
            _ => fallback,
        }
    }

    /// Commission tier for a worker, selected by verification status.
    pub fn worker_tier(&self, verified: bool) -> CommissionTier {
        let fee_key = if verified {
            keys::WORKER_VERIFIED_FEE_PERCENT
        } else {
            keys::WORKER_UNVERIFIED_FEE_PERCENT
        };
        let fee_fallback = if verified { dec!(0.05) } else { dec!(0.10) };
        CommissionTier {
            platform_fee_percent: self.number(fee_key, fee_fallback),
            tds_percent: self.number(keys::TDS_PERCENT, dec!(0.10)),
            gst_percent_on_fee: self.number(keys::GST_ON_FEE_PERCENT, dec!(0.18)),
        }
    }

    /// Flat commission tier for clients, independent of verification.
    pub fn client_tier(&self) -> CommissionTier {
        CommissionTier {
            platform_fee_percent: self.number(keys::CLIENT_FEE_PERCENT, dec!(0.10)),
            tds_percent: self.number(keys::TDS_PERCENT, dec!(0.10)),
            gst_percent_on_fee: self.number(keys::GST_ON_FEE_PERCENT, dec!(0.18)),
        }
    }

    pub fn reservation_ttl(&self) -> Duration {
        let minutes = self
            .number(keys::RESERVATION_TTL_MINUTES, dec!(15))
            .to_i64()
            .unwrap_or(15);
        Duration::minutes(minutes)
    }

    pub fn expiry_sweep_interval(&self) -> std::time::Duration {
        let seconds = self
            .number(keys::EXPIRY_SWEEP_SECONDS, dec!(60))
            .to_u64()
            .unwrap_or(60);
        std::time::Duration::from_secs(seconds)
    }

    pub fn subscriptions_enabled(&self) -> bool {
        self.bool(keys::SUBSCRIPTIONS_ENABLED, true)
    }
}
