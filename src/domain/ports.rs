use crate::domain::config::ConfigEntry;
use crate::domain::package::CreditPackage;
use crate::error::Result;
use async_trait::async_trait;

/// Read-only access to persisted platform configuration rows.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<ConfigEntry>>;
}

/// Read-only access to the credit package catalog rows.
#[async_trait]
pub trait PackageStore: Send + Sync {
    async fn load_all(&self) -> Result<Vec<CreditPackage>>;
}

pub type ConfigStoreBox = Box<dyn ConfigStore>;
pub type PackageStoreBox = Box<dyn PackageStore>;
