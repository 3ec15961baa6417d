use crate::domain::config::ConfigEntry;
use crate::domain::package::CreditPackage;
use crate::domain::ports::{ConfigStore, PackageStore};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory store for platform configuration entries.
///
/// Uses `Arc<RwLock<HashMap<..>>>` to allow shared concurrent access.
/// Ideal for tests and for hosts running without a durable config store.
#[derive(Default, Clone)]
pub struct InMemoryConfigStore {
    entries: Arc<RwLock<HashMap<String, ConfigEntry>>>,
}

impl InMemoryConfigStore {
    /// Creates a new, empty in-memory config store.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, entry: ConfigEntry) {
        let mut entries = self.entries.write().await;
        entries.insert(entry.key.clone(), entry);
    }
}

#[async_trait]
impl ConfigStore for InMemoryConfigStore {
    async fn load_all(&self) -> Result<Vec<ConfigEntry>> {
        let entries = self.entries.read().await;
        Ok(entries.values().cloned().collect())
    }
}

/// A thread-safe in-memory source of credit package rows.
#[derive(Default, Clone)]
pub struct InMemoryPackageStore {
    packages: Arc<RwLock<Vec<CreditPackage>>>,
}

impl InMemoryPackageStore {
    /// Creates a new, empty in-memory package store.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_packages(packages: Vec<CreditPackage>) -> Self {
        Self {
            packages: Arc::new(RwLock::new(packages)),
        }
    }

    pub async fn push(&self, package: CreditPackage) {
        self.packages.write().await.push(package);
    }
}

#[async_trait]
impl PackageStore for InMemoryPackageStore {
    async fn load_all(&self) -> Result<Vec<CreditPackage>> {
        let packages = self.packages.read().await;
        Ok(packages.clone())
    }
}
