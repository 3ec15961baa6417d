use crate::domain::package::{AccountType, CreditPackage};
use crate::domain::ports::PackageStoreBox;
use crate::error::Result;

/// Queryable catalog of purchasable credit bundles.
pub struct PackageCatalog {
    store: PackageStoreBox,
}

impl PackageCatalog {
    pub fn new(store: PackageStoreBox) -> Self {
        Self { store }
    }

    /// Active packages applicable to the given audience, ordered by
    /// ascending credit amount.
    pub async fn list(&self, audience: AccountType) -> Result<Vec<CreditPackage>> {
        let mut packages: Vec<_> = self
            .store
            .load_all()
            .await?
            .into_iter()
            .filter(|p| p.is_active && p.account_type.applies_to(audience))
            .collect();
        packages.sort_by_key(|p| p.credits);
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::Credits;
    use crate::infrastructure::in_memory::InMemoryPackageStore;
    use rust_decimal_macros::dec;

    fn package(id: &str, account_type: AccountType, credits: u64, active: bool) -> CreditPackage {
        CreditPackage {
            id: id.to_string(),
            account_type,
            credits: Credits::new(credits),
            price: dec!(99.00),
            is_active: active,
        }
    }

    fn catalog() -> PackageCatalog {
        let store = InMemoryPackageStore::with_packages(vec![
            package("worker-large", AccountType::Worker, 50, true),
            package("client-starter", AccountType::Client, 10, true),
            package("shared-medium", AccountType::Both, 25, true),
            package("worker-starter", AccountType::Worker, 5, true),
            package("worker-retired", AccountType::Worker, 15, false),
        ]);
        PackageCatalog::new(Box::new(store))
    }

    #[tokio::test]
    async fn test_list_filters_audience_and_active() {
        let listed = catalog().list(AccountType::Worker).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
        // Client-only and inactive packages excluded; ascending by credits.
        assert_eq!(ids, vec!["worker-starter", "shared-medium", "worker-large"]);
    }

    #[tokio::test]
    async fn test_list_for_clients() {
        let listed = catalog().list(AccountType::Client).await.unwrap();
        let ids: Vec<_> = listed.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["client-starter", "shared-medium"]);
    }

    #[tokio::test]
    async fn test_empty_catalog() {
        let catalog = PackageCatalog::new(Box::new(InMemoryPackageStore::new()));
        assert!(catalog.list(AccountType::Worker).await.unwrap().is_empty());
    }
}
