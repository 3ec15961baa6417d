use crate::domain::account::Credits;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which side of the marketplace a package is sold to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Worker,
    Client,
    Both,
}

impl AccountType {
    /// Whether a package sold to `self` applies to the given audience.
    pub fn applies_to(self, audience: AccountType) -> bool {
        self == audience || self == AccountType::Both
    }
}

/// A purchasable credit bundle. Read-only from the ledger's perspective;
/// the external payment flow calls `top_up` once a purchase is confirmed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPackage {
    pub id: String,
    pub account_type: AccountType,
    pub credits: Credits,
    pub price: Decimal,
    pub is_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_type_applicability() {
        assert!(AccountType::Worker.applies_to(AccountType::Worker));
        assert!(AccountType::Both.applies_to(AccountType::Worker));
        assert!(AccountType::Both.applies_to(AccountType::Client));
        assert!(!AccountType::Client.applies_to(AccountType::Worker));
    }
}
