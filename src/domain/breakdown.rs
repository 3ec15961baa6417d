use crate::error::SettlementError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The percentage rates applicable to a payment, selected by the caller
/// from the account's verification status or role.
///
/// Each rate is a fraction in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CommissionTier {
    pub platform_fee_percent: Decimal,
    pub tds_percent: Decimal,
    pub gst_percent_on_fee: Decimal,
}

impl CommissionTier {
    pub fn validate(&self) -> Result<(), SettlementError> {
        for (name, rate) in [
            ("platform_fee_percent", self.platform_fee_percent),
            ("tds_percent", self.tds_percent),
            ("gst_percent_on_fee", self.gst_percent_on_fee),
        ] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(SettlementError::InvalidBreakdownInput(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.platform_fee_percent + self.tds_percent > Decimal::ONE {
            return Err(SettlementError::InvalidBreakdownInput(format!(
                "platform fee {} plus TDS {} exceeds 100%, net amount would be negative",
                self.platform_fee_percent, self.tds_percent
            )));
        }
        Ok(())
    }
}

/// Settlement amounts derived from a gross contract amount and a tier.
///
/// `gst_amount` is the tax on the platform's fee revenue. It is reported
/// for invoicing but never subtracted from `net_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PaymentBreakdown {
    pub gross_amount: Decimal,
    pub platform_fee: Decimal,
    pub tds_amount: Decimal,
    pub gst_amount: Decimal,
    pub net_amount: Decimal,
}
