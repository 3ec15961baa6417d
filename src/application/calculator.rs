use crate::domain::breakdown::{CommissionTier, PaymentBreakdown};
use crate::error::{Result, SettlementError};
use rust_decimal::{Decimal, RoundingStrategy};

const MINOR_UNIT_DECIMALS: u32 = 2;

fn round(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(MINOR_UNIT_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}

/// Computes the settlement breakdown for a gross contract amount under the
/// given commission tier. Pure and deterministic.
///
/// Rejects negative gross amounts and tiers whose platform fee plus TDS
/// exceed 100%, so the returned `net_amount` is never negative and no
/// ledger mutation can happen on a bad contract amount.
pub fn compute_breakdown(gross: Decimal, tier: &CommissionTier) -> Result<PaymentBreakdown> {
    if gross < Decimal::ZERO {
        return Err(SettlementError::InvalidBreakdownInput(format!(
            "gross amount must be non-negative, got {gross}"
        )));
    }
    tier.validate()?;

    let gross_amount = round(gross);
    let platform_fee = round(gross * tier.platform_fee_percent);
    let tds_amount = round(gross * tier.tds_percent);
    // GST is owed on the platform's fee revenue, not on the payee. It is
    // reported for invoicing and never subtracted from the net amount.
    let gst_amount = round(platform_fee * tier.gst_percent_on_fee);
    let net_amount = round(gross - platform_fee - tds_amount);

    Ok(PaymentBreakdown {
        gross_amount,
        platform_fee,
        tds_amount,
        gst_amount,
        net_amount,
    })
}
