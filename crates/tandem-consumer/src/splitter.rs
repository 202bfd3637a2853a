use cosmwasm_std::Decimal256;
use tandem_core::{
    to_decimal, Coins, CoreError, LedgerAccessor, CONS_REDISTRIBUTE, CONS_TO_SEND_TO_PROVIDER, FEE_COLLECTOR,
};

use crate::error::{ConsumerError, ConsumerResult};

/// Split `fee_pool` into the locally retained share and the share owed to
/// the provider.
///
/// `local` is truncated per denom; `to_send` is the exact complement, so
/// `local + to_send == fee_pool`.
pub fn split(fee_pool: &Coins, local_fraction: Decimal256) -> ConsumerResult<(Coins, Coins)> {
    if local_fraction > Decimal256::one() {
        return Err(ConsumerError::InvalidFraction {
            value: local_fraction.to_string(),
        });
    }

    let mut local = Coins::new();
    for (denom, amount) in fee_pool.iter() {
        let share = to_decimal(amount)?
            .checked_mul(local_fraction)
            .map_err(CoreError::from)?
            .to_uint_floor();
        local.add_amount(denom, share)?;
    }
    let to_send = fee_pool.checked_sub(&local)?;
    Ok((local, to_send))
}

/// Drain the fee collector into the redistribution and to-send accounts.
/// Returns the amounts moved; both empty when there were no fees.
pub fn distribute_fees<L: LedgerAccessor + ?Sized>(
    ledger: &mut L,
    local_fraction: Decimal256,
) -> ConsumerResult<(Coins, Coins)> {
    let fees = ledger.balances(FEE_COLLECTOR);
    if fees.is_empty() {
        return Ok((Coins::new(), Coins::new()));
    }

    let (local, to_send) = split(&fees, local_fraction)?;
    ledger.transfer(FEE_COLLECTOR, CONS_REDISTRIBUTE, &local)?;
    ledger.transfer(FEE_COLLECTOR, CONS_TO_SEND_TO_PROVIDER, &to_send)?;
    log::debug!(
        "fees split: {} kept for redistribution, {} queued for provider",
        local,
        to_send
    );
    Ok((local, to_send))
}
