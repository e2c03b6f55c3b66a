//! TRANSFER handler

use otp_assertions::check_sufficient;
use otpkit_state::Address;
use tracing::debug;

use super::map_transfer_failure;
use crate::effect::Effect;
use crate::error::OtpKitError;
use crate::instruction::OperationParams;
use crate::ledger::Ledger;
use crate::state::{WalletAccount, WalletState};

pub fn process_transfer<L: Ledger>(
    wallet: &WalletAccount,
    state: &mut WalletState,
    ledger: &mut L,
    params: &OperationParams,
    timestamp: u64,
) -> Result<Vec<Effect>, OtpKitError> {
    let address = *wallet.address();

    // === 1. FORWARDING ===
    // A forwarding wallet sends everything to its forward address and skips
    // the spending limit.
    if let Some(forward) = state.forward_address() {
        return forward_payment(&address, &forward, ledger, params.amount);
    }

    // === 2. SPENDING LIMIT ===
    let spending = wallet
        .spend_limit()
        .check_transfer(state.spending(), params.amount, timestamp)
        .map_err(|e| {
            debug!(%e, "spending limit check failed");
            OtpKitError::ExceedSpendingLimit
        })?;

    // === 3. BALANCE ===
    check_sufficient(
        ledger.balance_of(&address),
        params.amount,
        OtpKitError::InsufficientFund,
    )?;

    // === 4. TRANSFER ===
    let relayed = ledger
        .transfer(&address, &params.dest, params.amount)
        .map_err(map_transfer_failure)?;
    state.set_spending(spending);

    let mut effects = vec![Effect::PaymentSent {
        dest: params.dest,
        amount: params.amount,
    }];
    effects.extend(relayed);
    Ok(effects)
}

fn forward_payment<L: Ledger>(
    address: &Address,
    forward: &Address,
    ledger: &mut L,
    amount: u128,
) -> Result<Vec<Effect>, OtpKitError> {
    check_sufficient(ledger.balance_of(address), amount, OtpKitError::InsufficientFund)?;
    let relayed = ledger
        .transfer(address, forward, amount)
        .map_err(map_transfer_failure)?;
    let mut effects = vec![Effect::PaymentForwarded {
        wallet: *address,
        dest: *forward,
        amount,
    }];
    effects.extend(relayed);
    Ok(effects)
}
