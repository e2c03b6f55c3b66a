//! RECOVER handler

use tracing::info;

use super::map_transfer_failure;
use crate::effect::Effect;
use crate::error::OtpKitError;
use crate::ledger::Ledger;
use crate::state::{WalletAccount, WalletState};

/// Sweeps the whole balance to the recovery address, then forwards every
/// later payment there.
pub fn process_recover<L: Ledger>(
    wallet: &WalletAccount,
    state: &mut WalletState,
    ledger: &mut L,
) -> Result<Vec<Effect>, OtpKitError> {
    if state.is_recovered() {
        return Err(OtpKitError::WalletRecovered);
    }
    let recovery = state
        .recovery_address()
        .filter(|a| !a.is_zero())
        .ok_or(OtpKitError::LastResortAddressNotSet)?;
    let address = *wallet.address();
    let balance = ledger.balance_of(&address);

    let relayed = if balance > 0 {
        ledger
            .transfer(&address, &recovery, balance)
            .map_err(map_transfer_failure)?
    } else {
        Vec::new()
    };
    state.set_forward_address(recovery);
    state.mark_recovered();
    info!(wallet = %address, %recovery, balance, "recovery triggered");

    let mut effects = vec![Effect::RecoveryTriggered {
        address: recovery,
        amount: balance,
    }];
    effects.extend(relayed);
    Ok(effects)
}
