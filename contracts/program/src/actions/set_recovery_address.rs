//! SET_RECOVERY_ADDRESS handler

use otp_assertions::{check_bytes_differ, check_nonzero};

use crate::effect::Effect;
use crate::error::OtpKitError;
use crate::instruction::OperationParams;
use crate::state::{WalletAccount, WalletState};

pub fn process_set_recovery_address(
    wallet: &WalletAccount,
    state: &mut WalletState,
    params: &OperationParams,
) -> Result<Vec<Effect>, OtpKitError> {
    if state.is_recovered() {
        return Err(OtpKitError::WalletRecovered);
    }
    let dest = params.dest;
    check_nonzero(dest.as_bytes(), OtpKitError::ZeroAddress)?;
    check_bytes_differ(
        dest.as_bytes(),
        wallet.address().as_bytes(),
        OtpKitError::SelfAddress,
    )?;
    if state.recovery_address() == Some(dest) {
        return Err(OtpKitError::UnchangedAddress);
    }

    state.set_recovery_address(dest);
    Ok(vec![Effect::RecoveryAddressUpdated { address: dest }])
}
