//! FORWARD handler

use otp_assertions::{check_bytes_differ, check_nonzero};

use crate::effect::Effect;
use crate::error::OtpKitError;
use crate::instruction::OperationParams;
use crate::state::{WalletAccount, WalletState};

/// Points the wallet at a successor without sweeping its balance. Spends the
/// recovery leaf, so a wallet is relinked at most once.
pub fn process_forward(
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

    state.set_forward_address(dest);
    Ok(vec![Effect::ForwardAddressUpdated { dest }])
}
