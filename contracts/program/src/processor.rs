//! Operation Processor
//!
//! Each attempt moves through `AwaitingProof -> Verified -> Applied`, or
//! stops as a rejection. The typestates below make the order explicit: only
//! a [`Verified`] attempt can be applied, and applying works on a copy of the
//! wallet state that replaces the original only after every effect succeeded.

use tracing::{debug, info, warn};

use crate::actions::{self, ProofKind, VerifiedProof};
use crate::effect::Receipt;
use crate::error::OtpKitError;
use crate::instruction::{AuthorizationRequest, OperationType};
use crate::ledger::Ledger;
use crate::state::WalletAccount;

/// An attempt whose proof has not been checked yet.
pub struct AwaitingProof<'a> {
    request: &'a AuthorizationRequest,
}

/// An attempt whose proof checked out against the wallet's commitment.
pub struct Verified<'a> {
    request: &'a AuthorizationRequest,
    proof: VerifiedProof,
}

impl<'a> AwaitingProof<'a> {
    pub fn new(request: &'a AuthorizationRequest) -> Self {
        Self { request }
    }

    pub fn verify(self, wallet: &WalletAccount) -> Result<Verified<'a>, OtpKitError> {
        let proof = actions::authenticate_proof(wallet, self.request)?;
        Ok(Verified {
            request: self.request,
            proof,
        })
    }
}

impl<'a> Verified<'a> {
    pub fn proof(&self) -> &VerifiedProof {
        &self.proof
    }

    pub fn apply<L: Ledger>(
        self,
        wallet: &mut WalletAccount,
        ledger: &mut L,
    ) -> Result<Receipt, OtpKitError> {
        let request = self.request;
        let params = &request.params;
        let mut next = wallet.state().clone();
        next.advance(request.timestamp, self.proof.commit())?;
        if self.proof.kind == ProofKind::Recovery {
            next.spend_recovery_leaf();
        }

        let effects = match params.operation_type {
            OperationType::Transfer => {
                actions::process_transfer(wallet, &mut next, ledger, params, request.timestamp)?
            },
            OperationType::SetRecoveryAddress => {
                actions::process_set_recovery_address(wallet, &mut next, params)?
            },
            OperationType::Recover => actions::process_recover(wallet, &mut next, ledger)?,
            OperationType::Forward => actions::process_forward(wallet, &mut next, params)?,
        };

        let nonce = next.nonce();
        wallet.commit(next);
        Ok(Receipt {
            wallet: *wallet.address(),
            nonce,
            effects,
        })
    }
}

/// The single entry point that mutates a wallet.
pub fn process_operation<L: Ledger>(
    wallet: &mut WalletAccount,
    ledger: &mut L,
    request: &AuthorizationRequest,
) -> Result<Receipt, OtpKitError> {
    debug!(
        wallet = %wallet.address(),
        operation = ?request.params.operation_type,
        index = request.index,
        timestamp = request.timestamp,
        "processing operation"
    );
    let outcome = AwaitingProof::new(request)
        .verify(wallet)
        .and_then(|verified| verified.apply(wallet, ledger));
    match &outcome {
        Ok(receipt) => info!(
            wallet = %receipt.wallet,
            nonce = receipt.nonce,
            effects = receipt.effects.len(),
            "operation applied"
        ),
        Err(e) => warn!(wallet = %wallet.address(), error = %e, "operation rejected"),
    }
    outcome
}

/// Decodes a borsh-encoded [`AuthorizationRequest`] and processes it.
pub fn process_instruction<L: Ledger>(
    wallet: &mut WalletAccount,
    ledger: &mut L,
    instruction_data: &[u8],
) -> Result<Receipt, OtpKitError> {
    let request = AuthorizationRequest::unpack(instruction_data).map_err(|e| {
        warn!("Failed to unpack instruction: {:?}", e);
        e
    })?;
    process_operation(wallet, ledger, &request)
}
