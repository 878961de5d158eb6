//! Address derivation for the per-owner vault and vault state accounts.
//!
//! Both addresses are program-derived: they sit off the ed25519 curve, so no
//! private key can sign for them and only this program can move lamports out
//! of the vault by presenting the seeds. Anyone can recompute them, which is
//! how a client predicts the vault address before its first deposit.

use anchor_lang::prelude::*;

use crate::constants::{VAULT_SEED, VAULT_STATE_SEED};
use crate::error::VaultError;

/// Find the canonical vault PDA and bump for `owner`.
pub fn find_vault_address(owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_SEED, owner.as_ref()], program_id)
}

/// Find the canonical vault state PDA and bump for `owner`.
pub fn find_vault_state_address(owner: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_STATE_SEED, owner.as_ref()], program_id)
}

/// Check that `supplied` is the canonical vault PDA for `owner`, returning the bump.
///
/// Used when no bump has been recorded yet (first deposit of a cycle).
pub fn verify_vault_address(
    supplied: &Pubkey,
    owner: &Pubkey,
    program_id: &Pubkey,
) -> Result<u8> {
    let (expected, bump) = find_vault_address(owner, program_id);
    require_keys_eq!(*supplied, expected, VaultError::Authorization);
    Ok(bump)
}

/// Check that `supplied` is the canonical vault state PDA for `owner`, returning the bump.
pub fn verify_vault_state_address(
    supplied: &Pubkey,
    owner: &Pubkey,
    program_id: &Pubkey,
) -> Result<u8> {
    let (expected, bump) = find_vault_state_address(owner, program_id);
    require_keys_eq!(*supplied, expected, VaultError::Authorization);
    Ok(bump)
}

/// Re-derive an address from `seed`, `owner` and a recorded `bump` and compare.
///
/// A recorded bump is only ever the canonical one, so this is the cheap path
/// once the vault state exists. A bump that does not produce a valid PDA is
/// treated the same as a mismatch.
pub fn verify_with_bump(
    supplied: &Pubkey,
    seed: &[u8],
    owner: &Pubkey,
    bump: u8,
    program_id: &Pubkey,
) -> Result<()> {
    let expected = Pubkey::create_program_address(&[seed, owner.as_ref(), &[bump]], program_id)
        .map_err(|_| error!(VaultError::Authorization))?;
    require_keys_eq!(*supplied, expected, VaultError::Authorization);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(byte: u8) -> Pubkey {
        Pubkey::new_from_array([byte; 32])
    }

    #[test]
    fn derivation_is_deterministic_and_off_curve() {
        let (first, bump) = find_vault_address(&owner(1), &crate::ID);
        let (second, bump_again) = find_vault_address(&owner(1), &crate::ID);

        assert_eq!(first, second);
        assert_eq!(bump, bump_again);
        assert!(!first.is_on_curve());
    }

    #[test]
    fn owners_get_distinct_vaults() {
        let (alice, _) = find_vault_address(&owner(1), &crate::ID);
        let (bob, _) = find_vault_address(&owner(2), &crate::ID);

        assert_ne!(alice, bob);
    }

    #[test]
    fn vault_and_state_addresses_differ() {
        let (vault, _) = find_vault_address(&owner(1), &crate::ID);
        let (state, _) = find_vault_state_address(&owner(1), &crate::ID);

        assert_ne!(vault, state);
    }

    #[test]
    fn verify_rejects_foreign_vault() {
        let (bob_vault, _) = find_vault_address(&owner(2), &crate::ID);

        let err = verify_vault_address(&bob_vault, &owner(1), &crate::ID).unwrap_err();
        assert_eq!(err, VaultError::Authorization.into());
    }

    #[test]
    fn verify_rejects_arbitrary_address() {
        let err = verify_vault_state_address(&owner(9), &owner(1), &crate::ID).unwrap_err();
        assert_eq!(err, VaultError::Authorization.into());
    }

    #[test]
    fn verify_with_recorded_bump() {
        let (vault, bump) = find_vault_address(&owner(3), &crate::ID);

        assert_eq!(verify_vault_address(&vault, &owner(3), &crate::ID).unwrap(), bump);
        assert!(verify_with_bump(&vault, VAULT_SEED, &owner(3), bump, &crate::ID).is_ok());
    }

    #[test]
    fn verify_with_wrong_bump_fails() {
        let (vault, bump) = find_vault_address(&owner(3), &crate::ID);

        let err = verify_with_bump(&vault, VAULT_SEED, &owner(3), bump.wrapping_sub(1), &crate::ID)
            .unwrap_err();
        assert_eq!(err, VaultError::Authorization.into());
    }
}
