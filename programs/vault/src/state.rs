use anchor_lang::prelude::*;

use crate::error::VaultError;

/// Per-owner bookkeeping for a vault cycle.
///
/// Lives at `[VAULT_STATE_SEED, owner]`, is created by the first deposit and
/// closed by the withdrawal that drains the vault. The Anchor discriminator is
/// the liveness marker: data without it is never read as a `VaultState`.
#[account]
#[derive(Debug, PartialEq, Eq)]
pub struct VaultState {
    /// Depositor that owns this vault. Never changes after creation.
    pub owner: Pubkey,
    /// Canonical bump of the vault PDA.
    pub vault_bump: u8,
    /// Canonical bump of this state account's own PDA.
    pub state_bump: u8,
    /// Lamports credited to the vault by deposits this cycle.
    pub total_deposited: u64,
    pub deposit_count: u32,
}

impl VaultState {
    pub const LEN: usize = 8 + // discriminator
        32 + // owner
        1 + // vault_bump
        1 + // state_bump
        8 + // total_deposited
        4; // deposit_count

    pub fn new(owner: Pubkey, vault_bump: u8, state_bump: u8) -> Self {
        Self {
            owner,
            vault_bump,
            state_bump,
            total_deposited: 0,
            deposit_count: 0,
        }
    }

    pub fn ensure_owner(&self, signer: &Pubkey) -> Result<()> {
        require_keys_eq!(self.owner, *signer, VaultError::Authorization);
        Ok(())
    }

    /// Returns the state after crediting `amount`, leaving `self` untouched.
    pub fn with_deposit(&self, amount: u64) -> Result<Self> {
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(VaultError::ArithmeticOverflow)?;
        let deposit_count = self
            .deposit_count
            .checked_add(1)
            .ok_or(VaultError::ArithmeticOverflow)?;

        Ok(Self {
            total_deposited,
            deposit_count,
            ..*self
        })
    }

    /// Decode a vault state from raw account data, discriminator included.
    pub fn load(data: &[u8]) -> Result<Self> {
        let mut slice = data;
        VaultState::try_deserialize(&mut slice)
    }

    /// Encode into raw account data, discriminator included.
    pub fn store(&self, data: &mut [u8]) -> Result<()> {
        let mut slice = data;
        self.try_serialize(&mut slice)
    }

    /// Read the vault state if one lives at `info`.
    ///
    /// An account with no data means no vault cycle is open. Anything with
    /// data must be owned by this program and carry the `VaultState`
    /// discriminator, otherwise it is a forged account.
    pub fn read_from(info: &AccountInfo, program_id: &Pubkey) -> Result<Option<Self>> {
        if info.data_is_empty() {
            return Ok(None);
        }
        require_keys_eq!(*info.owner, *program_id, VaultError::Authorization);

        let data = info.try_borrow_data()?;
        Self::load(&data[..])
            .map(Some)
            .map_err(|_| error!(VaultError::Authorization))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn len_matches_serialized_size() {
        let state = VaultState::new(Pubkey::new_from_array([7; 32]), 254, 253);
        let mut data = vec![0u8; VaultState::LEN];

        state.store(&mut data).unwrap();
        assert_eq!(&data[..8], VaultState::DISCRIMINATOR);
        assert_eq!(VaultState::load(&data).unwrap(), state);
    }

    #[test]
    fn load_rejects_zeroed_data() {
        let data = vec![0u8; VaultState::LEN];
        assert!(VaultState::load(&data).is_err());
    }

    #[test]
    fn deposit_bookkeeping_accumulates() {
        let state = VaultState::new(Pubkey::new_from_array([7; 32]), 254, 253)
            .with_deposit(20_000_000)
            .unwrap()
            .with_deposit(30_000_000)
            .unwrap();

        assert_eq!(state.total_deposited, 50_000_000);
        assert_eq!(state.deposit_count, 2);
        assert_eq!(state.vault_bump, 254);
    }

    #[test]
    fn deposit_bookkeeping_overflow() {
        let mut state = VaultState::new(Pubkey::new_from_array([7; 32]), 254, 253);
        state.total_deposited = u64::MAX;

        let err = state.with_deposit(1).unwrap_err();
        assert_eq!(err, VaultError::ArithmeticOverflow.into());
    }

    #[test]
    fn foreign_signer_is_rejected() {
        let state = VaultState::new(Pubkey::new_from_array([7; 32]), 254, 253);

        assert!(state.ensure_owner(&Pubkey::new_from_array([7; 32])).is_ok());
        let err = state.ensure_owner(&Pubkey::new_from_array([8; 32])).unwrap_err();
        assert_eq!(err, VaultError::Authorization.into());
    }
}
