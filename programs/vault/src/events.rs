use anchor_lang::prelude::*;

#[event]
pub struct VaultCreated {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub vault_state: Pubkey,
    pub vault_bump: u8,
}

#[event]
pub struct Deposited {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub amount: u64,
    /// Vault lamports after the transfer.
    pub vault_balance: u64,
    pub total_deposited: u64,
}

#[event]
pub struct Withdrawn {
    pub owner: Pubkey,
    pub vault: Pubkey,
    pub amount: u64,
    /// Lamports returned from the closed vault state account.
    pub reclaimed_rent: u64,
}
