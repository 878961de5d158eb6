use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    #[msg("Account does not match the address derived for this owner")]
    Authorization,

    #[msg("Invalid amount")]
    InvalidAmount,

    #[msg("Insufficient funds for the requested transfer")]
    InsufficientFunds,

    #[msg("Vault state not found")]
    NotFound,

    #[msg("Vault invariant violated")]
    Consistency,

    #[msg("Arithmetic overflow")]
    ArithmeticOverflow,
}
