use anchor_lang::prelude::*;

declare_id!("Vau1tQ2xJ6gRZ3N8oBmF5sPqkWcHtY7dLEu9AiXr4Kz");

pub mod checks;
pub mod constants;
pub mod error;
pub mod events;
pub mod instructions;
pub mod pda;
pub mod state;

pub use constants::*;
pub use error::*;
pub use instructions::*;
pub use state::*;

#[program]
pub mod native_vault {
    use super::*;

    /// Deposit `amount` lamports from the signer into their vault PDA.
    /// Creates the vault state account on the first deposit of a cycle.
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::deposit(ctx, amount)
    }

    /// Drain the signer's vault back to them and close the vault state.
    pub fn withdraw(ctx: Context<Withdraw>) -> Result<()> {
        instructions::withdraw(ctx)
    }
}
