//! Validation phase for both instructions.
//!
//! Each planner is a pure function of an account snapshot and the rent
//! schedule. It either returns a plan describing every mutation the handler
//! will perform, or the error that rejects the instruction. Handlers issue no
//! CPI and write no account data until a plan has been produced.

use anchor_lang::prelude::*;

use crate::constants::{VAULT_SEED, VAULT_STATE_SEED};
use crate::error::VaultError;
use crate::pda;
use crate::state::VaultState;

/// What the deposit handler sees before touching anything.
#[derive(Debug, Clone)]
pub struct DepositSnapshot {
    pub program_id: Pubkey,
    pub signer: Pubkey,
    pub signer_lamports: u64,
    pub vault_state: Pubkey,
    /// Decoded state, `None` when the state account holds no data.
    pub state: Option<VaultState>,
    /// Lamports already sitting at the state address (non-zero if pre-funded).
    pub state_lamports: u64,
    pub vault: Pubkey,
    pub vault_lamports: u64,
    pub amount: u64,
}

/// Lamports and bumps needed to bring a vault state account to life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateInit {
    pub state_bump: u8,
    /// Lamports the signer pays into the state account for rent exemption.
    pub rent_top_up: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositPlan {
    /// Present when this deposit opens a new vault cycle.
    pub init: Option<StateInit>,
    pub amount: u64,
    pub vault_balance_after: u64,
    /// State to persist once the transfer has been issued.
    pub state_after: VaultState,
}

/// What the withdraw handler sees before touching anything.
#[derive(Debug, Clone)]
pub struct WithdrawSnapshot {
    pub program_id: Pubkey,
    pub signer: Pubkey,
    pub vault_state: Pubkey,
    pub state: Option<VaultState>,
    pub state_lamports: u64,
    pub vault: Pubkey,
    pub vault_lamports: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithdrawPlan {
    /// Lamports moved from the vault to the signer: its entire balance.
    pub amount: u64,
    /// Lamports returned to the signer when the state account is closed.
    pub reclaimed_rent: u64,
    pub vault_bump: u8,
}

impl WithdrawPlan {
    pub fn total_credited(&self) -> Result<u64> {
        self.amount
            .checked_add(self.reclaimed_rent)
            .ok_or_else(|| error!(VaultError::ArithmeticOverflow))
    }
}

/// Validate a deposit and compute everything it will change.
pub fn plan_deposit(snapshot: &DepositSnapshot, rent: &Rent) -> Result<DepositPlan> {
    require!(snapshot.amount > 0, VaultError::InvalidAmount);
    // A deposit that would leave the vault below its own rent floor is a bad amount,
    // whoever sends it.
    let vault_balance_after = snapshot
        .vault_lamports
        .checked_add(snapshot.amount)
        .ok_or(VaultError::ArithmeticOverflow)?;
    require!(
        vault_balance_after >= rent.minimum_balance(0),
        VaultError::InvalidAmount
    );

    let (state, init) = match &snapshot.state {
        Some(existing) => {
            pda::verify_with_bump(
                &snapshot.vault_state,
                VAULT_STATE_SEED,
                &snapshot.signer,
                existing.state_bump,
                &snapshot.program_id,
            )?;
            existing.ensure_owner(&snapshot.signer)?;
            pda::verify_with_bump(
                &snapshot.vault,
                VAULT_SEED,
                &snapshot.signer,
                existing.vault_bump,
                &snapshot.program_id,
            )?;
            (existing.clone(), None)
        }
        None => {
            let state_bump = pda::verify_vault_state_address(
                &snapshot.vault_state,
                &snapshot.signer,
                &snapshot.program_id,
            )?;
            let vault_bump =
                pda::verify_vault_address(&snapshot.vault, &snapshot.signer, &snapshot.program_id)?;
            let rent_top_up = rent
                .minimum_balance(VaultState::LEN)
                .saturating_sub(snapshot.state_lamports);
            (
                VaultState::new(snapshot.signer, vault_bump, state_bump),
                Some(StateInit {
                    state_bump,
                    rent_top_up,
                }),
            )
        }
    };

    // The signer keeps its own rent-exempt floor and pays for the state account first.
    let reserved = rent
        .minimum_balance(0)
        .checked_add(init.map_or(0, |init| init.rent_top_up))
        .ok_or(VaultError::ArithmeticOverflow)?;
    let spendable = snapshot
        .signer_lamports
        .checked_sub(reserved)
        .ok_or(VaultError::InsufficientFunds)?;
    require!(spendable >= snapshot.amount, VaultError::InsufficientFunds);

    let state_after = state.with_deposit(snapshot.amount)?;

    Ok(DepositPlan {
        init,
        amount: snapshot.amount,
        vault_balance_after,
        state_after,
    })
}

/// Validate a full withdrawal and compute what it will move.
pub fn plan_withdraw(snapshot: &WithdrawSnapshot, rent: &Rent) -> Result<WithdrawPlan> {
    pda::verify_vault_state_address(&snapshot.vault_state, &snapshot.signer, &snapshot.program_id)?;

    let state = snapshot.state.as_ref().ok_or(VaultError::NotFound)?;
    state.ensure_owner(&snapshot.signer)?;
    pda::verify_with_bump(
        &snapshot.vault,
        VAULT_SEED,
        &snapshot.signer,
        state.vault_bump,
        &snapshot.program_id,
    )?;

    // Only this program can debit the vault, so it holds at least what was
    // deposited and at least the rent floor every deposit enforced.
    if snapshot.vault_lamports < rent.minimum_balance(0)
        || snapshot.vault_lamports < state.total_deposited
    {
        msg!(
            "vault {} holds {} lamports, recorded deposits {}",
            snapshot.vault,
            snapshot.vault_lamports,
            state.total_deposited
        );
        return err!(VaultError::Consistency);
    }

    let plan = WithdrawPlan {
        amount: snapshot.vault_lamports,
        reclaimed_rent: snapshot.state_lamports,
        vault_bump: state.vault_bump,
    };
    plan.total_credited()?;

    Ok(plan)
}
