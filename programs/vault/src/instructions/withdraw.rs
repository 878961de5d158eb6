use anchor_lang::prelude::*;
use anchor_lang::system_program::{self, transfer, Transfer};

use crate::checks::{plan_withdraw, WithdrawSnapshot};
use crate::constants::VAULT_SEED;
use crate::error::VaultError;
use crate::events::Withdrawn;
use crate::state::VaultState;

/// Withdraw the vault's entire balance to its owner and close the vault state.
///
/// The vault PDA signs the outgoing transfer with its recorded bump. Closing
/// the state account returns its rent deposit to the signer, so the next
/// deposit starts a fresh cycle.
pub fn withdraw(ctx: Context<Withdraw>) -> Result<()> {
    let rent = Rent::get()?;
    let signer_key = ctx.accounts.signer.key();

    let snapshot = WithdrawSnapshot {
        program_id: *ctx.program_id,
        signer: signer_key,
        vault_state: ctx.accounts.vault_state.key(),
        state: VaultState::read_from(&ctx.accounts.vault_state, ctx.program_id)?,
        state_lamports: ctx.accounts.vault_state.lamports(),
        vault: ctx.accounts.vault.key(),
        vault_lamports: ctx.accounts.vault.lamports(),
    };
    let plan = plan_withdraw(&snapshot, &rent)?;

    msg!("Withdrawing {} lamports from vault {}", plan.amount, snapshot.vault);

    let bump = [plan.vault_bump];
    let seeds: &[&[u8]] = &[VAULT_SEED, signer_key.as_ref(), &bump];

    transfer(
        CpiContext::new_with_signer(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.vault.to_account_info(),
                to: ctx.accounts.signer.to_account_info(),
            },
            &[seeds],
        ),
        plan.amount,
    )?;

    close_vault_state(&ctx.accounts.vault_state, &ctx.accounts.signer)?;
    msg!("Vault state closed, {} lamports reclaimed", plan.reclaimed_rent);

    emit!(Withdrawn {
        owner: signer_key,
        vault: snapshot.vault,
        amount: plan.amount,
        reclaimed_rent: plan.reclaimed_rent,
    });

    Ok(())
}

/// Zero the state data, move its lamports to `destination` and hand the
/// account back to the system program so it cannot be revived this transaction.
fn close_vault_state(state: &AccountInfo, destination: &AccountInfo) -> Result<()> {
    state.try_borrow_mut_data()?.fill(0);

    let credited = destination
        .lamports()
        .checked_add(state.lamports())
        .ok_or(VaultError::ArithmeticOverflow)?;
    **destination.try_borrow_mut_lamports()? = credited;
    **state.try_borrow_mut_lamports()? = 0;

    state.assign(&system_program::ID);
    state.resize(0)?;
    Ok(())
}

#[derive(Accounts)]
pub struct Withdraw<'info> {
    #[account(mut)]
    pub signer: Signer<'info>,

    /// CHECK: address, owner and discriminator are verified in the handler.
    /// Closed on success.
    #[account(mut)]
    pub vault_state: UncheckedAccount<'info>,

    /// Lamport-only PDA at `[VAULT_SEED, signer]`, drained on success.
    #[account(mut)]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}
