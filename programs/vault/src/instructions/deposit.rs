use anchor_lang::prelude::*;
use anchor_lang::system_program::{
    allocate, assign, create_account, transfer, Allocate, Assign, CreateAccount, Transfer,
};

use crate::checks::{plan_deposit, DepositSnapshot, StateInit};
use crate::constants::VAULT_STATE_SEED;
use crate::events::{Deposited, VaultCreated};
use crate::state::VaultState;

/// Deposit lamports into the signer's vault.
///
/// Everything is validated by `plan_deposit` against a snapshot of the
/// supplied accounts before the first CPI is issued.
pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
    let rent = Rent::get()?;
    let signer_key = ctx.accounts.signer.key();

    let snapshot = DepositSnapshot {
        program_id: *ctx.program_id,
        signer: signer_key,
        signer_lamports: ctx.accounts.signer.lamports(),
        vault_state: ctx.accounts.vault_state.key(),
        state: VaultState::read_from(&ctx.accounts.vault_state, ctx.program_id)?,
        state_lamports: ctx.accounts.vault_state.lamports(),
        vault: ctx.accounts.vault.key(),
        vault_lamports: ctx.accounts.vault.lamports(),
        amount,
    };
    let plan = plan_deposit(&snapshot, &rent)?;

    msg!("Depositing {} lamports into vault {}", amount, snapshot.vault);

    if let Some(init) = plan.init {
        ctx.accounts.create_vault_state(init, ctx.program_id)?;

        emit!(VaultCreated {
            owner: signer_key,
            vault: snapshot.vault,
            vault_state: snapshot.vault_state,
            vault_bump: plan.state_after.vault_bump,
        });
        msg!("Vault state created for owner {}", signer_key);
    }

    transfer(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            Transfer {
                from: ctx.accounts.signer.to_account_info(),
                to: ctx.accounts.vault.to_account_info(),
            },
        ),
        plan.amount,
    )?;

    {
        let state_info = ctx.accounts.vault_state.to_account_info();
        let mut data = state_info.try_borrow_mut_data()?;
        plan.state_after.store(&mut data[..])?;
    }

    emit!(Deposited {
        owner: signer_key,
        vault: snapshot.vault,
        amount: plan.amount,
        vault_balance: plan.vault_balance_after,
        total_deposited: plan.state_after.total_deposited,
    });

    Ok(())
}

#[derive(Accounts)]
pub struct Deposit<'info> {
    #[account(mut)]
    pub signer: Signer<'info>,

    /// CHECK: may not exist yet. Address, owner and discriminator are
    /// verified in the handler before any mutation.
    #[account(mut)]
    pub vault_state: UncheckedAccount<'info>,

    /// Lamport-only PDA at `[VAULT_SEED, signer]`, re-derived in the handler.
    #[account(mut)]
    pub vault: SystemAccount<'info>,

    pub system_program: Program<'info, System>,
}

impl<'info> Deposit<'info> {
    /// Bring the vault state PDA to rent exemption, size it and hand it to this program.
    ///
    /// The address may already hold lamports sent by anyone, in which case
    /// `create_account` would fail, so that case is topped up, allocated and
    /// assigned step by step.
    fn create_vault_state(&self, init: StateInit, program_id: &Pubkey) -> Result<()> {
        let signer_key = self.signer.key();
        let bump = [init.state_bump];
        let seeds: &[&[u8]] = &[VAULT_STATE_SEED, signer_key.as_ref(), &bump];
        let signer_seeds = &[seeds];

        let system_program = self.system_program.to_account_info();
        let payer = self.signer.to_account_info();
        let state = self.vault_state.to_account_info();

        if state.lamports() == 0 {
            return create_account(
                CpiContext::new_with_signer(
                    system_program,
                    CreateAccount {
                        from: payer,
                        to: state,
                    },
                    signer_seeds,
                ),
                init.rent_top_up,
                VaultState::LEN as u64,
                program_id,
            );
        }

        if init.rent_top_up > 0 {
            transfer(
                CpiContext::new(
                    system_program.clone(),
                    Transfer {
                        from: payer,
                        to: state.clone(),
                    },
                ),
                init.rent_top_up,
            )?;
        }
        allocate(
            CpiContext::new_with_signer(
                system_program.clone(),
                Allocate {
                    account_to_allocate: state.clone(),
                },
                signer_seeds,
            ),
            VaultState::LEN as u64,
        )?;
        assign(
            CpiContext::new_with_signer(
                system_program,
                Assign {
                    account_to_assign: state,
                },
                signer_seeds,
            ),
            program_id,
        )
    }
}
