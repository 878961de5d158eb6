/// Seed label for the lamport-holding vault PDA: `[VAULT_SEED, owner]`.
pub const VAULT_SEED: &[u8] = b"vault";

/// Seed label for the vault state PDA: `[VAULT_STATE_SEED, owner]`.
pub const VAULT_STATE_SEED: &[u8] = b"vault_state";
