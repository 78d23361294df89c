//! Instruction builders for the stake and lend operations.

use solana_sdk::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    stake::{
        instruction::create_account_and_delegate_stake,
        state::{Authorized, Lockup, StakeStateV2},
    },
};

use crate::domain::known_programs::{parse_pubkey, LEND_DEPOSIT_OPCODE, SPL_TOKEN_PROGRAM};
use crate::domain::{associated_token_address, LendingPool};
use super::error::EngineError;

/// Size of a stake account, used for the rent-exempt minimum
pub fn stake_account_size() -> usize {
    StakeStateV2::size_of()
}

/// Create a stake account funded with `lamports` and delegate it to `vote`.
///
/// The payer is both staker and withdrawer; no lockup.
pub fn stake_instructions(
    payer: &Pubkey,
    stake_account: &Pubkey,
    vote: &Pubkey,
    lamports: u64,
) -> Vec<Instruction> {
    create_account_and_delegate_stake(
        payer,
        stake_account,
        vote,
        &Authorized::auto(payer),
        &Lockup::default(),
        lamports,
    )
}

/// Deposit instruction data: opcode followed by the amount as LE u64
pub fn lend_deposit_data(amount: u64) -> Vec<u8> {
    let mut data = Vec::with_capacity(9);
    data.push(LEND_DEPOSIT_OPCODE);
    data.extend_from_slice(&amount.to_le_bytes());
    data
}

/// Deposit `amount` base units from the owner's token account into the pool reserve.
///
/// Only the opcode/amount layout is real. The account list is a minimal
/// stub (source, reserve, owner, token program); the lending program's
/// deposit also expects the collateral destination, reserve liquidity
/// supply, collateral mint, lending market and its authority, and the clock
/// sysvar, so mainnet rejects this instruction as built.
pub fn lend_deposit_instruction(
    pool: &LendingPool,
    owner: &Pubkey,
    amount: u64,
) -> Result<Instruction, EngineError> {
    let invalid = |what: &str, value: &str| {
        EngineError::InvalidInput(format!("lending pool {} '{}' is not a valid address", what, value))
    };

    let program_id = parse_pubkey(pool.program_id).ok_or_else(|| invalid("program", pool.program_id))?;
    let reserve = parse_pubkey(pool.reserve).ok_or_else(|| invalid("reserve", pool.reserve))?;
    let mint = parse_pubkey(pool.token_mint).ok_or_else(|| invalid("mint", pool.token_mint))?;
    let token_program =
        parse_pubkey(SPL_TOKEN_PROGRAM).ok_or_else(|| invalid("token program", SPL_TOKEN_PROGRAM))?;
    let source = associated_token_address(owner, &mint)
        .ok_or_else(|| invalid("token account", pool.token_mint))?;

    Ok(Instruction {
        program_id,
        accounts: vec![
            AccountMeta::new(source, false),
            AccountMeta::new(reserve, false),
            AccountMeta::new_readonly(*owner, true),
            AccountMeta::new_readonly(token_program, false),
        ],
        data: lend_deposit_data(amount),
    })
}
