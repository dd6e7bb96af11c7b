//! Reward issuance and deposit settlement.
//!
//! The issuer decides whether a submission is paid and how much moves where;
//! the token transfer itself goes through a [`Ledger`] supplied by the host.
//! An accepted near miss is minted at most once: its digest is recorded only
//! after the ledger confirms the mint.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::error::{NearMissError, Result};
use crate::identity::Identity;
use crate::network::{
    ORACLE_MAINTENANCE_PERCENTAGE, SUBMISSION_DEPOSIT, TOKEN_PER_NEAR_MISS, TREASURY_PERCENTAGE,
};
use crate::state::ProgramState;
use crate::verify::NearMissOutcome;

/// Token ledger the reward is minted on.
pub trait Ledger {
    /// Mint `amount` reward tokens to `recipient`, authorized by `authority`.
    fn mint_to(&mut self, authority: &Identity, recipient: &Identity, amount: u64) -> Result<()>;
}

/// In-memory ledger keeping a balance per recipient.
#[derive(Debug, Clone, Default)]
pub struct MemoryLedger {
    balances: HashMap<Identity, u64>,
    mints: u64,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token balance of `owner`.
    pub fn balance(&self, owner: &Identity) -> u64 {
        self.balances.get(owner).copied().unwrap_or(0)
    }

    /// Number of mint calls that succeeded.
    pub fn mint_count(&self) -> u64 {
        self.mints
    }
}

impl Ledger for MemoryLedger {
    fn mint_to(&mut self, _authority: &Identity, recipient: &Identity, amount: u64) -> Result<()> {
        let balance = self.balances.entry(*recipient).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(NearMissError::Overflow)?;
        self.mints += 1;
        Ok(())
    }
}

/// Split of a forfeited deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepositSplit {
    pub oracle: u64,
    pub treasury: u64,
    /// Remainder after the oracle and treasury shares.
    pub burned: u64,
}

/// Split `deposit` into oracle maintenance, treasury and burn shares.
pub fn split_deposit(deposit: u64) -> DepositSplit {
    let oracle = (deposit as u128 * ORACLE_MAINTENANCE_PERCENTAGE as u128 / 100) as u64;
    let treasury = (deposit as u128 * TREASURY_PERCENTAGE as u128 / 100) as u64;
    DepositSplit {
        oracle,
        treasury,
        burned: deposit - oracle - treasury,
    }
}

/// What happened to a submission's deposit and reward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Reward minted and deposit returned.
    Rewarded { miner: Identity, minted: u64, refund: u64 },
    /// Deposit forfeited and split.
    Forfeited(DepositSplit),
    /// Deposit returned without reward (the oracle was at fault).
    Refunded { amount: u64 },
}

/// Running totals kept by the issuer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardAccounts {
    pub total_minted: u64,
    pub oracle_balance: u64,
    pub treasury_balance: u64,
    pub burned: u64,
}

/// Digests already rewarded at the latest oracle round height.
///
/// Heights only move forward: a round below the latest one is refused, so
/// presenting an old feed cannot clear the set.
#[derive(Debug, Clone, Default)]
pub struct SubmissionRegistry {
    latest: Option<u64>,
    digests: HashSet<[u8; 32]>,
}

impl SubmissionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest height a reward was recorded at.
    pub fn latest_height(&self) -> Option<u64> {
        self.latest
    }

    /// Fail if `height` is behind the latest height, or `digest` was already
    /// rewarded at it.
    pub fn check(&self, height: u64, digest: &[u8; 32]) -> Result<()> {
        match self.latest {
            Some(latest) if height < latest => Err(NearMissError::StaleSubmission { height, latest }),
            Some(latest) if height == latest && self.digests.contains(digest) => {
                Err(NearMissError::DuplicateSubmission)
            }
            _ => Ok(()),
        }
    }

    /// Record a rewarded digest, clearing the set when the height advances.
    ///
    /// Callers run [`check`](Self::check) first; a height behind the latest
    /// is ignored.
    pub fn record(&mut self, height: u64, digest: [u8; 32]) {
        match self.latest {
            Some(latest) if height < latest => return,
            Some(latest) if height == latest => {}
            _ => {
                self.digests.clear();
                self.latest = Some(height);
            }
        }
        self.digests.insert(digest);
    }

    /// Digests recorded for the current height.
    pub fn len(&self) -> usize {
        self.digests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

/// Decides and applies settlements.
#[derive(Debug, Clone, Default)]
pub struct RewardIssuer {
    accounts: RewardAccounts,
    registry: SubmissionRegistry,
}

impl RewardIssuer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accounts(&self) -> &RewardAccounts {
        &self.accounts
    }

    pub fn registry(&self) -> &SubmissionRegistry {
        &self.registry
    }

    /// Mint the fixed reward for an accepted near miss.
    ///
    /// Nothing is recorded unless the ledger mint succeeds, and a digest
    /// already rewarded at this height is refused before the ledger is touched.
    pub fn reward<L: Ledger>(
        &mut self,
        state: &ProgramState,
        miner: Identity,
        height: u64,
        outcome: &NearMissOutcome,
        ledger: &mut L,
    ) -> Result<Settlement> {
        if !outcome.accepted || outcome.trailing_zero_count != state.difficulty_target {
            return Err(NearMissError::InvalidNearMiss {
                zeros: outcome.trailing_zero_count,
                target: state.difficulty_target,
            });
        }

        self.registry.check(height, &outcome.digest)?;
        let total_minted = self
            .accounts
            .total_minted
            .checked_add(TOKEN_PER_NEAR_MISS)
            .ok_or(NearMissError::Overflow)?;

        ledger.mint_to(&state.mint_authority, &miner, TOKEN_PER_NEAR_MISS)?;

        self.registry.record(height, outcome.digest);
        self.accounts.total_minted = total_minted;
        info!(%miner, height, amount = TOKEN_PER_NEAR_MISS, total_minted, "near miss rewarded");

        Ok(Settlement::Rewarded {
            miner,
            minted: TOKEN_PER_NEAR_MISS,
            refund: SUBMISSION_DEPOSIT,
        })
    }

    /// Forfeit the deposit of a rejected submission.
    pub fn forfeit(&mut self) -> Result<Settlement> {
        let split = split_deposit(SUBMISSION_DEPOSIT);
        let oracle_balance = self
            .accounts
            .oracle_balance
            .checked_add(split.oracle)
            .ok_or(NearMissError::Overflow)?;
        let treasury_balance = self
            .accounts
            .treasury_balance
            .checked_add(split.treasury)
            .ok_or(NearMissError::Overflow)?;
        let burned = self
            .accounts
            .burned
            .checked_add(split.burned)
            .ok_or(NearMissError::Overflow)?;

        self.accounts.oracle_balance = oracle_balance;
        self.accounts.treasury_balance = treasury_balance;
        self.accounts.burned = burned;
        debug!(oracle = split.oracle, treasury = split.treasury, burned = split.burned, "deposit forfeited");

        Ok(Settlement::Forfeited(split))
    }

    /// Return the deposit untouched.
    pub fn refund(&self) -> Settlement {
        Settlement::Refunded { amount: SUBMISSION_DEPOSIT }
    }
}
