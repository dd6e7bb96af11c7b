//! Submission flow: read the feed, verify, settle, mint.

use tracing::{debug, info};

use crate::config::NearMissConfig;
use crate::error::{NearMissError, Result};
use crate::feed::{AggregatorAccount, FeedReader};
use crate::header::BlockHeader;
use crate::identity::Identity;
use crate::reward::{Ledger, RewardAccounts, RewardIssuer, Settlement};
use crate::state::{ProgramSlot, ProgramState};
use crate::verify::{verify, NearMissOutcome};

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    /// Accepted outcome, or why the submission was rejected.
    pub verdict: Result<NearMissOutcome>,
    /// What happened to the deposit and reward.
    pub settlement: Settlement,
    /// Height of the oracle round the submission was checked against.
    pub height: Option<u64>,
}

impl Receipt {
    /// Whether the submission was rewarded.
    pub fn accepted(&self) -> bool {
        self.verdict.is_ok()
    }
}

/// Near-miss program: configuration, feed reader and reward issuer.
#[derive(Debug, Clone)]
pub struct NearMissProgram {
    slot: ProgramSlot,
    reader: FeedReader,
    issuer: RewardIssuer,
}

impl NearMissProgram {
    /// Program trusting feeds owned by `oracle_program`.
    pub fn new(oracle_program: Identity) -> Self {
        NearMissProgram {
            slot: ProgramSlot::new(),
            reader: FeedReader::new(oracle_program),
            issuer: RewardIssuer::new(),
        }
    }

    /// Program trusting the oracle named by `config`.
    pub fn from_config(config: &NearMissConfig) -> Self {
        Self::new(config.trusted_oracle())
    }

    /// See [`ProgramSlot::initialize`].
    pub fn initialize(
        &mut self,
        difficulty_target: u8,
        mint_authority: Identity,
        treasury: Identity,
    ) -> Result<&ProgramState> {
        self.slot.initialize(difficulty_target, mint_authority, treasury)
    }

    /// The initialized configuration.
    pub fn state(&self) -> Result<&ProgramState> {
        self.slot.get()
    }

    /// Reader used to authenticate feed accounts.
    pub fn reader(&self) -> &FeedReader {
        &self.reader
    }

    /// Minted, forfeited and burned totals so far.
    pub fn accounts(&self) -> &RewardAccounts {
        self.issuer.accounts()
    }

    /// Process one submission against the current feed.
    ///
    /// Rejections come back as a [`Receipt`] with a failed verdict: a feed
    /// fault refunds the deposit, a bad submission forfeits it. An `Err` means
    /// nothing happened at all: the program is uninitialized, the winning
    /// header was already rewarded, the feed round is older than one already
    /// rewarded against, or the ledger refused the mint.
    pub fn submit<L: Ledger>(
        &mut self,
        feed: &AggregatorAccount,
        submission: &BlockHeader,
        miner: Identity,
        ledger: &mut L,
    ) -> Result<Receipt> {
        let state = *self.slot.get()?;

        let round = match self.reader.read_round(feed) {
            Ok(round) => round,
            Err(e) if e.is_feed_fault() => {
                debug!(code = e.code(), "feed fault, refunding deposit");
                return Ok(Receipt {
                    verdict: Err(e),
                    settlement: self.issuer.refund(),
                    height: None,
                });
            }
            Err(e) => return Err(e),
        };

        match verify(&round.tip, submission, &state) {
            Ok(outcome) => {
                let settlement = self.issuer.reward(&state, miner, round.height, &outcome, ledger)?;
                Ok(Receipt {
                    verdict: Ok(outcome),
                    settlement,
                    height: Some(round.height),
                })
            }
            Err(e @ NearMissError::InvalidNearMiss { .. }) | Err(e @ NearMissError::OracleMismatch { .. }) => {
                info!(%miner, code = e.code(), "submission rejected");
                let settlement = self.issuer.forfeit()?;
                Ok(Receipt {
                    verdict: Err(e),
                    settlement,
                    height: Some(round.height),
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::FeedRound;
    use crate::header::BlockTip;
    use crate::reward::MemoryLedger;

    fn oracle() -> Identity {
        Identity::new([0x0Au8; 32])
    }

    fn feed() -> AggregatorAccount {
        let round = FeedRound {
            tip: BlockTip {
                version: 0x20000000,
                prev_hash: [0x01u8; 32],
                merkle_root: [0x02u8; 32],
                timestamp: 1_700_000_000,
                bits: 0x1d00ffff,
            },
            height: 770_000,
            round_open_timestamp: 1_700_000_005,
            num_success: 1,
            num_error: 0,
        };
        AggregatorAccount::publish(Identity::new([0x0Bu8; 32]), oracle(), &round)
    }

    #[test]
    fn test_submit_requires_initialize() {
        let mut program = NearMissProgram::new(oracle());
        let tip = program.reader().read_tip(&feed()).unwrap();
        let result = program.submit(&feed(), &tip.candidate(21799, 0), Identity::default(), &mut MemoryLedger::new());
        assert_eq!(result, Err(NearMissError::Uninitialized));
    }

    #[test]
    fn test_untrusted_feed_refunds() {
        let mut program = NearMissProgram::new(oracle());
        program.initialize(2, Identity::new([1u8; 32]), Identity::new([2u8; 32])).unwrap();

        let mut spoofed = feed();
        spoofed.owner = Identity::new([0xEEu8; 32]);
        let tip = program.reader().read_tip(&feed()).unwrap();
        let mut ledger = MemoryLedger::new();

        let receipt = program
            .submit(&spoofed, &tip.candidate(21799, 0), Identity::new([9u8; 32]), &mut ledger)
            .unwrap();
        assert!(!receipt.accepted());
        assert!(matches!(receipt.verdict, Err(NearMissError::UntrustedFeed(_))));
        assert!(matches!(receipt.settlement, Settlement::Refunded { .. }));
        assert_eq!(ledger.mint_count(), 0);
        assert_eq!(program.accounts(), &RewardAccounts::default());
    }
}
