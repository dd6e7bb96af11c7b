//! Program configuration and its one-time initialization.

use tracing::info;

use crate::difficulty::target_is_valid;
use crate::error::{NearMissError, Result};
use crate::identity::Identity;

/// Immutable configuration every verification runs against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramState {
    /// Required trailing zero bytes (exact match).
    pub difficulty_target: u8,
    /// Identity authorized to mint rewards.
    pub mint_authority: Identity,
    /// Identity receiving the treasury share of forfeited deposits.
    pub treasury: Identity,
}

/// Storage slot for the program state: `Uninitialized -> Initialized`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSlot {
    state: Option<ProgramState>,
}

impl ProgramSlot {
    /// An uninitialized slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// One-time transition to `Initialized`.
    ///
    /// A second call fails with `AlreadyInitialized` and leaves the first
    /// configuration untouched.
    pub fn initialize(
        &mut self,
        difficulty_target: u8,
        mint_authority: Identity,
        treasury: Identity,
    ) -> Result<&ProgramState> {
        if self.state.is_some() {
            return Err(NearMissError::AlreadyInitialized);
        }
        if !target_is_valid(difficulty_target) {
            return Err(NearMissError::InvalidDifficultyTarget(difficulty_target));
        }

        info!(difficulty_target, %mint_authority, %treasury, "program state initialized");

        Ok(self.state.insert(ProgramState {
            difficulty_target,
            mint_authority,
            treasury,
        }))
    }

    /// Whether `initialize` has run.
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// The initialized state.
    pub fn get(&self) -> Result<&ProgramState> {
        self.state.as_ref().ok_or(NearMissError::Uninitialized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_once() {
        let mut slot = ProgramSlot::new();
        assert!(!slot.is_initialized());
        assert_eq!(slot.get(), Err(NearMissError::Uninitialized));

        let authority = Identity::new([1u8; 32]);
        let treasury = Identity::new([2u8; 32]);
        let state = *slot.initialize(2, authority, treasury).unwrap();

        assert_eq!(state.difficulty_target, 2);
        assert_eq!(state.mint_authority, authority);
        assert_eq!(state.treasury, treasury);
        assert!(slot.is_initialized());
    }

    #[test]
    fn test_second_initialize_fails() {
        let mut slot = ProgramSlot::new();
        slot.initialize(2, Identity::new([1u8; 32]), Identity::new([2u8; 32])).unwrap();

        let err = slot
            .initialize(5, Identity::new([3u8; 32]), Identity::new([4u8; 32]))
            .unwrap_err();
        assert_eq!(err, NearMissError::AlreadyInitialized);

        let state = slot.get().unwrap();
        assert_eq!(state.difficulty_target, 2);
        assert_eq!(state.mint_authority, Identity::new([1u8; 32]));
    }

    #[test]
    fn test_unreachable_target_rejected() {
        let mut slot = ProgramSlot::new();
        assert_eq!(
            slot.initialize(33, Identity::default(), Identity::default()).unwrap_err(),
            NearMissError::InvalidDifficultyTarget(33)
        );
        assert!(!slot.is_initialized());
    }
}
