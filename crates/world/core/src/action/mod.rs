//! Actor actions and the per-actor action state machine.
//!
//! An [`ActorAction`] is the raw decision of a policy: six continuous
//! components in `[0, 1]` plus a signal symbol. [`apply_action`] validates it
//! and applies its effects to one actor in a fixed order.
mod apply;
mod error;

pub use apply::{ActionReport, EatOutcome, PickOutcome, PlaceOutcome, apply_action};
pub use error::ActionError;

/// Components above this value switch their discrete effect on.
pub const ACTIVATION_THRESHOLD: f64 = 0.5;

/// Number of continuous components in an action.
pub const ACTION_DIMENSIONS: usize = 6;

/// One actor's decision for a single turn.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorAction {
    pub continuous: [f64; ACTION_DIMENSIONS],
    pub signal: u16,
}

impl ActorAction {
    pub const FORWARD: usize = 0;
    pub const TURN_LEFT: usize = 1;
    pub const TURN_RIGHT: usize = 2;
    pub const PICK: usize = 3;
    pub const PLACE: usize = 4;
    pub const EAT: usize = 5;
    pub const DIMENSIONS: usize = ACTION_DIMENSIONS;

    pub const fn new(continuous: [f64; Self::DIMENSIONS], signal: u16) -> Self {
        Self { continuous, signal }
    }

    /// All components zero, signal zero: the actor only rests.
    pub const fn idle() -> Self {
        Self::new([0.0; Self::DIMENSIONS], 0)
    }

    pub fn with_forward(mut self, forward: f64) -> Self {
        self.continuous[Self::FORWARD] = forward;
        self
    }

    pub fn with_turn_left(mut self) -> Self {
        self.continuous[Self::TURN_LEFT] = 1.0;
        self
    }

    pub fn with_turn_right(mut self) -> Self {
        self.continuous[Self::TURN_RIGHT] = 1.0;
        self
    }

    pub fn with_pick(mut self) -> Self {
        self.continuous[Self::PICK] = 1.0;
        self
    }

    pub fn with_place(mut self) -> Self {
        self.continuous[Self::PLACE] = 1.0;
        self
    }

    pub fn with_eat(mut self) -> Self {
        self.continuous[Self::EAT] = 1.0;
        self
    }

    pub fn with_signal(mut self, signal: u16) -> Self {
        self.signal = signal;
        self
    }

    pub fn forward(&self) -> f64 {
        self.continuous[Self::FORWARD]
    }

    /// Whether component `index` exceeds [`ACTIVATION_THRESHOLD`].
    pub fn is_active(&self, index: usize) -> bool {
        self.continuous
            .get(index)
            .is_some_and(|value| *value > ACTIVATION_THRESHOLD)
    }

    /// Checks every component is finite and in `[0, 1]`, and the signal fits
    /// the vocabulary.
    pub fn validate(&self, vocabulary_size: u32) -> Result<(), ActionError> {
        for (index, value) in self.continuous.iter().copied().enumerate() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ActionError::ComponentOutOfRange { index, value });
            }
        }
        if u32::from(self.signal) >= vocabulary_size {
            return Err(ActionError::SignalOutOfRange {
                signal: self.signal,
                vocabulary_size,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_the_expected_components() {
        let action = ActorAction::idle().with_forward(0.3).with_eat().with_signal(7);
        assert_eq!(action.forward(), 0.3);
        assert!(action.is_active(ActorAction::EAT));
        assert!(!action.is_active(ActorAction::PICK));
        assert!(!action.is_active(ActorAction::DIMENSIONS));
        assert_eq!(action.signal, 7);
    }

    #[test]
    fn validation_rejects_out_of_range_components() {
        let mut action = ActorAction::idle();
        action.continuous[ActorAction::PLACE] = 1.5;
        assert_eq!(
            action.validate(1024),
            Err(ActionError::ComponentOutOfRange {
                index: ActorAction::PLACE,
                value: 1.5
            })
        );

        action.continuous[ActorAction::PLACE] = f64::NAN;
        assert!(action.validate(1024).is_err());
    }

    #[test]
    fn validation_rejects_signals_outside_vocabulary() {
        let action = ActorAction::idle().with_signal(16);
        assert!(action.validate(17).is_ok());
        assert_eq!(
            action.validate(16),
            Err(ActionError::SignalOutOfRange {
                signal: 16,
                vocabulary_size: 16
            })
        );
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut action = ActorAction::idle();
        action.continuous[ActorAction::TURN_LEFT] = ACTIVATION_THRESHOLD;
        assert!(!action.is_active(ActorAction::TURN_LEFT));
    }
}
