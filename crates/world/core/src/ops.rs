//! Operation flags: the capabilities a cell or entity offers to movers.
//!
//! Every terrain cell and every moving entity carries an [`Operations`] bit
//! set. Movement, picking, placing and eating only ever look at these bits,
//! never at concrete entity types.

use std::collections::BTreeSet;

use bitflags::bitflags;
use strum::{EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

use crate::error::{ErrorSeverity, SimError};

bitflags! {
    /// Bit set of capabilities. Bits above [`Operations::EDIBLE`] are unused.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Operations: u8 {
        const TRAVERSABLE = 1 << 0;
        const LIFTABLE = 1 << 1;
        const PUSH_OVER = 1 << 2;
        const EDIBLE = 1 << 3;
    }
}

/// A single capability, the named form of one [`Operations`] bit.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    Traversable,
    Liftable,
    PushOver,
    Edible,
}

impl Capability {
    pub const fn bit(self) -> Operations {
        match self {
            Self::Traversable => Operations::TRAVERSABLE,
            Self::Liftable => Operations::LIFTABLE,
            Self::PushOver => Operations::PUSH_OVER,
            Self::Edible => Operations::EDIBLE,
        }
    }

    /// Maps a single-bit pattern back to its capability.
    pub fn from_bit(bits: u8) -> Result<Self, CapabilityError> {
        Self::iter()
            .find(|capability| capability.bit().bits() == bits)
            .ok_or(CapabilityError::UnknownBit { bits })
    }

    pub fn name(self) -> &'static str {
        self.into()
    }
}

impl Operations {
    /// Capabilities present in this set, in declaration order.
    pub fn capabilities(self) -> BTreeSet<Capability> {
        decode(self.bits())
    }

    pub fn has(self, capability: Capability) -> bool {
        self.contains(capability.bit())
    }
}

/// Errors raised while translating capability names or bits.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CapabilityError {
    #[error("unknown capability `{name}`")]
    Unknown { name: String },

    #[error("bit pattern {bits:#06b} does not name exactly one capability")]
    UnknownBit { bits: u8 },
}

impl SimError for CapabilityError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Unknown { .. } => "CAPABILITY_UNKNOWN",
            Self::UnknownBit { .. } => "CAPABILITY_UNKNOWN_BIT",
        }
    }
}

/// Folds capabilities into a bit set. Duplicates are harmless.
pub fn encode<I>(capabilities: I) -> Operations
where
    I: IntoIterator<Item = Capability>,
{
    capabilities
        .into_iter()
        .fold(Operations::empty(), |acc, capability| acc | capability.bit())
}

/// Like [`encode`], but from names such as `"push_over"` (case-insensitive).
pub fn encode_names<I, S>(names: I) -> Result<Operations, CapabilityError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().try_fold(Operations::empty(), |acc, name| {
        let name = name.as_ref();
        name.parse::<Capability>()
            .map(|capability| acc | capability.bit())
            .map_err(|_| CapabilityError::Unknown {
                name: name.to_owned(),
            })
    })
}

/// Expands raw bits into capabilities, silently dropping unknown bits.
pub fn decode(bits: u8) -> BTreeSet<Capability> {
    Capability::iter()
        .filter(|capability| bits & capability.bit().bits() != 0)
        .collect()
}

pub fn contains(bits: u8, capability: Capability) -> bool {
    bits & capability.bit().bits() != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_subsets() -> Vec<BTreeSet<Capability>> {
        let all: Vec<Capability> = Capability::iter().collect();
        (0u8..16)
            .map(|mask| {
                all.iter()
                    .enumerate()
                    .filter(|(i, _)| mask & (1 << i) != 0)
                    .map(|(_, c)| *c)
                    .collect()
            })
            .collect()
    }

    #[test]
    fn decode_inverts_encode_for_every_subset() {
        for subset in all_subsets() {
            let bits = encode(subset.iter().copied());
            assert_eq!(decode(bits.bits()), subset);
        }
    }

    #[test]
    fn names_encode_to_expected_bits() {
        let ops = encode_names(["traversable", "Push_Over"]).unwrap();
        assert_eq!(ops, Operations::TRAVERSABLE | Operations::PUSH_OVER);
        assert_eq!(encode_names(Vec::<&str>::new()).unwrap(), Operations::empty());
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = encode_names(["edible", "flying"]).unwrap_err();
        assert_eq!(
            err,
            CapabilityError::Unknown {
                name: "flying".into()
            }
        );
        assert_eq!(err.severity(), ErrorSeverity::Fatal);
    }

    #[test]
    fn from_bit_requires_a_single_known_bit() {
        assert_eq!(Capability::from_bit(4).unwrap(), Capability::PushOver);
        assert!(Capability::from_bit(0).is_err());
        assert!(Capability::from_bit(3).is_err());
        assert!(Capability::from_bit(1 << 6).is_err());
    }

    #[test]
    fn decode_ignores_unused_bits() {
        let decoded = decode(0b1111_0001);
        assert_eq!(decoded, BTreeSet::from([Capability::Traversable]));
        assert!(contains(0b0000_1000, Capability::Edible));
        assert!(!contains(0b0000_1000, Capability::Liftable));
    }

    #[test]
    fn capability_names_are_snake_case() {
        assert_eq!(Capability::PushOver.name(), "push_over");
        assert!(Operations::EDIBLE.has(Capability::Edible));
    }
}
