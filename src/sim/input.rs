//! Player input commands
//!
//! The gesture layer classifies touches into a direction and finger count;
//! this maps them onto game actions.

use super::grid::Direction;

/// Number of fingers in a classified gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FingerCount {
    One,
    Two,
}

impl FingerCount {
    pub fn from_count(n: u8) -> Option<Self> {
        match n {
            1 => Some(FingerCount::One),
            2 => Some(FingerCount::Two),
            _ => None,
        }
    }
}

/// A classified touch gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Swipe {
        direction: Direction,
        fingers: FingerCount,
    },
    Tap,
}

/// Action requested by the player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// Listen in a direction (one-finger swipe)
    Hear(Direction),
    /// Step in a direction (two-finger swipe)
    Move(Direction),
    /// A tap; two within the double-tap window make a backstab
    Backstab,
}

impl From<Gesture> for Input {
    fn from(gesture: Gesture) -> Self {
        match gesture {
            Gesture::Swipe {
                direction,
                fingers: FingerCount::One,
            } => Input::Hear(direction),
            Gesture::Swipe {
                direction,
                fingers: FingerCount::Two,
            } => Input::Move(direction),
            Gesture::Tap => Input::Backstab,
        }
    }
}
