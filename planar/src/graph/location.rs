use serde::{Deserialize, Serialize};

/// Where something is, relative to a geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Location {
    Interior,
    Boundary,
    Exterior,
    /// Not (yet) known.
    #[default]
    None,
}

impl Location {
    pub fn symbol(self) -> char {
        match self {
            Location::Interior => 'i',
            Location::Boundary => 'b',
            Location::Exterior => 'e',
            Location::None => '-',
        }
    }
}

/// A position relative to a directed edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    On,
    Left,
    Right,
}

impl Position {
    /// Swaps left and right.
    pub fn opposite(self) -> Self {
        match self {
            Position::On => Position::On,
            Position::Left => Position::Right,
            Position::Right => Position::Left,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Position::On => 0,
            Position::Left => 1,
            Position::Right => 2,
        }
    }
}
