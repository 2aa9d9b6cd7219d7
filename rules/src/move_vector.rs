//! The relative displacement a card grants to a piece.

use serde::{Deserialize, Serialize};

/// A single step offset. Both components lie in `-2..=2` and the vector is never `(0, 0)`.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct MoveVector {
    /// Horizontal displacement.
    pub dx: i8,
    /// Vertical displacement.
    pub dy: i8,
}

impl MoveVector {
    /// Builds a vector for the static card table.
    ///
    /// # Panics
    /// Panics at compile time when used in a const context with a zero or oversized offset.
    pub const fn new(dx: i8, dy: i8) -> Self {
        assert!(dx >= -2 && dx <= 2 && dy >= -2 && dy <= 2);
        assert!(dx != 0 || dy != 0);
        MoveVector { dx, dy }
    }

    /// Mirrors the vector for the player that looks at the board from the other side.
    pub const fn invert(self) -> Self {
        MoveVector {
            dx: -self.dx,
            dy: -self.dy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_flips_both_components() {
        let vector = MoveVector::new(-2, 1);
        assert_eq!(vector.invert(), MoveVector::new(2, -1));
        assert_eq!(vector.invert().invert(), vector);
    }
}
