//! Pieces, their colors and ranks, and positions on the board.

use crate::board::BOARD_DIMS;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// The two sides of a match.
pub enum Color {
    /// Starts on row 0 and uses the inverted card vectors.
    Red,
    /// Starts on row 4 and uses the card vectors as written.
    Blue,
}

impl Color {
    /// Both colors, used for random assignment.
    pub const ALL: [Color; 2] = [Color::Red, Color::Blue];

    /// The other side.
    pub fn opponent(self) -> Color {
        match self {
            Color::Red => Color::Blue,
            Color::Blue => Color::Red,
        }
    }

    /// The row the pieces of this color start on.
    pub fn home_row(self) -> i8 {
        match self {
            Color::Red => 0,
            Color::Blue => BOARD_DIMS - 1,
        }
    }

    /// The row this color's master has to reach to win.
    pub fn far_row(self) -> i8 {
        self.opponent().home_row()
    }

    /// Card vectors are stored from Blue's perspective.
    pub fn requires_inversion(self) -> bool {
        self == Color::Red
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Red => write!(f, "Red"),
            Color::Blue => write!(f, "Blue"),
        }
    }
}

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Master,
    Student,
}

/// A square on the board. Origin is the corner of Red's home row.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub fn new(x: i8, y: i8) -> Self {
        Position { x, y }
    }

    /// Checks if we are a valid position, which means we are on the board in the required range.
    pub fn is_on_board(&self) -> bool {
        (0..BOARD_DIMS).contains(&self.x) && (0..BOARD_DIMS).contains(&self.y)
    }

    /// The position displaced by the vector. The result may be off the board.
    pub fn offset(&self, dx: i8, dy: i8) -> Position {
        Position {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// A piece on the board. The position is kept in sync with the cell that holds the piece.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Piece {
    pub color: Color,
    pub rank: Rank,
    pub position: Position,
}

impl Piece {
    pub fn new(color: Color, rank: Rank, position: Position) -> Self {
        Piece {
            color,
            rank,
            position,
        }
    }

    pub fn is_master(&self) -> bool {
        self.rank == Rank::Master
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_of_the_colors() {
        assert_eq!(Color::Red.home_row(), 0);
        assert_eq!(Color::Red.far_row(), 4);
        assert_eq!(Color::Blue.home_row(), 4);
        assert_eq!(Color::Blue.far_row(), 0);
        assert_eq!(Color::Red.opponent(), Color::Blue);
    }

    #[test]
    fn board_bounds() {
        assert!(Position::new(0, 0).is_on_board());
        assert!(Position::new(4, 4).is_on_board());
        assert!(!Position::new(5, 0).is_on_board());
        assert!(!Position::new(2, -1).is_on_board());
        assert_eq!(Position::new(1, 1).offset(-2, 1), Position::new(-1, 2));
    }
}
