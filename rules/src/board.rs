//! The 5×5 grid and the operations to place, find and relocate pieces on it.

use crate::piece::{Color, Piece, Position, Rank};

/// The extension of the board we have in every dimension.
pub const BOARD_DIM: usize = 5;
/// The same as [`BOARD_DIM`] just in i8 as often needed.
pub const BOARD_DIMS: i8 = BOARD_DIM as i8;

/// The game board. Cells are indexed `[y][x]`.
#[derive(PartialEq, Debug, Clone)]
pub struct Board {
    cells: [[Option<Piece>; BOARD_DIM]; BOARD_DIM],
}

impl Default for Board {
    fn default() -> Self {
        Board::empty()
    }
}

impl Board {
    /// Creates a board without any pieces.
    pub fn empty() -> Self {
        Board {
            cells: [[None; BOARD_DIM]; BOARD_DIM],
        }
    }

    /// Puts the board into the start configuration: four students flanking the master on both
    /// home rows.
    pub fn starting() -> Self {
        let mut board = Board::empty();
        for color in Color::ALL {
            let y = color.home_row();
            for x in 0..BOARD_DIMS {
                let rank = if x == BOARD_DIMS / 2 {
                    Rank::Master
                } else {
                    Rank::Student
                };
                board.place(Piece::new(color, rank, Position::new(x, y)));
            }
        }
        board
    }

    /// The piece on a square, `None` for empty or off-board squares.
    pub fn piece_at(&self, position: Position) -> Option<&Piece> {
        if !position.is_on_board() {
            return None;
        }
        self.cells[position.y as usize][position.x as usize].as_ref()
    }

    /// Places a piece on the square stored in the piece and returns what was there before.
    ///
    /// # Panics
    /// The position of the piece has to be on the board.
    pub fn place(&mut self, piece: Piece) -> Option<Piece> {
        let Position { x, y } = piece.position;
        assert!(piece.position.is_on_board(), "Piece placed off the board.");
        self.cells[y as usize][x as usize].replace(piece)
    }

    /// Moves the piece at `from` to `to`, updating its stored position. Anything standing on `to`
    /// gets removed and is returned as captured. Returns `None` without changes if `from` is empty.
    pub fn relocate(&mut self, from: Position, to: Position) -> Option<Option<Piece>> {
        if !from.is_on_board() || !to.is_on_board() {
            return None;
        }
        let mut piece = self.cells[from.y as usize][from.x as usize].take()?;
        piece.position = to;
        Some(self.place(piece))
    }

    /// All pieces currently on the board, row by row.
    pub fn pieces(&self) -> impl Iterator<Item = &Piece> {
        self.cells.iter().flatten().flatten()
    }

    /// The master of a color, if it is still on the board.
    pub fn master_of(&self, color: Color) -> Option<&Piece> {
        self.pieces()
            .find(|piece| piece.color == color && piece.is_master())
    }

    /// Rows of cells, used to build snapshots.
    pub fn rows(&self) -> &[[Option<Piece>; BOARD_DIM]; BOARD_DIM] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starting_layout() {
        let board = Board::starting();
        assert_eq!(board.pieces().count(), 10);
        let red_master = board.master_of(Color::Red).unwrap();
        assert_eq!(red_master.position, Position::new(2, 0));
        let blue_master = board.master_of(Color::Blue).unwrap();
        assert_eq!(blue_master.position, Position::new(2, 4));
        for x in [0, 1, 3, 4] {
            let piece = board.piece_at(Position::new(x, 0)).unwrap();
            assert_eq!((piece.color, piece.rank), (Color::Red, Rank::Student));
        }
        assert!(board.piece_at(Position::new(2, 2)).is_none());
    }

    #[test]
    fn stored_positions_match_cells() {
        let board = Board::starting();
        for (y, row) in board.rows().iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if let Some(piece) = cell {
                    assert_eq!(piece.position, Position::new(x as i8, y as i8));
                }
            }
        }
    }

    #[test]
    fn relocate_captures_and_updates_position() {
        let mut board = Board::empty();
        board.place(Piece::new(Color::Red, Rank::Student, Position::new(1, 1)));
        board.place(Piece::new(Color::Blue, Rank::Student, Position::new(1, 2)));

        let captured = board.relocate(Position::new(1, 1), Position::new(1, 2));
        assert_eq!(captured.unwrap().unwrap().color, Color::Blue);
        assert!(board.piece_at(Position::new(1, 1)).is_none());
        let moved = board.piece_at(Position::new(1, 2)).unwrap();
        assert_eq!(moved.color, Color::Red);
        assert_eq!(moved.position, Position::new(1, 2));
        assert_eq!(board.pieces().count(), 1);
    }

    #[test]
    fn relocate_from_empty_square_is_a_no_op() {
        let mut board = Board::starting();
        let before = board.clone();
        assert!(board.relocate(Position::new(2, 2), Position::new(2, 3)).is_none());
        assert_eq!(board, before);
    }

    #[test]
    fn off_board_lookup_is_empty() {
        let board = Board::starting();
        assert!(board.piece_at(Position::new(-1, 0)).is_none());
        assert!(board.piece_at(Position::new(0, 5)).is_none());
    }
}
