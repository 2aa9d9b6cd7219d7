//! Rules engine for a two player abstract strategy game on a 5×5 board.
//!
//! Each player owns a master and four students and holds two movement cards. A fifth, neutral
//! card lies between the players. Playing a card moves one piece by one of the card's vectors and
//! swaps the card with the neutral one, so the opponent can use it after their next move.
//!
//! A match is won by capturing the opposing master or by moving the own master onto the opposing
//! home row. [`MatchEngine`] is the single entry point; the other types are the values it is
//! built from.

pub mod board;
pub mod card;
pub mod card_pool;
pub mod error;
pub mod match_engine;
pub mod move_vector;
pub mod piece;

pub use board::{BOARD_DIM, BOARD_DIMS, Board};
pub use card::{CARD_CATALOG, Card};
pub use card_pool::CardPool;
pub use error::InputError;
pub use match_engine::{LegalMove, MatchEngine};
pub use move_vector::MoveVector;
pub use piece::{Color, Piece, Position, Rank};
