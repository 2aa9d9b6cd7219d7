//! Reasons a move gets rejected. A rejected move never changes the match.

use crate::piece::Color;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("Invalid coordinates. All coordinates must be between 0 and 4.")]
    OutOfRange,
    #[error("Invalid card name {card}. Available cards for current player: {hand:?}")]
    CardNotInHand { card: String, hand: Vec<String> },
    #[error("No piece at the given coordinates. Please choose a piece to move.")]
    NoPieceAtSource,
    #[error("The selected piece does not belong to {0}. Please choose a piece of your own color.")]
    NotYourPiece(Color),
    #[error("Invalid move. The card does not allow that destination.")]
    IllegalDestination,
}
