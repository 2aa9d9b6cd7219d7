//! The rules of one match: legal move generation, the card exchange, turn alternation and the
//! two win conditions.
//!
//! ```text
//!  validate_input ──► legal_moves ──► apply_move ──► check_victory
//!   (read only)       (read only)     (mutates)       (read only)
//! ```

use crate::board::Board;
use crate::card::Card;
use crate::card_pool::CardPool;
use crate::error::InputError;
use crate::piece::{Color, Position};
use rand::Rng;

/// One destination a piece can reach with one of the mover's cards.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct LegalMove {
    pub card: Card,
    pub target: Position,
}

/// The complete state of a match.
#[derive(PartialEq, Debug, Clone)]
pub struct MatchEngine {
    board: Board,
    cards: CardPool,
    turn_owner: Color,
}

impl MatchEngine {
    /// Sets up a fresh match: pieces on their home rows, five random cards dealt and a random
    /// color to move first.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let cards = CardPool::deal(rng);
        let turn_owner = if rng.gen_bool(0.5) {
            Color::Red
        } else {
            Color::Blue
        };
        MatchEngine {
            board: Board::starting(),
            cards,
            turn_owner,
        }
    }

    /// Builds an engine from an arbitrary position.
    pub fn from_parts(board: Board, cards: CardPool, turn_owner: Color) -> Self {
        MatchEngine {
            board,
            cards,
            turn_owner,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cards(&self) -> &CardPool {
        &self.cards
    }

    /// The color permitted to move next.
    pub fn turn_owner(&self) -> Color {
        self.turn_owner
    }

    /// Hands the turn to a color. Only meant for the moment a match gets started.
    pub fn set_turn_owner(&mut self, color: Color) {
        self.turn_owner = color;
    }

    /// All destinations the piece on `from` can reach with the turn owner's cards. Empty if the
    /// square is empty or holds a piece of the waiting color.
    pub fn legal_moves(&self, from: Position) -> Vec<LegalMove> {
        let Some(piece) = self.board.piece_at(from) else {
            return Vec::new();
        };
        if piece.color != self.turn_owner {
            return Vec::new();
        }
        let invert = self.turn_owner.requires_inversion();

        let mut moves = Vec::new();
        for card in self.cards.hand(self.turn_owner) {
            for vector in card.oriented_moves(invert) {
                let target = from.offset(vector.dx, vector.dy);
                if !target.is_on_board() {
                    continue;
                }
                match self.board.piece_at(target) {
                    Some(occupant) if occupant.color == piece.color => {}
                    _ => moves.push(LegalMove {
                        card: *card,
                        target,
                    }),
                }
            }
        }
        moves
    }

    /// [`Self::legal_moves`] restricted to one card.
    pub fn legal_moves_for_card(&self, from: Position, card_name: &str) -> Vec<LegalMove> {
        self.legal_moves(from)
            .into_iter()
            .filter(|legal| legal.card.name == card_name)
            .collect()
    }

    /// Pre-flight check of a move for the turn owner: coordinates, card ownership, source piece
    /// and its color. The destination is checked against [`Self::legal_moves`] separately.
    pub fn validate_input(
        &self,
        card_name: &str,
        from: Position,
        to: Position,
    ) -> Result<(), InputError> {
        if !from.is_on_board() || !to.is_on_board() {
            return Err(InputError::OutOfRange);
        }
        if self.cards.card_in_hand(self.turn_owner, card_name).is_none() {
            return Err(InputError::CardNotInHand {
                card: card_name.to_string(),
                hand: self
                    .cards
                    .hand(self.turn_owner)
                    .iter()
                    .map(|card| card.name.to_string())
                    .collect(),
            });
        }
        let Some(piece) = self.board.piece_at(from) else {
            return Err(InputError::NoPieceAtSource);
        };
        if piece.color != self.turn_owner {
            return Err(InputError::NotYourPiece(self.turn_owner));
        }
        Ok(())
    }

    /// Executes a move of the turn owner. The used card goes to the neutral slot and the old
    /// neutral card replaces it in the hand, the piece moves (capturing whatever stands on the
    /// destination) and the turn passes to the other color. Returns the winner, if any.
    ///
    /// A rejected move leaves the engine untouched.
    pub fn apply_move(
        &mut self,
        card_name: &str,
        from: Position,
        to: Position,
    ) -> Result<Option<Color>, InputError> {
        self.validate_input(card_name, from, to)?;
        if !self
            .legal_moves_for_card(from, card_name)
            .iter()
            .any(|legal| legal.target == to)
        {
            return Err(InputError::IllegalDestination);
        }

        let mover = self.turn_owner;
        // Both succeed after the checks above.
        self.cards.exchange(mover, card_name);
        self.board.relocate(from, to);
        self.turn_owner = mover.opponent();
        Ok(self.check_victory())
    }

    /// A captured master loses first, then a master on the far row wins. Red is checked before
    /// Blue in both steps.
    pub fn check_victory(&self) -> Option<Color> {
        let red_master = self.board.master_of(Color::Red);
        let blue_master = self.board.master_of(Color::Blue);

        let (Some(red_master), Some(blue_master)) = (red_master, blue_master) else {
            return match red_master {
                None => Some(Color::Blue),
                Some(_) => Some(Color::Red),
            };
        };

        if red_master.position.y == Color::Red.far_row() {
            return Some(Color::Red);
        }
        if blue_master.position.y == Color::Blue.far_row() {
            return Some(Color::Blue);
        }
        None
    }
}
