//! The movement cards and the fixed catalog they are dealt from.
//!
//! All vectors are written from Blue's point of view (Blue starts on row 4 and moves towards
//! row 0). Red looks at the board from the other side and uses the inverted vectors.

use crate::move_vector::MoveVector;
use std::fmt;

/// The amount of cards in the catalog.
pub const CATALOG_SIZE: usize = 16;

/// A named, immutable set of moves.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub struct Card {
    /// The unique name of the card within the catalog.
    pub name: &'static str,
    /// Between two and four move vectors in canonical orientation.
    pub moves: &'static [MoveVector],
}

use MoveVector as V;

/// The complete card catalog. Matches are dealt five distinct cards out of it.
#[rustfmt::skip]
pub static CARD_CATALOG: [Card; CATALOG_SIZE] = [
    Card { name: "Tiger", moves: &[V::new(0, -2), V::new(0, 1)] },
    Card { name: "Dragon", moves: &[V::new(-2, -1), V::new(-1, 1), V::new(2, -1), V::new(1, 1)] },
    Card { name: "Frog", moves: &[V::new(-2, 0), V::new(-1, -1), V::new(1, 1)] },
    Card { name: "Rabbit", moves: &[V::new(1, -1), V::new(2, 0), V::new(-1, 1)] },
    Card { name: "Crab", moves: &[V::new(0, -1), V::new(-2, 0), V::new(2, 0)] },
    Card { name: "Elephant", moves: &[V::new(1, 0), V::new(-1, -1), V::new(1, -1), V::new(-1, 0)] },
    Card { name: "Goose", moves: &[V::new(-1, 0), V::new(-1, -1), V::new(1, 0), V::new(1, 1)] },
    Card { name: "Rooster", moves: &[V::new(1, 0), V::new(1, -1), V::new(-1, 0), V::new(-1, 1)] },
    Card { name: "Monkey", moves: &[V::new(-1, -1), V::new(1, -1), V::new(-1, 1), V::new(1, 1)] },
    Card { name: "Mantis", moves: &[V::new(-1, -1), V::new(1, -1), V::new(0, 1)] },
    Card { name: "Horse", moves: &[V::new(0, -1), V::new(-1, 0), V::new(0, 1)] },
    Card { name: "Ox", moves: &[V::new(0, -1), V::new(1, 0), V::new(0, 1)] },
    Card { name: "Crane", moves: &[V::new(0, -1), V::new(1, 1), V::new(-1, 1)] },
    Card { name: "Boar", moves: &[V::new(0, -1), V::new(1, 0), V::new(-1, 0)] },
    Card { name: "Eel", moves: &[V::new(1, 0), V::new(-1, -1), V::new(-1, 1)] },
    Card { name: "Cobra", moves: &[V::new(-1, 0), V::new(1, -1), V::new(1, 1)] },
];

impl Card {
    /// Looks up a card of the catalog by its name.
    pub fn by_name(name: &str) -> Option<Card> {
        CARD_CATALOG.iter().find(|card| card.name == name).copied()
    }

    /// The moves of the card as seen by a player, inverted if requested.
    pub fn oriented_moves(&self, invert: bool) -> impl Iterator<Item = MoveVector> + '_ {
        self.moves
            .iter()
            .map(move |vector| if invert { vector.invert() } else { *vector })
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_names_are_unique() {
        let names: HashSet<&str> = CARD_CATALOG.iter().map(|card| card.name).collect();
        assert_eq!(names.len(), CATALOG_SIZE);
    }

    #[test]
    fn every_card_has_two_to_four_distinct_moves() {
        for card in CARD_CATALOG.iter() {
            assert!((2..=4).contains(&card.moves.len()), "{} has a bad size", card);
            let distinct: HashSet<MoveVector> = card.moves.iter().copied().collect();
            assert_eq!(distinct.len(), card.moves.len(), "{} repeats a move", card);
        }
    }

    #[test]
    fn lookup_by_name() {
        let boar = Card::by_name("Boar").unwrap();
        assert_eq!(boar.moves[0], MoveVector::new(0, -1));
        assert!(Card::by_name("Phoenix").is_none());
    }

    #[test]
    fn oriented_moves_inverts_on_request() {
        let tiger = Card::by_name("Tiger").unwrap();
        let inverted: Vec<MoveVector> = tiger.oriented_moves(true).collect();
        assert_eq!(inverted, vec![MoveVector::new(0, 2), MoveVector::new(0, -1)]);
        let canonical: Vec<MoveVector> = tiger.oriented_moves(false).collect();
        assert_eq!(canonical, tiger.moves.to_vec());
    }
}
