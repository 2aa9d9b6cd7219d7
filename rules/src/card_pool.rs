//! The five cards in circulation and the exchange that moves them between the buckets.

use crate::card::{CARD_CATALOG, Card};
use crate::piece::Color;
use rand::Rng;
use rand::seq::SliceRandom;

/// The amount of cards dealt for one match.
pub const CARDS_IN_PLAY: usize = 5;

/// Five distinct cards, split into two hands of two and the neutral card.
#[derive(PartialEq, Debug, Clone)]
pub struct CardPool {
    red_hand: [Card; 2],
    blue_hand: [Card; 2],
    neutral: Card,
}

impl CardPool {
    /// Deals five distinct cards of the catalog: two to Red, two to Blue, one neutral.
    pub fn deal<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let drawn: Vec<Card> = CARD_CATALOG
            .choose_multiple(rng, CARDS_IN_PLAY)
            .copied()
            .collect();
        CardPool {
            red_hand: [drawn[0], drawn[1]],
            blue_hand: [drawn[2], drawn[3]],
            neutral: drawn[4],
        }
    }

    /// Builds a pool from explicit cards, used to set up known positions.
    ///
    /// # Panics
    /// The five cards have to be pairwise distinct.
    pub fn from_cards(red_hand: [Card; 2], blue_hand: [Card; 2], neutral: Card) -> Self {
        let pool = CardPool {
            red_hand,
            blue_hand,
            neutral,
        };
        let cards = pool.all_cards();
        for (index, card) in cards.iter().enumerate() {
            assert!(
                !cards[index + 1..].contains(card),
                "Card {} dealt twice.",
                card
            );
        }
        pool
    }

    /// The two cards a color currently holds.
    pub fn hand(&self, color: Color) -> &[Card; 2] {
        match color {
            Color::Red => &self.red_hand,
            Color::Blue => &self.blue_hand,
        }
    }

    pub fn neutral(&self) -> Card {
        self.neutral
    }

    /// The card of that name if the color holds it.
    pub fn card_in_hand(&self, color: Color, card_name: &str) -> Option<Card> {
        self.hand(color)
            .iter()
            .find(|card| card.name == card_name)
            .copied()
    }

    /// Swaps the used card with the neutral card: the used card becomes neutral and the previous
    /// neutral card takes its slot in the hand. Returns false if the color does not hold the card.
    pub fn exchange(&mut self, color: Color, card_name: &str) -> bool {
        let hand = match color {
            Color::Red => &mut self.red_hand,
            Color::Blue => &mut self.blue_hand,
        };
        let Some(slot) = hand.iter_mut().find(|card| card.name == card_name) else {
            return false;
        };
        std::mem::swap(slot, &mut self.neutral);
        true
    }

    /// All cards in circulation: Red's hand, Blue's hand, neutral.
    pub fn all_cards(&self) -> [Card; CARDS_IN_PLAY] {
        [
            self.red_hand[0],
            self.red_hand[1],
            self.blue_hand[0],
            self.blue_hand[1],
            self.neutral,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    fn card(name: &str) -> Card {
        Card::by_name(name).unwrap()
    }

    #[test]
    fn deal_draws_five_distinct_cards() {
        for seed in 0..50 {
            let pool = CardPool::deal(&mut StdRng::seed_from_u64(seed));
            let names: HashSet<&str> = pool.all_cards().iter().map(|card| card.name).collect();
            assert_eq!(names.len(), CARDS_IN_PLAY);
        }
    }

    #[test]
    fn exchange_moves_used_card_to_neutral() {
        let mut pool = CardPool::from_cards(
            [card("Tiger"), card("Crab")],
            [card("Monkey"), card("Ox")],
            card("Eel"),
        );
        assert!(pool.exchange(Color::Red, "Crab"));
        assert_eq!(pool.neutral(), card("Crab"));
        assert_eq!(pool.hand(Color::Red), &[card("Tiger"), card("Eel")]);
        assert_eq!(pool.hand(Color::Blue), &[card("Monkey"), card("Ox")]);

        assert!(pool.exchange(Color::Blue, "Monkey"));
        assert_eq!(pool.neutral(), card("Monkey"));
        assert_eq!(pool.hand(Color::Blue), &[card("Crab"), card("Ox")]);
    }

    #[test]
    fn exchange_of_foreign_card_changes_nothing() {
        let mut pool = CardPool::from_cards(
            [card("Tiger"), card("Crab")],
            [card("Monkey"), card("Ox")],
            card("Eel"),
        );
        let before = pool.clone();
        assert!(!pool.exchange(Color::Red, "Monkey"));
        assert!(!pool.exchange(Color::Red, "Eel"));
        assert_eq!(pool, before);
    }

    #[test]
    #[should_panic]
    fn duplicate_cards_are_rejected() {
        CardPool::from_cards(
            [card("Tiger"), card("Tiger")],
            [card("Monkey"), card("Ox")],
            card("Eel"),
        );
    }
}
