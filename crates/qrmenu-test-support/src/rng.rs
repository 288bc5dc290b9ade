//! Deterministic `DeterministicRng` implementations for tests.

use qrmenu_core::rng::DeterministicRng;
use qrmenu_menu::domain::token::TOKEN_ALPHABET;

/// A no-op RNG that always returns `min`. Every token it draws is
/// `00000000`.
#[derive(Debug)]
pub struct MockRng;

impl DeterministicRng for MockRng {
    fn next_u32_range(&mut self, min: u32, _max: u32) -> u32 {
        min
    }
}

/// An RNG that returns values from a predetermined sequence. Panics if the
/// sequence is exhausted.
#[derive(Debug)]
pub struct SequenceRng {
    values: Vec<u32>,
    index: usize,
}

impl SequenceRng {
    /// Create a new `SequenceRng` with the given values.
    #[must_use]
    pub fn new(values: Vec<u32>) -> Self {
        Self { values, index: 0 }
    }

    /// Create a `SequenceRng` whose successive token draws spell out
    /// `tokens`, in order.
    ///
    /// # Panics
    ///
    /// Panics if a token contains a character outside the token alphabet.
    #[must_use]
    pub fn for_tokens(tokens: &[&str]) -> Self {
        let values = tokens
            .iter()
            .flat_map(|token| token.bytes())
            .map(|b| {
                let index = TOKEN_ALPHABET
                    .iter()
                    .position(|&c| c == b)
                    .expect("token character outside alphabet");
                u32::try_from(index).unwrap()
            })
            .collect();
        Self::new(values)
    }

    /// Number of values handed out so far.
    #[must_use]
    pub fn consumed(&self) -> usize {
        self.index
    }
}

impl DeterministicRng for SequenceRng {
    fn next_u32_range(&mut self, _min: u32, _max: u32) -> u32 {
        let val = self.values[self.index];
        self.index += 1;
        val
    }
}
