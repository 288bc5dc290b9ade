//! Short public identity tokens.

use std::fmt;

use qrmenu_core::error::DomainError;
use qrmenu_core::rng::DeterministicRng;
use serde::{Deserialize, Serialize};

/// Number of characters in a public token.
pub const TOKEN_LENGTH: usize = 8;

/// Alphabet tokens are drawn from. 62^8 gives roughly 2.18 × 10^14 values.
///
/// Look-alike glyphs (`0`/`O`, `1`/`l`/`I`) stay in: without them an
/// 8-character token falls to 57^8, about 1.1 × 10^14 values.
pub const TOKEN_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// The short public identity a menu is shared under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PublicToken(String);

impl PublicToken {
    /// Draws a random token from `rng`.
    pub fn generate(rng: &mut dyn DeterministicRng) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let max_index = (TOKEN_ALPHABET.len() - 1) as u32;
        let token = (0..TOKEN_LENGTH)
            .map(|_| {
                let index = rng.next_u32_range(0, max_index) as usize % TOKEN_ALPHABET.len();
                char::from(TOKEN_ALPHABET[index])
            })
            .collect();
        Self(token)
    }

    /// Parses a token received from outside the domain.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `raw` is not exactly
    /// [`TOKEN_LENGTH`] characters from [`TOKEN_ALPHABET`].
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        if raw.len() != TOKEN_LENGTH || !raw.bytes().all(|b| TOKEN_ALPHABET.contains(&b)) {
            return Err(DomainError::invalid_field(
                "public_token",
                format!("must be {TOKEN_LENGTH} alphanumeric characters"),
            ));
        }
        Ok(Self(raw.to_owned()))
    }

    /// Returns the token as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PublicToken {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PublicToken> for String {
    fn from(token: PublicToken) -> Self {
        token.0
    }
}
