//! Character data sources.
//!
//! A source lists characters and, on request, fetches supplementary text for
//! one of them. Each upstream API gets its own adapter that maps its response
//! shape onto [`Character`] and [`CharacterDetail`].

mod yatta;

pub use yatta::{DEFAULT_BASE_URL, YattaSource};

use crate::character::{Character, CharacterDetail, CharacterId};
use crate::error::BirthcalResult;

#[allow(async_fn_in_trait)]
pub trait CharacterSource {
    /// All characters, in the order the upstream lists them.
    async fn characters(&self) -> BirthcalResult<Vec<Character>>;

    /// Supplementary text for one character.
    async fn detail(&self, id: &CharacterId) -> BirthcalResult<CharacterDetail>;
}
