//! Source-neutral character records.

use std::fmt;

/// A character as listed by a `CharacterSource`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    /// (month, day), if the character has a known birthday
    pub birthday: Option<(u32, u32)>,
    /// Unreleased or placeholder entry
    pub beta: bool,
}

/// API identifier. Usually numeric, but the player avatar uses suffixed ids
/// such as `10000005-anemo`, so the textual form is kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CharacterId(pub String);

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for CharacterId {
    fn from(id: u64) -> Self {
        CharacterId(id.to_string())
    }
}

/// Supplementary per-character text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CharacterDetail {
    pub flavor_text: Option<String>,
}

/// Ids of the player avatar (one per sibling); elemental variants add a
/// `-<element>` suffix.
const PLAYER_AVATAR_IDS: [&str; 2] = ["10000005", "10000007"];

impl CharacterId {
    pub fn is_player_avatar(&self) -> bool {
        PLAYER_AVATAR_IDS.iter().any(|base| {
            self.0
                .strip_prefix(base)
                .is_some_and(|rest| rest.is_empty() || rest.starts_with('-'))
        })
    }
}

impl Character {
    /// Whether this record must never become an event.
    pub fn is_placeholder(&self, excluded_names: &[String], include_beta: bool) -> bool {
        (self.beta && !include_beta)
            || self.id.is_player_avatar()
            || excluded_names.iter().any(|n| *n == self.name)
    }
}
