//! Adapter for the gi.yatta.moe v2 API.
//!
//! - `GET {base}/{lang}/avatar` lists every character keyed by id
//! - `GET {base}/{lang}/avatarFetter/{id}` holds per-character story texts

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use super::CharacterSource;
use crate::character::{Character, CharacterDetail, CharacterId};
use crate::error::{BirthcalError, BirthcalResult};
use crate::fetch::Fetcher;
use crate::language::Language;

pub const DEFAULT_BASE_URL: &str = "https://gi.yatta.moe/api/v2";

/// Story entry whose text is used as the event description.
const FLAVOR_STORY_KEY: &str = "0";

pub struct YattaSource {
    fetcher: Fetcher,
    base: Url,
    language: Language,
}

#[derive(Deserialize)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize)]
struct AvatarList {
    // Kept as raw values so one malformed item doesn't sink the whole list.
    items: serde_json::Map<String, Value>,
}

#[derive(Deserialize)]
struct AvatarItem {
    id: RawId,
    name: String,
    #[serde(default)]
    birthday: Option<RawBirthday>,
    #[serde(default)]
    beta: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(u64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawBirthday {
    Pair(u32, u32),
    Fields { month: u32, day: u32 },
}

#[derive(Deserialize)]
struct Fetter {
    #[serde(default)]
    story: BTreeMap<String, StoryEntry>,
}

#[derive(Deserialize)]
struct StoryEntry {
    #[serde(default)]
    text: Option<String>,
}

impl YattaSource {
    pub fn new(fetcher: Fetcher, base: Url, language: Language) -> BirthcalResult<Self> {
        if base.cannot_be_a_base() {
            return Err(BirthcalError::Config(format!(
                "API base URL '{}' cannot have path segments",
                base
            )));
        }

        Ok(YattaSource {
            fetcher,
            base,
            language,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> BirthcalResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                BirthcalError::Config(format!("API base URL '{}' is not a base", self.base))
            })?
            .pop_if_empty()
            .push(self.language.code())
            .extend(segments);
        Ok(url)
    }
}

impl CharacterSource for YattaSource {
    async fn characters(&self) -> BirthcalResult<Vec<Character>> {
        let url = self.endpoint(&["avatar"])?;
        let list: Envelope<AvatarList> = self.fetcher.get_json(&url).await?;
        Ok(characters_from_items(list.data.items))
    }

    async fn detail(&self, id: &CharacterId) -> BirthcalResult<CharacterDetail> {
        let url = self.endpoint(&["avatarFetter", &id.0])?;
        let fetter: Envelope<Fetter> = self.fetcher.get_json(&url).await?;
        Ok(detail_from_fetter(fetter.data))
    }
}

fn characters_from_items(items: serde_json::Map<String, Value>) -> Vec<Character> {
    items
        .into_iter()
        .filter_map(|(key, value)| match serde_json::from_value::<AvatarItem>(value) {
            Ok(item) => Some(item.into()),
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "skipping malformed avatar item");
                None
            }
        })
        .collect()
}

fn detail_from_fetter(fetter: Fetter) -> CharacterDetail {
    let flavor_text = fetter
        .story
        .get(FLAVOR_STORY_KEY)
        .and_then(|entry| entry.text.clone())
        .map(|text| text.replace("\\n", "\n"));

    CharacterDetail { flavor_text }
}

impl From<AvatarItem> for Character {
    fn from(item: AvatarItem) -> Self {
        let id = match item.id {
            RawId::Number(n) => CharacterId::from(n),
            RawId::Text(s) => CharacterId(s),
        };

        let birthday = item
            .birthday
            .map(|b| match b {
                RawBirthday::Pair(month, day) => (month, day),
                RawBirthday::Fields { month, day } => (month, day),
            })
            // The API uses [0, 0] for "unknown".
            .filter(|&(month, day)| month != 0 && day != 0);

        Character {
            id,
            name: item.name,
            birthday,
            beta: item.beta,
        }
    }
}
