//! API language selection and the localized strings that depend on it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BirthcalError;

/// Language codes accepted by the game-data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Chs,
    Cht,
    En,
    Fr,
    De,
    Es,
    Pt,
    Ru,
    Jp,
    Kr,
    Th,
    Vi,
    Id,
    Tr,
    It,
}

impl Language {
    pub const ALL: [Language; 15] = [
        Language::Chs,
        Language::Cht,
        Language::En,
        Language::Fr,
        Language::De,
        Language::Es,
        Language::Pt,
        Language::Ru,
        Language::Jp,
        Language::Kr,
        Language::Th,
        Language::Vi,
        Language::Id,
        Language::Tr,
        Language::It,
    ];

    /// Path segment used by the API.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Chs => "chs",
            Language::Cht => "cht",
            Language::En => "en",
            Language::Fr => "fr",
            Language::De => "de",
            Language::Es => "es",
            Language::Pt => "pt",
            Language::Ru => "ru",
            Language::Jp => "jp",
            Language::Kr => "kr",
            Language::Th => "th",
            Language::Vi => "vi",
            Language::Id => "id",
            Language::Tr => "tr",
            Language::It => "it",
        }
    }

    /// Event summary for a character's birthday.
    pub fn summary(&self, name: &str) -> String {
        match self {
            Language::Chs | Language::Cht => format!("{name}的生日"),
            Language::En => format!("{name}'s birthday"),
            Language::Fr => format!("Anniversaire de {name}"),
            Language::De => format!("Geburtstag von {name}"),
            Language::Es => format!("Cumpleaños de {name}"),
            Language::Pt => format!("Aniversário de {name}"),
            Language::Ru => format!("День рождения: {name}"),
            Language::Jp => format!("{name}の誕生日"),
            Language::Kr => format!("{name}의 생일"),
            Language::Th => format!("วันเกิดของ {name}"),
            Language::Vi => format!("Sinh nhật {name}"),
            Language::Id => format!("Ulang tahun {name}"),
            Language::Tr => format!("{name} doğum günü"),
            Language::It => format!("Compleanno di {name}"),
        }
    }

    pub fn calendar_name(&self) -> &'static str {
        match self {
            Language::Chs => "原神生日日历",
            Language::Cht => "原神生日日曆",
            Language::Jp => "原神誕生日カレンダー",
            _ => "Genshin Impact Birthday Calendar",
        }
    }

    pub fn calendar_description(&self) -> &'static str {
        match self {
            Language::Chs => "提瓦特全角色生日日历",
            Language::Cht => "提瓦特全角色生日日曆",
            Language::Jp => "テイワットの全キャラクターの誕生日",
            _ => "Birthdays of every character in Teyvat",
        }
    }

    /// Localized name of the player avatar, which has no birthday of its own.
    pub fn traveler_name(&self) -> &'static str {
        match self {
            Language::Chs | Language::Cht => "旅行者",
            Language::En => "Traveler",
            Language::Fr => "Voyageur",
            Language::De => "Reisender",
            Language::Es => "Viajero",
            Language::Pt => "Viajante",
            Language::Ru => "Путешественник",
            Language::Jp => "旅人",
            Language::Kr => "여행자",
            Language::Th => "นักเดินทาง",
            Language::Vi => "Nhà Lữ Hành",
            Language::Id => "Pengembara",
            Language::Tr => "Gezgin",
            Language::It => "Viaggiatore",
        }
    }

    /// Wiki page template for character links, `{name}` is substituted.
    pub fn default_wiki_url(&self) -> Option<&'static str> {
        match self {
            Language::Chs | Language::Cht => Some("https://wiki.biligame.com/ys/{name}"),
            Language::En => Some("https://genshin-impact.fandom.com/wiki/{name}"),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = BirthcalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim().to_ascii_lowercase();
        Language::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| BirthcalError::UnknownLanguage(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip_through_from_str() {
        for lang in Language::ALL {
            assert_eq!(lang.code().parse::<Language>().unwrap(), lang);
        }
        assert_eq!("EN".parse::<Language>().unwrap(), Language::En);
    }

    #[test]
    fn test_unknown_code_is_rejected() {
        let err = "xx".parse::<Language>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported language code 'xx'");
    }

    #[test]
    fn test_summaries() {
        assert_eq!(Language::En.summary("Amber"), "Amber's birthday");
        assert_eq!(Language::Chs.summary("安柏"), "安柏的生日");
    }

    #[test]
    fn test_serde_uses_api_codes() {
        #[derive(Deserialize)]
        struct Wrapper {
            language: Language,
        }
        let w: Wrapper = toml::from_str("language = \"jp\"").unwrap();
        assert_eq!(w.language, Language::Jp);
    }
}
