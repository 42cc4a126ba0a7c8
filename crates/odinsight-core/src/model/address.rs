use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use crate::error::CoreError;

/// Display language for free-text notes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Language {
    #[default]
    Zh,
    En,
}

impl FromStr for Language {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "zh" | "zh-cn" | "cn" => Ok(Self::Zh),
            "en" | "en-us" => Ok(Self::En),
            _ => Err(CoreError::InvalidLanguage {
                language: s.to_owned(),
            }),
        }
    }
}

/// A note in both supported languages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedNote {
    pub zh: String,
    pub en: String,
}

impl LocalizedNote {
    pub fn new(zh: impl Into<String>, en: impl Into<String>) -> Self {
        Self {
            zh: zh.into(),
            en: en.into(),
        }
    }

    /// The note in `language`, or the other language when that one is blank.
    pub fn pick(&self, language: Language) -> &str {
        let (preferred, other) = match language {
            Language::Zh => (&self.zh, &self.en),
            Language::En => (&self.en, &self.zh),
        };
        if preferred.trim().is_empty() {
            other
        } else {
            preferred
        }
    }
}

/// A `{type, url}` verification link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
}

impl ProofLink {
    pub fn new(kind: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            url: url.into(),
        }
    }
}

/// One clustered address, note already localized. Identity is `address`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRow {
    pub label: String,
    pub chain: String,
    pub address: String,
    /// `YYYY-MM-DD`
    pub last_active: String,
    pub in_sum_btc: f64,
    pub out_sum_btc: f64,
    pub note: String,
    pub proofs: Vec<ProofLink>,
}

impl AddressRow {
    pub fn balance_btc(&self) -> f64 {
        self.in_sum_btc - self.out_sum_btc
    }
}

/// An address cluster as fetched or generated, before localization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressCluster {
    pub label: String,
    pub chain: String,
    pub address: String,
    pub last_active: String,
    pub in_sum_btc: f64,
    pub out_sum_btc: f64,
    pub note: LocalizedNote,
    pub proofs: Vec<ProofLink>,
}

impl AddressCluster {
    pub fn localize(self, language: Language) -> AddressRow {
        let note = self.note.pick(language).to_owned();
        AddressRow {
            label: self.label,
            chain: self.chain,
            address: self.address,
            last_active: self.last_active,
            in_sum_btc: self.in_sum_btc,
            out_sum_btc: self.out_sum_btc,
            note,
            proofs: self.proofs,
        }
    }
}
