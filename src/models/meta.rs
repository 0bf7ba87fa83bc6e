//! Score metadata projection
//!
//! `Meta` is a flat view of the score's metadata tags. It is built on demand
//! from the score and written back key by key; it is never stored on its own.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const SUBTITLE_KEY: &str = "subtitle";
pub const COMPOSER_KEY: &str = "composer";
pub const LYRICIST_KEY: &str = "lyricist";
pub const COPYRIGHT_KEY: &str = "copyright";
pub const TRANSLATOR_KEY: &str = "translator";
pub const ARRANGER_KEY: &str = "arranger";
pub const CREATION_DATE_KEY: &str = "creationDate";

/// The seven metadata keys written by `set_meta_info`, in write order
pub const META_KEYS: [&str; 7] = [
    SUBTITLE_KEY,
    COMPOSER_KEY,
    LYRICIST_KEY,
    COPYRIGHT_KEY,
    TRANSLATOR_KEY,
    ARRANGER_KEY,
    CREATION_DATE_KEY,
];

const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Score metadata
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Read from the score's title; not written back
    pub title: String,
    pub subtitle: String,
    pub composer: String,
    pub lyricist: String,
    pub copyright: String,
    pub translator: String,
    pub arranger: String,
    pub creation_date: Option<NaiveDate>,
}

impl Meta {
    /// The (key, value) pairs stored in the score's metadata tags
    pub fn tags(&self) -> [(&'static str, String); 7] {
        [
            (SUBTITLE_KEY, self.subtitle.clone()),
            (COMPOSER_KEY, self.composer.clone()),
            (LYRICIST_KEY, self.lyricist.clone()),
            (COPYRIGHT_KEY, self.copyright.clone()),
            (TRANSLATOR_KEY, self.translator.clone()),
            (ARRANGER_KEY, self.arranger.clone()),
            (CREATION_DATE_KEY, format_creation_date(self.creation_date)),
        ]
    }
}

/// Parse an ISO-8601 calendar date; anything else reads as "no date"
pub fn parse_creation_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(value, ISO_DATE_FORMAT) {
        Ok(date) => Some(date),
        Err(e) => {
            log::debug!("Ignoring non-ISO creation date '{}': {}", value, e);
            None
        }
    }
}

pub fn format_creation_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(ISO_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
