//! Data models for content catalog responses

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which curated list a book belongs to.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Selected,
    Recommended,
    Suggested,
}

impl BookStatus {
    /// Value used for the `status` query parameter.
    pub fn as_query_value(self) -> &'static str {
        match self {
            BookStatus::Selected => "selected",
            BookStatus::Recommended => "recommended",
            BookStatus::Suggested => "suggested",
        }
    }
}

impl FromStr for BookStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "selected" => Ok(BookStatus::Selected),
            "recommended" => Ok(BookStatus::Recommended),
            "suggested" => Ok(BookStatus::Suggested),
            other => Err(format!("unknown list '{}', expected selected, recommended or suggested", other)),
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query_value())
    }
}

/// Formats a summary is offered in.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookType {
    #[serde(rename = "audio")]
    Audio,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "audio & text")]
    AudioAndText,
}

/// A book record as served by the catalog.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub author: String,
    pub title: String,
    #[serde(default)]
    pub sub_title: String,
    #[serde(default)]
    pub image_link: String,
    /// Empty when the book has no audio summary.
    #[serde(default)]
    pub audio_link: String,
    #[serde(default)]
    pub total_rating: f64,
    #[serde(default)]
    pub average_rating: f64,
    #[serde(default)]
    pub key_ideas: u32,
    #[serde(rename = "type", default)]
    pub book_type: Option<BookType>,
    #[serde(default)]
    pub status: Option<BookStatus>,
    #[serde(default)]
    pub subscription_required: bool,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub book_description: String,
    #[serde(default)]
    pub author_description: String,
}

impl Book {
    /// The audio link, if the book has one.
    pub fn audio_url(&self) -> Option<&str> {
        let link = self.audio_link.trim();
        if link.is_empty() {
            None
        } else {
            Some(link)
        }
    }
}
