//! Chapter content items and translations

use super::artisan::{Artisan, Producer};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Producer name stored alongside the author's own text
pub const BASE_PRODUCER_NAME: &str = "Texto Base";

/// One text variant of a chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContentItem {
    #[serde(rename = "artesanoId")]
    pub producer: Producer,

    #[serde(rename = "nombreArtesano")]
    pub producer_name: String,

    #[serde(rename = "texto")]
    pub text: String,

    /// Absent on error placeholders
    #[serde(
        rename = "fechaCreacion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl ContentItem {
    pub fn base(text: impl Into<String>) -> Self {
        Self {
            producer: Producer::Base,
            producer_name: BASE_PRODUCER_NAME.to_string(),
            text: text.into(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn generated(artisan: &Artisan, text: impl Into<String>) -> Self {
        Self {
            producer: artisan.id.into(),
            producer_name: artisan.name.clone(),
            text: text.into(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn failed(artisan: &Artisan, message: &str) -> Self {
        Self {
            producer: artisan.id.into(),
            producer_name: artisan.name.clone(),
            text: format!("**ERROR AL GENERAR:** {message}"),
            created_at: None,
        }
    }
}

/// A chapter's base text rendered into another language
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Translation {
    #[serde(rename = "idioma")]
    pub language: String,

    #[serde(rename = "texto")]
    pub text: String,

    #[serde(
        rename = "fechaCreacion",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
}

impl Translation {
    pub fn generated(language: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            text: text.into(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn failed(language: impl Into<String>, message: &str) -> Self {
        Self {
            language: language.into(),
            text: format!("**ERROR AL TRADUCIR:** {message}"),
            created_at: None,
        }
    }
}
