//! User preferences persisted between sessions

use crate::types::BookId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_FONT_SIZE: u8 = 12;
pub const MAX_FONT_SIZE: u8 = 32;
pub const FONT_STEP: u8 = 2;

/// Top-level views of the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum View {
    #[default]
    #[serde(rename = "Mis Libros")]
    MyBooks,
    #[serde(rename = "Colecciones")]
    Collections,
    #[serde(rename = "Área de Creación")]
    Creation,
    #[serde(rename = "Biblioteca")]
    Library,
    #[serde(rename = "Artesanos")]
    Artisans,
    #[serde(rename = "Lector")]
    Reader,
    #[serde(rename = "Gestión de Etiquetas")]
    TagManager,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::MyBooks => "Mis Libros",
            View::Collections => "Colecciones",
            View::Creation => "Área de Creación",
            View::Library => "Biblioteca",
            View::Artisans => "Artesanos",
            View::Reader => "Lector",
            View::TagManager => "Gestión de Etiquetas",
        })
    }
}

/// Reader color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Claro,
    Oscuro,
    Sepia,
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claro" | "light" => Ok(Theme::Claro),
            "oscuro" | "dark" => Ok(Theme::Oscuro),
            "sepia" => Ok(Theme::Sepia),
            other => Err(format!("unknown theme `{other}` (claro, oscuro, sepia)")),
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Claro => "claro",
            Theme::Oscuro => "oscuro",
            Theme::Sepia => "sepia",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderPreferences {
    pub font_size: u8,
    pub theme: Theme,
}

impl Default for ReaderPreferences {
    fn default() -> Self {
        Self {
            font_size: 16,
            theme: Theme::Claro,
        }
    }
}

impl ReaderPreferences {
    /// Step the font size up or down, staying within bounds
    pub fn adjust_font(&mut self, larger: bool) -> u8 {
        self.font_size = if larger {
            self.font_size.saturating_add(FONT_STEP)
        } else {
            self.font_size.saturating_sub(FONT_STEP)
        }
        .clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
        self.font_size
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub dark_mode: bool,

    #[serde(default)]
    pub active_view: View,

    #[serde(default)]
    pub selected_book: Option<BookId>,

    #[serde(default)]
    pub reader: ReaderPreferences,
}
