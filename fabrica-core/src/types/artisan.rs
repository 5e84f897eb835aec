//! Artisans: named prompt templates applied to a chapter's base text

use super::id::{EntityId, EntityIdVisitor, GroupId};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wire value of the reserved translation artisan
pub const MULTICULTURAL_KEY: &str = "multicultural";

/// Wire value of the producer of a chapter's base text
pub const BASE_KEY: &str = "base";

/// Identifier of an artisan. One value is reserved for the translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArtisanId {
    Multicultural,
    Custom(EntityId),
}

impl ArtisanId {
    pub fn is_multicultural(&self) -> bool {
        matches!(self, ArtisanId::Multicultural)
    }
}

impl From<EntityId> for ArtisanId {
    fn from(id: EntityId) -> Self {
        ArtisanId::Custom(id)
    }
}

impl fmt::Display for ArtisanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtisanId::Multicultural => f.write_str(MULTICULTURAL_KEY),
            ArtisanId::Custom(id) => write!(f, "{id}"),
        }
    }
}

impl FromStr for ArtisanId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == MULTICULTURAL_KEY {
            return Ok(ArtisanId::Multicultural);
        }
        s.parse::<EntityId>()
            .map(ArtisanId::Custom)
            .map_err(|_| format!("`{s}` is not an artisan id"))
    }
}

impl Serialize for ArtisanId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ArtisanId::Multicultural => serializer.serialize_str(MULTICULTURAL_KEY),
            ArtisanId::Custom(id) => id.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for ArtisanId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match deserializer.deserialize_any(ProducerVisitor)? {
            Producer::Artisan(id) => Ok(id),
            Producer::Base => Err(de::Error::custom("`base` is not an artisan id")),
        }
    }
}

/// Who produced a content item: the author (base text) or an artisan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Producer {
    Base,
    Artisan(ArtisanId),
}

impl Producer {
    pub fn is_base(&self) -> bool {
        matches!(self, Producer::Base)
    }

    pub fn artisan(&self) -> Option<ArtisanId> {
        match self {
            Producer::Base => None,
            Producer::Artisan(id) => Some(*id),
        }
    }
}

impl From<ArtisanId> for Producer {
    fn from(id: ArtisanId) -> Self {
        Producer::Artisan(id)
    }
}

impl fmt::Display for Producer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Base => f.write_str(BASE_KEY),
            Producer::Artisan(id) => id.fmt(f),
        }
    }
}

impl FromStr for Producer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim() == BASE_KEY {
            Ok(Producer::Base)
        } else {
            s.parse().map(Producer::Artisan)
        }
    }
}

impl Serialize for Producer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Producer::Base => serializer.serialize_str(BASE_KEY),
            Producer::Artisan(id) => id.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Producer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ProducerVisitor)
    }
}

struct ProducerVisitor;

impl<'de> Visitor<'de> for ProducerVisitor {
    type Value = Producer;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("\"base\", \"multicultural\" or a numeric artisan id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Producer, E> {
        EntityIdVisitor.visit_u64(v).map(|id| Producer::Artisan(id.into()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Producer, E> {
        EntityIdVisitor.visit_i64(v).map(|id| Producer::Artisan(id.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Producer, E> {
        EntityIdVisitor.visit_f64(v).map(|id| Producer::Artisan(id.into()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Producer, E> {
        v.parse().map_err(E::custom)
    }
}

/// A named text transformation sent to the generative API
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Artisan {
    pub id: ArtisanId,

    #[serde(rename = "nombre")]
    pub name: String,

    pub prompt: String,
}

impl Artisan {
    pub fn new(id: ArtisanId, name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            prompt: prompt.into(),
        }
    }

    /// The reserved translator entry
    pub fn multicultural() -> Self {
        Self::new(
            ArtisanId::Multicultural,
            "Artesano Multicultural",
            "Este es un artesano especial para traducciones.",
        )
    }

    /// Artisans seeded on first start
    pub fn defaults() -> Vec<Artisan> {
        vec![
            Self::new(
                ArtisanId::Custom(EntityId::new(1)),
                "Corrector Ortográfico y Gramatical",
                "Corrige la ortografía y la gramática del siguiente texto. No alteres el significado ni el estilo. Simplemente devuelve el texto corregido.",
            ),
            Self::new(
                ArtisanId::Custom(EntityId::new(2)),
                "Resumen Ejecutivo (50 palabras)",
                "Crea un resumen ejecutivo de no más de 50 palabras para el siguiente texto.",
            ),
            Self::new(
                ArtisanId::Custom(EntityId::new(3)),
                "Transformar a Tono Casual",
                "Re-escribe el siguiente texto con un tono más casual, amigable y conversacional, como si se lo estuvieras contando a un amigo.",
            ),
            Self::multicultural(),
        ]
    }
}

/// A saved selection preset of artisans
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArtisanGroup {
    pub id: GroupId,

    #[serde(rename = "nombre")]
    pub name: String,

    #[serde(rename = "artesanoIds", default)]
    pub artisan_ids: Vec<ArtisanId>,
}
