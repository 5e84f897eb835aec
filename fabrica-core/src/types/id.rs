//! Client-generated identifiers

use chrono::Utc;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Identifier minted from a millisecond timestamp.
///
/// Serialized as a JSON number. Deserialization also accepts integral floats
/// and numeric strings. Libraries written by earlier versions carry
/// fractional ids (a timestamp plus a random fraction); those are kept as
/// read and written back unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(Repr);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Repr {
    Whole(u64),
    /// Bits of a finite, positive, non-integral `f64`
    Fractional(u64),
}

pub type BookId = EntityId;
pub type ChapterId = EntityId;
pub type CollectionId = EntityId;
pub type GroupId = EntityId;
pub type AnnotationId = EntityId;

impl EntityId {
    pub const fn new(value: u64) -> Self {
        EntityId(Repr::Whole(value))
    }

    /// Id from a JSON number. Integral values become whole ids.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        if value.fract() == 0.0 {
            (value <= u64::MAX as f64).then(|| EntityId::new(value as u64))
        } else {
            Some(EntityId(Repr::Fractional(value.to_bits())))
        }
    }

    /// Largest whole number not above the id
    pub fn floor(&self) -> u64 {
        match self.0 {
            Repr::Whole(v) => v,
            Repr::Fractional(bits) => f64::from_bits(bits) as u64,
        }
    }

    pub fn is_fractional(&self) -> bool {
        matches!(self.0, Repr::Fractional(_))
    }

    fn as_f64(&self) -> f64 {
        match self.0 {
            Repr::Whole(v) => v as f64,
            Repr::Fractional(bits) => f64::from_bits(bits),
        }
    }
}

impl From<u64> for EntityId {
    fn from(value: u64) -> Self {
        EntityId::new(value)
    }
}

impl Ord for EntityId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0, other.0) {
            (Repr::Whole(a), Repr::Whole(b)) => a.cmp(&b),
            _ => self
                .floor()
                .cmp(&other.floor())
                .then_with(|| self.as_f64().total_cmp(&other.as_f64())),
        }
    }
}

impl PartialOrd for EntityId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Repr::Whole(v) => write!(f, "{v}"),
            Repr::Fractional(bits) => write!(f, "{}", f64::from_bits(bits)),
        }
    }
}

/// A string that is not a valid id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError(String);

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid id", self.0)
    }
}

impl std::error::Error for ParseIdError {}

impl FromStr for EntityId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(v) = s.parse::<u64>() {
            return Ok(EntityId::new(v));
        }
        s.parse::<f64>()
            .ok()
            .filter(|_| s.bytes().all(|b| b.is_ascii_digit() || b == b'.'))
            .and_then(EntityId::from_f64)
            .ok_or_else(|| ParseIdError(s.to_string()))
    }
}

impl Serialize for EntityId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Repr::Whole(v) => serializer.serialize_u64(v),
            Repr::Fractional(bits) => serializer.serialize_f64(f64::from_bits(bits)),
        }
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EntityIdVisitor)
    }
}

pub(crate) struct EntityIdVisitor;

impl<'de> Visitor<'de> for EntityIdVisitor {
    type Value = EntityId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a non-negative numeric id")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<EntityId, E> {
        Ok(EntityId::new(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<EntityId, E> {
        u64::try_from(v)
            .map(EntityId::new)
            .map_err(|_| E::custom(format!("negative id {v}")))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<EntityId, E> {
        EntityId::from_f64(v).ok_or_else(|| E::custom(format!("invalid id {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<EntityId, E> {
        v.parse().map_err(E::custom)
    }
}

/// Mints strictly increasing timestamp ids.
///
/// Several entities created in the same millisecond (all chapters of a new
/// book, for instance) still get distinct ids.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make sure future ids are greater than an id that already exists
    pub fn observe(&mut self, id: EntityId) {
        self.last = self.last.max(id.floor());
    }

    pub fn next_id(&mut self) -> EntityId {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        let next = now.max(self.last + 1);
        self.last = next;
        EntityId::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut ids = IdGenerator::new();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
    }

    #[test]
    fn test_observe_moves_past_existing_ids() {
        let mut ids = IdGenerator::new();
        ids.observe(EntityId::new(u64::MAX / 2));
        assert!(ids.next_id().floor() > u64::MAX / 2);
    }

    #[test]
    fn test_lenient_deserialization() {
        let ids: Vec<EntityId> = serde_json::from_str(r#"[17, 18.0, "19"]"#).unwrap();
        assert_eq!(ids, vec![EntityId::new(17), EntityId::new(18), EntityId::new(19)]);
        assert!(serde_json::from_str::<EntityId>("-3").is_err());
        assert!(serde_json::from_str::<EntityId>("-1.5").is_err());
        assert!("abc".parse::<EntityId>().is_err());
        assert!("1e5".parse::<EntityId>().is_err());
        assert_eq!(serde_json::to_string(&EntityId::new(42)).unwrap(), "42");
    }

    #[test]
    fn test_fractional_ids_are_kept() {
        let json = "1700000000000.4568";
        let id: EntityId = serde_json::from_str(json).unwrap();
        assert!(id.is_fractional());
        assert_eq!(id.floor(), 1_700_000_000_000);
        assert_eq!(serde_json::to_string(&id).unwrap(), json);
        assert_eq!(id.to_string(), json);
        assert_eq!(json.parse::<EntityId>(), Ok(id));
        assert_ne!(id, EntityId::new(1_700_000_000_000));
    }

    #[test]
    fn test_fractional_ids_order_between_whole_ids() {
        let id: EntityId = "17.5".parse().unwrap();
        assert!(EntityId::new(17) < id && id < EntityId::new(18));

        let mut ids = IdGenerator::new();
        ids.observe(id);
        assert!(ids.next_id() > id);
    }
}
