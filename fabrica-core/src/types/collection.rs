//! Collections: user-defined labels for grouping books

use super::CollectionId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Collection {
    pub id: CollectionId,

    #[serde(rename = "nombre")]
    pub name: String,
}
