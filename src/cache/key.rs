use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Identifies a cacheable linked record: `(entity, id)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    pub entity: String,
    pub id: String,
}

impl CacheKey {
    pub fn new(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Key of the `T` record with `id`.
    pub fn of<T: CachedRecord>(id: impl Into<String>) -> Self {
        Self::new(T::ENTITY, id)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.entity, self.id)
    }
}

/// A record type that widgets can link to by id.
pub trait CachedRecord: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Entity name used in cache keys and by the persistence client.
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    /// Text shown where the record is linked.
    fn label(&self) -> String {
        self.id().to_string()
    }

    /// Whether new links to this record are acceptable.
    fn is_selectable(&self) -> bool {
        true
    }
}
