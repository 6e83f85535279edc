//! Attributes: the opaque payload carried by every entity.

use serde_json::{Map, Value};

/// Field name → value mapping copied verbatim from a source record.
///
/// The store never inspects it. Being a map (not a bare `Value`) makes a
/// null or absent payload unrepresentable.
pub type Attributes = Map<String, Value>;

/// One raw record as delivered by a record source.
pub type Record = Map<String, Value>;

/// Build an [`Attributes`] map from `(key, value)` pairs.
pub fn attributes<K, V, I>(pairs: I) -> Attributes
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}
