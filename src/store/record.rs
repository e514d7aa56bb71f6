use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::collections::btree_map;

/// Everything stored for one person: key -> raw value bytes.
///
/// Backed by a `BTreeMap`, so iteration (and therefore the encoded file)
/// is ordered by key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(BTreeMap<String, Vec<u8>>);

/// Candidate key/value pairs of an update, before merging.
pub type Payload = Record;

impl Record {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Inserts or overwrites `key`.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.0.get(key).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Vec<u8>> {
        self.0.iter()
    }

    /// Overwrites every key present in `payload`; other keys are kept.
    pub fn merge(&mut self, payload: Payload) {
        self.0.extend(payload.0);
    }

    /// Sum of value lengths in bytes. Keys are not counted.
    pub fn data_size(&self) -> u64 {
        self.0.values().map(|value| value.len() as u64).sum()
    }

    /// JSON object view used as the `data` member of a response.
    pub fn to_json_object(&self) -> Map<String, Value> {
        self.0
            .iter()
            .map(|(key, value)| {
                (
                    key.clone(),
                    Value::String(String::from_utf8_lossy(value).into_owned()),
                )
            })
            .collect()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<Vec<u8>>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (key, value) in iter {
            record.insert(key, value);
        }
        record
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = (&'a String, &'a Vec<u8>);
    type IntoIter = btree_map::Iter<'a, String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
