//! # Persisted document and its codec.
//!
//! [`Document`] is the single JSON object every instance reads and writes. It is
//! decoded with a **shallow merge**: defaults for every top-level field, overlaid by
//! whatever top-level fields the slot holds. Nested values (`profiles`) are taken
//! wholesale from storage, never merged entry by entry.
//!
//! ## Persisted layout
//! ```text
//! {
//!   "apiToken": null | "<opaque>",
//!   "apiRate":  30,
//!   "running":  true,
//!   "profiles": { "<id>": { "id": <id>, ... }, ... },
//!   "throttle": { ... }            // absent until first set
//! }
//! ```
//!
//! ## Rules
//! - Decoding never fails: missing, unparsable, falsy or non-object content yields
//!   [`Document::default`].
//! - The merge is per field: a top-level field with an unexpected type falls back to
//!   its own default; every other stored field is kept.
//! - A stored profile that cannot be read is dropped; the others are kept.
//! - Unknown top-level fields are kept in [`Document::extra`] and written back.
//! - A profile's key is always derived from its own `id` on insert.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// Request budget used until the user picks one.
pub const DEFAULT_API_RATE: u32 = 30;

/// Identifier of a player profile.
///
/// The UI sends either numeric or string ids; any JSON number or string is
/// accepted and keeps its JSON representation. The storage key is the text form a
/// JavaScript object key would take, so `7`, `7.0` and `"7"` share one key.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileId {
    /// Integral id that fits in an `i64` (`7`).
    Int(i64),
    /// Any other number (`7.5`, `7.0`, or an integer above `i64::MAX`).
    Num(Number),
    /// Textual id (`"abc"`).
    Str(String),
}

/// Floats up to 2^53 print exactly as integers.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

impl ProfileId {
    /// Returns the key this id is stored under in [`Document::profiles`].
    pub fn key(&self) -> String {
        match self {
            ProfileId::Int(n) => n.to_string(),
            ProfileId::Num(n) => match n.as_f64() {
                Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT => {
                    format!("{}", f as i64)
                }
                _ => n.to_string(),
            },
            ProfileId::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileId::Int(n) => write!(f, "{n}"),
            ProfileId::Num(n) => write!(f, "{n}"),
            ProfileId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ProfileId {
    fn from(n: i64) -> Self {
        ProfileId::Int(n)
    }
}

impl From<i32> for ProfileId {
    fn from(n: i32) -> Self {
        ProfileId::Int(i64::from(n))
    }
}

impl From<u32> for ProfileId {
    fn from(n: u32) -> Self {
        ProfileId::Int(i64::from(n))
    }
}

impl From<&str> for ProfileId {
    fn from(s: &str) -> Self {
        ProfileId::Str(s.to_string())
    }
}

impl From<String> for ProfileId {
    fn from(s: String) -> Self {
        ProfileId::Str(s)
    }
}

/// A player record: an `id` plus an opaque payload owned by the UI.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Identity; also decides the storage key.
    pub id: ProfileId,
    /// Everything else the UI stores about the player.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Profile {
    /// Creates a profile with no fields besides its id.
    pub fn new(id: impl Into<ProfileId>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Returns a profile with one more opaque field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Opaque rate-limiting state shared between instances.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Throttle(pub Value);

/// Profiles keyed by id, kept in storage order.
///
/// Serialized as a JSON object. Lookups are linear; the list is small.
///
/// Iteration (and so `loadPlayers` replay) follows the order entries were first
/// stored. A JavaScript object would list integer-like keys in ascending order
/// first; consumers must not rely on either order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Profiles {
    entries: Vec<(String, Profile)>,
}

impl Profiles {
    /// Inserts or replaces a profile under the key derived from its id.
    ///
    /// A replaced entry keeps its position.
    pub fn insert(&mut self, profile: Profile) -> Option<Profile> {
        let key = profile.id.key();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, profile)),
            None => {
                self.entries.push((key, profile));
                None
            }
        }
    }

    /// Removes the profile stored under `id`, if any.
    pub fn remove(&mut self, id: &ProfileId) -> Option<Profile> {
        let key = id.key();
        let pos = self.entries.iter().position(|(k, _)| *k == key)?;
        Some(self.entries.remove(pos).1)
    }

    /// Returns the profile stored under `id`.
    pub fn get(&self, id: &ProfileId) -> Option<&Profile> {
        let key = id.key();
        self.entries.iter().find(|(k, _)| *k == key).map(|(_, p)| p)
    }

    /// Iterates profiles in storage order.
    pub fn iter(&self) -> impl Iterator<Item = &Profile> {
        self.entries.iter().map(|(_, p)| p)
    }

    /// Returns the number of stored profiles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when no profile is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Profiles {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, profile) in &self.entries {
            map.serialize_entry(key, profile)?;
        }
        map.end()
    }
}

impl Profiles {
    /// Reads stored profiles one entry at a time, dropping entries that are not
    /// profiles. A non-object value yields no profiles.
    fn decode(value: Value) -> Self {
        let Value::Object(map) = value else {
            tracing::warn!("stored profiles are not an object; using none");
            return Self::default();
        };
        let mut entries = Vec::with_capacity(map.len());
        for (key, raw) in map {
            match serde_json::from_value::<Profile>(raw) {
                Ok(profile) => entries.push((key, profile)),
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "dropping unreadable stored profile");
                }
            }
        }
        Self { entries }
    }
}

/// Values handed to the UI once, at mount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    /// Stored API credential, if any.
    pub api_token: Option<String>,
    /// Stored request budget.
    pub api_rate: u32,
}

/// The persisted state shared by every instance.
///
/// Written with serde; read with [`Document::decode`], a per-field merge over
/// [`Document::default`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Credential for the external API; `None` until set.
    pub api_token: Option<String>,
    /// Requests-per-interval budget.
    pub api_rate: u32,
    /// Whether the assistant loop is enabled.
    pub running: bool,
    /// Player records keyed by id.
    pub profiles: Profiles,
    /// Shared throttle state; absent until first set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throttle: Option<Throttle>,
    /// Top-level fields this version does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Document {
    /// Default document:
    ///
    /// - `apiToken = null`
    /// - `apiRate = 30`
    /// - `running = true`
    /// - `profiles = {}`
    /// - `throttle` absent
    fn default() -> Self {
        Self {
            api_token: None,
            api_rate: DEFAULT_API_RATE,
            running: true,
            profiles: Profiles::default(),
            throttle: None,
            extra: Map::new(),
        }
    }
}

impl Document {
    /// Decodes slot content, falling back to [`Document::default`] on anything unusable.
    ///
    /// - `None` (missing slot) → defaults
    /// - unparsable JSON → defaults
    /// - falsy JSON (`null`, `false`, `0`, `""`) → defaults
    /// - any other non-object → defaults
    /// - object → defaults overlaid by its top-level fields, each decoded on its own
    pub fn decode(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let value: Value = match serde_json::from_str(raw) {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(error = %e, "stored document is not valid json; using defaults");
                return Self::default();
            }
        };

        let map = match value {
            Value::Object(map) => map,
            other => {
                if !is_falsy(&other) {
                    tracing::warn!("stored document is not an object; using defaults");
                }
                return Self::default();
            }
        };

        let mut doc = Self::default();
        for (key, value) in map {
            match key.as_str() {
                "apiToken" => merge_field(&key, value, &mut doc.api_token),
                "apiRate" => merge_field(&key, value, &mut doc.api_rate),
                "running" => merge_field(&key, value, &mut doc.running),
                "throttle" => merge_field(&key, value, &mut doc.throttle),
                "profiles" => doc.profiles = Profiles::decode(value),
                _ => {
                    doc.extra.insert(key, value);
                }
            }
        }
        doc
    }

    /// Serializes the full document.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Returns the startup values for the UI.
    pub fn flags(&self) -> Flags {
        Flags {
            api_token: self.api_token.clone(),
            api_rate: self.api_rate,
        }
    }
}

/// Overwrites `slot` with the stored value, or keeps the default if it does not fit.
fn merge_field<T: DeserializeOwned>(key: &str, value: Value, slot: &mut T) {
    match serde_json::from_value(value) {
        Ok(v) => *slot = v,
        Err(e) => {
            tracing::warn!(
                field = key,
                error = %e,
                "stored field has an unexpected type; using its default"
            );
        }
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_slot_yields_defaults() {
        let doc = Document::decode(None);
        assert_eq!(doc, Document::default());
        assert_eq!(doc.api_rate, 30);
        assert!(doc.running);
        assert!(doc.api_token.is_none());
        assert!(doc.profiles.is_empty());
        assert!(doc.throttle.is_none());
    }

    #[test]
    fn garbage_and_falsy_content_yield_defaults() {
        for raw in ["{not json", "null", "false", "0", "\"\"", "[1,2]", "42"] {
            assert_eq!(Document::decode(Some(raw)), Document::default(), "raw={raw}");
        }
    }

    #[test]
    fn present_fields_win_and_missing_ones_default() {
        let doc = Document::decode(Some(r#"{"apiRate":5,"running":false}"#));
        assert_eq!(doc.api_rate, 5);
        assert!(!doc.running);
        assert!(doc.api_token.is_none());
        assert!(doc.profiles.is_empty());
    }

    #[test]
    fn profiles_are_replaced_wholesale() {
        let doc = Document::decode(Some(r#"{"profiles":{"3":{"id":3,"name":"c"}}}"#));
        assert_eq!(doc.profiles.len(), 1);
        let name = doc
            .profiles
            .get(&ProfileId::Int(3))
            .and_then(|p| p.fields.get("name"));
        assert_eq!(name, Some(&json!("c")));
    }

    #[test]
    fn unknown_fields_survive_a_round_trip() {
        let doc = Document::decode(Some(r#"{"apiRate":10,"theme":"dark"}"#));
        assert_eq!(doc.extra.get("theme"), Some(&json!("dark")));

        let again = Document::decode(Some(&doc.encode().unwrap()));
        assert_eq!(again, doc);
    }

    #[test]
    fn wrongly_typed_field_defaults_alone() {
        let doc = Document::decode(Some(
            r#"{"apiToken":"tok","apiRate":"30","running":"no","profiles":{"1":{"id":1,"name":"a"}}}"#,
        ));
        assert_eq!(doc.api_token.as_deref(), Some("tok"));
        assert_eq!(doc.api_rate, DEFAULT_API_RATE);
        assert!(doc.running);
        assert_eq!(
            doc.profiles.get(&ProfileId::Int(1)).and_then(|p| p.fields.get("name")),
            Some(&json!("a"))
        );
    }

    #[test]
    fn unreadable_profile_is_dropped_alone() {
        let doc = Document::decode(Some(
            r#"{"profiles":{"1":{"id":1},"2":{"name":"no id"},"3":{"id":3}}}"#,
        ));
        let ids: Vec<_> = doc.profiles.iter().map(|p| p.id.key()).collect();
        assert_eq!(ids, vec!["1", "3"]);

        let doc = Document::decode(Some(r#"{"apiRate":4,"profiles":[1,2]}"#));
        assert!(doc.profiles.is_empty());
        assert_eq!(doc.api_rate, 4);
    }

    #[test]
    fn any_json_number_is_a_profile_id() {
        let doc = Document::decode(Some(
            r#"{"profiles":{"7":{"id":7.0},"big":{"id":18446744073709551615},"h":{"id":1.5}}}"#,
        ));
        assert_eq!(doc.profiles.len(), 3);

        let keys: Vec<_> = doc.profiles.iter().map(|p| p.id.key()).collect();
        assert_eq!(keys, vec!["7", "18446744073709551615", "1.5"]);

        let seven = doc.profiles.iter().next().map(|p| p.id.clone());
        assert!(matches!(seven, Some(ProfileId::Num(_))));
        let v = serde_json::to_value(&doc.profiles).unwrap();
        assert_eq!(v["7"]["id"], json!(7.0));
    }

    #[test]
    fn throttle_is_omitted_until_set() {
        let mut doc = Document::default();
        let v: Value = serde_json::from_str(&doc.encode().unwrap()).unwrap();
        assert!(v.get("throttle").is_none());
        assert_eq!(v["apiToken"], Value::Null);

        doc.throttle = Some(Throttle(json!({"remaining": 4})));
        let v: Value = serde_json::from_str(&doc.encode().unwrap()).unwrap();
        assert_eq!(v["throttle"], json!({"remaining": 4}));
    }

    #[test]
    fn insert_derives_key_from_id_and_keeps_position() {
        let mut profiles = Profiles::default();
        profiles.insert(Profile::new(2).with_field("name", "b"));
        profiles.insert(Profile::new(1).with_field("name", "a"));
        profiles.insert(Profile::new(2).with_field("name", "b2"));

        let ids: Vec<_> = profiles.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids, vec![ProfileId::Int(2), ProfileId::Int(1)]);
        assert_eq!(
            profiles.get(&ProfileId::Int(2)).and_then(|p| p.fields.get("name")),
            Some(&json!("b2"))
        );

        let v = serde_json::to_value(&profiles).unwrap();
        assert_eq!(v["2"]["id"], json!(2));
    }

    #[test]
    fn string_and_numeric_ids_share_the_key_space() {
        let mut profiles = Profiles::default();
        profiles.insert(Profile::new("7"));
        assert!(profiles.remove(&ProfileId::Int(7)).is_some());
        assert!(profiles.is_empty());
    }

    #[test]
    fn storage_order_is_preserved() {
        let doc = Document::decode(Some(
            r#"{"profiles":{"9":{"id":9},"1":{"id":1},"5":{"id":5}}}"#,
        ));
        let ids: Vec<_> = doc.profiles.iter().map(|p| p.id.key()).collect();
        assert_eq!(ids, vec!["9", "1", "5"]);
    }
}
