//! Serde helpers for the server's record encoding
//!
//! The POS server encodes "no value" as `false` for text and relational
//! fields, and relational fields as `[id, "display name"]` pairs.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};

use super::product::{TemplateId, TemplateRef};

/// Optional text that may arrive as `false`, `null` or `""`
pub fn optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Flag(bool),
        Text(String),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None | Some(Repr::Flag(false)) => Ok(None),
        Some(Repr::Flag(true)) => Err(de::Error::custom("expected text or false, got true")),
        Some(Repr::Text(text)) if text.is_empty() => Ok(None),
        Some(Repr::Text(text)) => Ok(Some(text)),
    }
}

/// A list of strings that may also arrive as a single comma-joined string
pub fn string_or_seq<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Flag(bool),
        Text(String),
        Seq(Vec<String>),
    }

    match Option::<Repr>::deserialize(deserializer)? {
        None | Some(Repr::Flag(_)) => Ok(Vec::new()),
        Some(Repr::Text(text)) => Ok(text
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()),
        Some(Repr::Seq(values)) => Ok(values),
    }
}

/// Wire representation of a template reference
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum TemplateRefRepr {
    Id(TemplateId),
    Pair(TemplateId, String),
}

impl From<TemplateRefRepr> for TemplateRef {
    fn from(repr: TemplateRefRepr) -> Self {
        match repr {
            TemplateRefRepr::Id(id) => TemplateRef { id, name: None },
            TemplateRefRepr::Pair(id, name) => TemplateRef { id, name: Some(name) },
        }
    }
}

impl From<TemplateRef> for TemplateRefRepr {
    fn from(r: TemplateRef) -> Self {
        match r.name {
            Some(name) => TemplateRefRepr::Pair(r.id, name),
            None => TemplateRefRepr::Id(r.id),
        }
    }
}

/// Optional many2one template reference (`false` means unset)
pub mod many2one {
    use super::*;

    pub fn serialize<S>(value: &Option<TemplateRef>, s: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(r) => r.serialize(s),
            None => s.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<TemplateRef>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Flag(bool),
            Ref(TemplateRef),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None | Some(Repr::Flag(false)) => Ok(None),
            Some(Repr::Flag(true)) => Err(de::Error::custom(
                "expected template reference or false, got true",
            )),
            Some(Repr::Ref(r)) => Ok(Some(r)),
        }
    }
}
