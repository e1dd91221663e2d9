//! Superset-of-JSON wire codec for RPC payloads.
//!
//! Plain JSON cannot carry timestamps, UUIDs, or integers beyond the safe
//! double range without losing their type. The codec keeps those values as
//! strings inside the `json` body and records their dotted paths in a
//! `meta.values` map, so the receiving side can revive them:
//!
//! ```json
//! {"json": {"user": {"createdAt": "2024-05-01T12:00:00Z"}},
//!  "meta": {"values": {"user.createdAt": "datetime"}}}
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::error::{ApiResult, Error};

/// Rich type carried as a tagged string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeTag {
    /// RFC 3339 timestamp.
    Datetime,
    /// UUID in canonical hyphenated form.
    Uuid,
    /// Integer too large for a JSON number.
    Bigint,
}

/// Dotted-path tag map carried beside the body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Dotted path into `json` → the tag describing the value there.
    pub values: BTreeMap<String, TypeTag>,
}

/// The wire envelope wrapping every RPC payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireEnvelope {
    /// Plain JSON body; tagged values appear as strings.
    pub json: Value,
    /// Present iff at least one value is tagged.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,
}

impl WireEnvelope {
    /// Wrap a body that carries no rich values.
    pub const fn plain(json: Value) -> Self {
        Self { json, meta: None }
    }
}

/// Build an envelope, validating each tag against the body.
///
/// `meta` is omitted when `tags` is empty. Tagging a path that does not
/// exist in the body, or whose value does not match the tag, is a
/// programming error surfaced as an internal error rather than a 400,
/// since it can only originate server-side.
pub fn encode(json: Value, tags: BTreeMap<String, TypeTag>) -> ApiResult<WireEnvelope> {
    for (path, tag) in &tags {
        let value = lookup(&json, path).ok_or_else(|| {
            Error::internal_server_error().with_message(format!("tagged path not in body: {path}"))
        })?;
        check_tag(value, *tag, path).map_err(|err| {
            Error::internal_server_error().with_message(err.message().to_owned())
        })?;
    }
    if tags.is_empty() {
        return Ok(WireEnvelope::plain(json));
    }
    Ok(WireEnvelope {
        json,
        meta: Some(Meta { values: tags }),
    })
}

/// Validate an inbound envelope and return its body.
///
/// Every tagged path must exist and its value must parse under the tag;
/// anything else is a [`Error`] with the bad-request kind.
pub fn decode(envelope: WireEnvelope) -> ApiResult<Value> {
    let Some(meta) = envelope.meta else {
        return Ok(envelope.json);
    };
    for (path, tag) in &meta.values {
        let value = lookup(&envelope.json, path).ok_or_else(|| {
            Error::bad_request().with_message(format!("tagged path not in body: {path}"))
        })?;
        check_tag(value, *tag, path)?;
    }
    Ok(envelope.json)
}

fn check_tag(value: &Value, tag: TypeTag, path: &str) -> ApiResult<()> {
    let Some(raw) = value.as_str() else {
        return Err(Error::bad_request()
            .with_message(format!("tagged value at {path} must be a string")));
    };
    let ok = match tag {
        TypeTag::Datetime => DateTime::<FixedOffset>::parse_from_rfc3339(raw).is_ok(),
        TypeTag::Uuid => Uuid::try_parse(raw).is_ok(),
        TypeTag::Bigint => {
            let digits = raw.strip_prefix('-').unwrap_or(raw);
            !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
        }
    };
    if ok {
        Ok(())
    } else {
        Err(Error::bad_request()
            .with_message(format!("malformed {} value at {path}", tag_name(tag))))
    }
}

const fn tag_name(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Datetime => "datetime",
        TypeTag::Uuid => "uuid",
        TypeTag::Bigint => "bigint",
    }
}

/// Resolve a dotted path inside a JSON body. Array indices are dotted
/// numeric segments (`items.0.id`).
fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
