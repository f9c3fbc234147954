//! Tolerant decoders for fields with inconsistent wire encodings.
//!
//! The API is not uniform about how it encodes a few kinds of values:
//!
//! - timestamps arrive as `2021-06-01T12:00:00` (no zone), sometimes with a
//!   space separator, fractional seconds, or a full RFC 3339 offset;
//! - `time_remaining` may be absent, `null`, an integer number of seconds, or
//!   an `H:MM:SS` string;
//! - plain scalars are occasionally `null` where a value is documented.
//!
//! The functions here are usable on their own and through the serde adapter
//! modules ([`timestamp`], [`time_remaining`], [`null_as_default`]) that
//! resource records attach to the affected fields.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

use crate::error::{Error, Result};

/// Layout the API uses when it emits timestamps.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Zone-less layouts accepted on input; `%.f` also matches an absent fraction.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

const DURATION_MULTIPLIERS: [i64; 3] = [60 * 60, 60, 1];

/// Parse a timestamp string in any recognized provider format.
///
/// Zone-less inputs are interpreted as UTC; inputs carrying an offset are
/// converted to UTC.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] if the string matches none of the formats.
pub fn parse_timestamp(input: &str) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| Error::DecodeError(format!("unrecognized timestamp `{input}`")))
}

/// Decode a JSON value holding an optional timestamp.
///
/// # Errors
///
/// Returns [`Error::DecodeError`] for unrecognized strings and for tokens
/// that are neither strings nor `null`.
pub fn decode_timestamp(value: &Value) -> Result<Option<DateTime<Utc>>> {
    match value {
        Value::Null => Ok(None),
        Value::String(raw) => parse_timestamp(raw).map(Some),
        other => Err(Error::DecodeError(format!(
            "expected timestamp string, found `{other}`"
        ))),
    }
}

/// Parse an `H:MM:SS` duration into seconds.
///
/// Exactly three colon-separated unsigned parts are required; hours are
/// unbounded. Returns `None` for anything else.
#[must_use]
pub fn parse_duration_seconds(input: &str) -> Option<i64> {
    let parts: Vec<&str> = input.trim().split(':').collect();
    if parts.len() != DURATION_MULTIPLIERS.len() {
        return None;
    }

    parts
        .iter()
        .zip(DURATION_MULTIPLIERS)
        .try_fold(0_i64, |total, (part, multiplier)| {
            let value = i64::from(part.parse::<u32>().ok()?);
            total.checked_add(value.checked_mul(multiplier)?)
        })
}

/// Decode the advisory `time_remaining` field.
///
/// Never fails: unexpected shapes are logged and treated as "no value".
#[must_use]
pub fn decode_time_remaining(value: &Value) -> Option<i64> {
    match value {
        Value::Null => None,
        Value::Number(number) => {
            let seconds = number.as_i64();
            if seconds.is_none() {
                warn!(value = %number, "non-integer time_remaining, ignoring");
            }
            seconds
        }
        Value::String(raw) => {
            let seconds = parse_duration_seconds(raw);
            if seconds.is_none() {
                warn!(value = %raw, "unparseable time_remaining, ignoring");
            }
            seconds
        }
        other => {
            warn!(value = %other, "unexpected type for time_remaining, ignoring");
            None
        }
    }
}

/// Serde adapter for optional tolerant timestamps.
///
/// Use with `#[serde(default, with = "linode_core::decode::timestamp")]` so
/// an absent field also yields `None`.
pub mod timestamp {
    use super::{parse_timestamp, DateTime, Deserialize, Deserializer, Utc, TIMESTAMP_FORMAT};
    use serde::de::Error as _;
    use serde::Serializer;

    /// Deserialize an optional timestamp, failing on unrecognized strings.
    ///
    /// # Errors
    ///
    /// Propagates a deserializer error for non-string tokens or unknown formats.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_timestamp(&raw).map_err(D::Error::custom))
            .transpose()
    }

    /// Serialize using the layout the API emits.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(instant) => serializer.collect_str(&instant.format(TIMESTAMP_FORMAT)),
            None => serializer.serialize_none(),
        }
    }
}

/// Serde adapter for the advisory `time_remaining` field.
///
/// Use with `#[serde(default, with = "linode_core::decode::time_remaining")]`.
pub mod time_remaining {
    use super::{decode_time_remaining, Deserialize, Deserializer, Value};
    use serde::Serializer;

    /// Deserialize into seconds remaining; never fails on well-formed JSON.
    ///
    /// # Errors
    ///
    /// Only propagates errors from the underlying deserializer itself.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw.as_ref().and_then(decode_time_remaining))
    }

    /// Serialize as a plain integer or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S>(value: &Option<i64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(seconds) => serializer.serialize_i64(*seconds),
            None => serializer.serialize_none(),
        }
    }
}

/// Deserialize a value that may be `null`, substituting the type's default.
///
/// # Errors
///
/// Propagates a deserializer error if the value is present but mistyped.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode a JSON value into `T`, mapping failures to [`Error::DecodeError`].
///
/// # Errors
///
/// Returns [`Error::DecodeError`] with `context` prefixed to the serde message.
pub fn from_value<T>(value: Value, context: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(value)
        .map_err(|err| Error::DecodeError(format!("{context}: {err}")))
}

/// Decode a raw JSON body into `T`, mapping failures to [`Error::DecodeError`].
///
/// # Errors
///
/// Returns [`Error::DecodeError`] with `context` prefixed to the serde message.
pub fn from_slice<T>(body: &[u8], context: &str) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|err| Error::DecodeError(format!("{context}: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde::Serialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, Serialize)]
    struct Sample {
        id: u64,
        #[serde(default, with = "timestamp")]
        created: Option<DateTime<Utc>>,
        #[serde(default, with = "time_remaining")]
        time_remaining: Option<i64>,
        #[serde(default, deserialize_with = "null_as_default")]
        username: String,
    }

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2021, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn recognized_formats_decode_to_same_instant() {
        for input in [
            "2021-06-01 12:00:00",
            "2021-06-01T12:00:00",
            "2021-06-01T12:00:00Z",
            "2021-06-01T12:00:00.000",
            "2021-06-01T14:00:00+02:00",
        ] {
            assert_eq!(parse_timestamp(input).unwrap(), noon(), "input {input}");
        }
    }

    #[test]
    fn fractional_seconds_are_kept() {
        let parsed = parse_timestamp("2021-06-01T12:00:00.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn null_timestamp_is_none() {
        assert_eq!(decode_timestamp(&Value::Null).unwrap(), None);
    }

    #[test]
    fn garbage_timestamp_is_decode_error() {
        let err = decode_timestamp(&json!("not-a-date")).unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));

        assert!(parse_timestamp("").is_err());
        assert!(decode_timestamp(&json!(1_622_548_800)).is_err());
    }

    #[test]
    fn duration_shapes() {
        assert_eq!(decode_time_remaining(&Value::Null), None);
        assert_eq!(decode_time_remaining(&json!(42)), Some(42));
        assert_eq!(decode_time_remaining(&json!("0:01:30")), Some(90));
        assert_eq!(decode_time_remaining(&json!("26:00:01")), Some(93_601));
        assert_eq!(decode_time_remaining(&json!("bogus")), None);
        assert_eq!(decode_time_remaining(&json!("1:30")), None);
        assert_eq!(decode_time_remaining(&json!("1:-1:00")), None);
        assert_eq!(decode_time_remaining(&json!(1.5)), None);
        assert_eq!(decode_time_remaining(&json!([1, 2])), None);
    }

    #[test]
    fn record_decodes_with_all_tolerant_fields() {
        let sample: Sample = serde_json::from_value(json!({
            "id": 7,
            "created": "2021-06-01T12:00:00",
            "time_remaining": "0:00:42",
            "username": null,
            "unknown_field": true
        }))
        .unwrap();

        assert_eq!(sample.id, 7);
        assert_eq!(sample.created, Some(noon()));
        assert_eq!(sample.time_remaining, Some(42));
        assert_eq!(sample.username, "");
    }

    #[test]
    fn record_with_absent_tolerant_fields() {
        let sample: Sample = serde_json::from_value(json!({"id": 1})).unwrap();
        assert_eq!(sample.created, None);
        assert_eq!(sample.time_remaining, None);
        assert_eq!(sample.username, "");
    }

    #[test]
    fn record_with_bogus_duration_is_fully_populated() {
        let sample: Sample = serde_json::from_value(json!({
            "id": 3,
            "created": "2021-06-01 12:00:00",
            "time_remaining": "soon",
            "username": "ops"
        }))
        .unwrap();

        assert_eq!(sample.id, 3);
        assert_eq!(sample.created, Some(noon()));
        assert_eq!(sample.time_remaining, None);
        assert_eq!(sample.username, "ops");
    }

    #[test]
    fn record_with_bad_timestamp_fails() {
        let err = from_value::<Sample>(json!({"id": 3, "created": "yesterday"}), "sample")
            .unwrap_err();
        match err {
            Error::DecodeError(message) => assert!(message.contains("yesterday")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn timestamp_serializes_in_api_layout() {
        let sample = Sample {
            id: 1,
            created: Some(noon()),
            time_remaining: Some(5),
            username: String::new(),
        };
        let json = serde_json::to_value(&sample).unwrap();
        assert_eq!(json["created"], "2021-06-01T12:00:00");
        assert_eq!(json["time_remaining"], 5);
    }
}
