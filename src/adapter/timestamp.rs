//! Timestamp adapters: one instant type, four wire encodings.
//!
//! - `Auto`  decodes int, float or ISO-8601 string by shape; encodes ISO-8601 with `Z`
//! - `Str`   ISO-8601 only
//! - `Float` Unix seconds as a float
//! - `Int`   Unix seconds, sub-second precision truncated
//!
//! Strings without an offset are read as UTC. JSON `null` decodes to `Value::Null` in every
//! variant.
use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value as Json;

use crate::error::{Error, ErrorKind, Result};
use crate::typespec::{Primitive, TypeArg, TypeRef};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimestampFormat {
    Auto,
    Str,
    Float,
    Int,
}

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M%:z",
];

impl TimestampFormat {
    /// `timestamp` → Auto, `timestamp<int|float|str>` → that encoding.
    pub fn from_arg(arg: Option<&TypeArg>) -> Result<Self> {
        match arg {
            None => Ok(TimestampFormat::Auto),
            Some(TypeArg::Type(TypeRef::Primitive(Primitive::Int))) => Ok(TimestampFormat::Int),
            Some(TypeArg::Type(TypeRef::Primitive(Primitive::Float))) => Ok(TimestampFormat::Float),
            Some(TypeArg::Type(TypeRef::Primitive(Primitive::Str))) => Ok(TimestampFormat::Str),
            Some(other) => Err(Error::new(ErrorKind::InvalidTimestampArgument(other.to_string()))),
        }
    }

    pub fn decode(self, json: &Json) -> Result<Value> {
        if json.is_null() {
            return Ok(Value::Null);
        }
        let t = match (self, json) {
            (TimestampFormat::Auto, Json::Number(n)) if n.is_i64() || n.is_u64() => {
                decode_epoch_int(json)?
            }
            (TimestampFormat::Auto, Json::Number(_)) | (TimestampFormat::Float, _) => {
                let secs = json.as_f64().ok_or_else(|| Error::invalid_timestamp(json))?;
                from_epoch_secs(secs).ok_or_else(|| Error::invalid_timestamp(json))?
            }
            (TimestampFormat::Auto, Json::String(s)) | (TimestampFormat::Str, Json::String(s)) => {
                parse_iso8601(s)?
            }
            (TimestampFormat::Int, _) => decode_epoch_int(json)?,
            _ => return Err(Error::invalid_timestamp(json)),
        };
        Ok(Value::Timestamp(t))
    }

    pub fn encode(self, value: &Value) -> Result<Json> {
        let t = match value {
            Value::Null => return Ok(Json::Null),
            Value::Timestamp(t) => t,
            other => return Err(Error::mismatch("timestamp", other.kind_name())),
        };
        let out = match self {
            TimestampFormat::Auto | TimestampFormat::Str => Json::String(format_iso8601(t)),
            TimestampFormat::Float => serde_json::Number::from_f64(to_epoch_secs(t))
                .map(Json::Number)
                .ok_or_else(|| Error::invalid_timestamp(t))?,
            TimestampFormat::Int => Json::from(t.timestamp()),
        };
        Ok(out)
    }
}

fn decode_epoch_int(json: &Json) -> Result<DateTime<Utc>> {
    let secs = match json {
        Json::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.trunc() as i64)),
        _ => None,
    };
    secs.and_then(|s| DateTime::from_timestamp(s, 0))
        .ok_or_else(|| Error::invalid_timestamp(json))
}

/// ISO-8601 with optional fraction and optional offset. The time may stop at the hour or the
/// minute. A trailing `Z` is stripped first.
pub fn parse_iso8601(raw: &str) -> Result<DateTime<Utc>> {
    let s = raw.strip_suffix('Z').unwrap_or(raw);
    let s = pad_bare_hour(s);
    let s = s.as_ref();
    for fmt in OFFSET_FORMATS {
        if let Ok(t) = DateTime::parse_from_str(s, fmt) {
            return Ok(t.with_timezone(&Utc));
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(t.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|t| t.and_utc())
        .ok_or_else(|| Error::invalid_timestamp(format_args!("{raw:?}")))
}

/// `2020-03-12T10[+hh:mm]` → `2020-03-12T10:00[+hh:mm]`; chrono wants at least the minute.
fn pad_bare_hour(s: &str) -> Cow<'_, str> {
    let (Some(head), Some(rest)) = (s.get(..13), s.get(13..)) else {
        return Cow::Borrowed(s);
    };
    let bare_hour = matches!(head.as_bytes()[10], b'T' | b' ')
        && head[11..].bytes().all(|b| b.is_ascii_digit())
        && (rest.is_empty() || rest.starts_with(['+', '-']));
    if bare_hour {
        Cow::Owned(format!("{head}:00{rest}"))
    } else {
        Cow::Borrowed(s)
    }
}

pub fn format_iso8601(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

pub fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    if !secs.is_finite() {
        return None;
    }
    let mut whole = secs.floor();
    let mut nanos = ((secs - whole) * 1e9).round();
    if nanos >= 1e9 {
        whole += 1.0;
        nanos = 0.0;
    }
    if whole < i64::MIN as f64 || whole >= i64::MAX as f64 {
        return None;
    }
    DateTime::from_timestamp(whole as i64, nanos as u32)
}

pub fn to_epoch_secs(t: &DateTime<Utc>) -> f64 {
    t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1e9
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn variant_selection_by_argument() {
        assert_eq!(TimestampFormat::from_arg(None).unwrap(), TimestampFormat::Auto);
        let int = TypeArg::from(Primitive::Int);
        assert_eq!(TimestampFormat::from_arg(Some(&int)).unwrap(), TimestampFormat::Int);
        let bool_ = TypeArg::from(Primitive::Bool);
        let err = TimestampFormat::from_arg(Some(&bool_)).unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidTimestampArgument(arg) if arg == "bool"));
        assert!(TimestampFormat::from_arg(Some(&TypeArg::Wildcard)).is_err());
    }

    #[test]
    fn offsets_are_normalized_to_utc() {
        let v = TimestampFormat::Str.decode(&json!("2002-12-25T00:00:00-06:00")).unwrap();
        assert_eq!(v, Value::Timestamp(utc(2002, 12, 25, 6, 0, 0)));
    }

    #[test]
    fn naive_and_zulu_strings() {
        let expected = Value::Timestamp(utc(2020, 3, 12, 0, 0, 0));
        assert_eq!(TimestampFormat::Auto.decode(&json!("2020-03-12T00:00:00")).unwrap(), expected);
        assert_eq!(TimestampFormat::Auto.decode(&json!("2020-03-12T00:00:00Z")).unwrap(), expected);
        assert_eq!(TimestampFormat::Auto.decode(&json!("2020-03-12")).unwrap(), expected);

        let expected = Value::Timestamp(utc(2020, 3, 12, 10, 30, 0));
        for raw in [
            "2020-03-12T10:30",
            "2020-03-12T10:30Z",
            "2020-03-12 10:30",
            "2020-03-12T12:30+02:00",
            "2020-03-12 09:30-01:00",
        ] {
            assert_eq!(TimestampFormat::Str.decode(&json!(raw)).unwrap(), expected, "{raw}");
        }

        let expected = Value::Timestamp(utc(2020, 3, 12, 10, 0, 0));
        for raw in ["2020-03-12T10", "2020-03-12T10Z", "2020-03-12 10", "2020-03-12T11+01:00"] {
            assert_eq!(TimestampFormat::Str.decode(&json!(raw)).unwrap(), expected, "{raw}");
        }
    }

    #[test]
    fn epoch_numbers() {
        assert_eq!(
            TimestampFormat::Int.decode(&json!(1040798)).unwrap(),
            Value::Timestamp(utc(1970, 1, 13, 1, 6, 38))
        );
        assert_eq!(
            TimestampFormat::Float.decode(&json!(1040798340.0)).unwrap(),
            Value::Timestamp(utc(2002, 12, 25, 6, 39, 0))
        );
        // auto dispatches integers and floats separately
        assert_eq!(
            TimestampFormat::Auto.decode(&json!(0)).unwrap(),
            Value::Timestamp(DateTime::<Utc>::UNIX_EPOCH)
        );
        assert_eq!(
            TimestampFormat::Auto.decode(&json!(0.5)).unwrap(),
            Value::Timestamp(DateTime::from_timestamp(0, 500_000_000).unwrap())
        );
    }

    #[test]
    fn encodings() {
        let t = Value::Timestamp(DateTime::from_timestamp(1040798340, 250_000_000).unwrap());
        assert_eq!(TimestampFormat::Auto.encode(&t).unwrap(), json!("2002-12-25T06:39:00.250Z"));
        assert_eq!(TimestampFormat::Float.encode(&t).unwrap(), json!(1040798340.25));
        assert_eq!(TimestampFormat::Int.encode(&t).unwrap(), json!(1040798340));
        assert_eq!(TimestampFormat::Int.encode(&Value::Null).unwrap(), Json::Null);
        assert!(TimestampFormat::Int.encode(&Value::Int(3)).is_err());
    }

    #[test]
    fn round_trip_per_variant() {
        let t = DateTime::from_timestamp(1_600_000_000, 500_000_000).unwrap();
        for format in [TimestampFormat::Auto, TimestampFormat::Str, TimestampFormat::Float] {
            let back = format.decode(&format.encode(&Value::Timestamp(t)).unwrap()).unwrap();
            assert_eq!(back, Value::Timestamp(t), "{format:?}");
        }
        // int keeps whole seconds only
        let back = TimestampFormat::Int
            .decode(&TimestampFormat::Int.encode(&Value::Timestamp(t)).unwrap())
            .unwrap();
        assert_eq!(back, Value::Timestamp(DateTime::from_timestamp(1_600_000_000, 0).unwrap()));
    }

    #[test]
    fn unparsable_input_fails() {
        for (format, doc) in [
            (TimestampFormat::Str, json!("yesterday")),
            (TimestampFormat::Str, json!("2020-03-12T1")),
            (TimestampFormat::Str, json!(12)),
            (TimestampFormat::Int, json!("12")),
            (TimestampFormat::Auto, json!([1])),
        ] {
            let err = format.decode(&doc).unwrap_err();
            assert!(matches!(err.kind(), ErrorKind::InvalidTimestamp(_)), "{format:?} {doc}");
        }
    }
}
