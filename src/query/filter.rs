use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, Utc};

use super::ParamValue;
use crate::time::epoch_seconds;

/// Key suffix telling the server to compare as an integer rather than a string.
pub const INT_SUFFIX: &str = ":int";
/// Key suffix carrying an explicit null filter.
pub const NULL_SUFFIX: &str = ":null";

/// The value of an open-ended equality filter such as `name` or `serial`.
///
/// The filter key may itself carry a lookup suffix understood by the server
/// (`time__gte`, `serial__in`, ...); it is sent verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Null,
    Int(i64),
    /// Integers above `i64::MAX`, such as 64-bit device serials
    UInt(u64),
    Float(f64),
    Str(String),
    Timestamp(DateTime<Utc>),
}

impl FilterValue {
    /// The key and value put on the wire for this filter.
    ///
    /// Timestamps travel as epoch seconds and are integers from then on, so
    /// they are tagged like any other integer.
    pub fn to_param(&self, key: &str) -> (String, ParamValue) {
        match self {
            Self::Null => (format!("{key}{NULL_SUFFIX}"), ParamValue::Null),
            Self::Int(value) => (format!("{key}{INT_SUFFIX}"), ParamValue::Int(*value)),
            Self::UInt(value) => (format!("{key}{INT_SUFFIX}"), ParamValue::UInt(*value)),
            Self::Timestamp(ts) => (format!("{key}{INT_SUFFIX}"), ParamValue::Int(epoch_seconds(ts))),
            Self::Float(value) => (key.to_owned(), ParamValue::Float(*value)),
            Self::Str(value) => (key.to_owned(), ParamValue::Str(value.clone())),
        }
    }
}

impl Display for FilterValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Int(value) => write!(f, "{value}"),
            Self::UInt(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value:?}"),
            Self::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for FilterValue {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u32> for FilterValue {
    fn from(value: u32) -> Self {
        Self::Int(value.into())
    }
}

impl From<u64> for FilterValue {
    fn from(value: u64) -> Self {
        i64::try_from(value).map_or(Self::UInt(value), Self::Int)
    }
}

impl From<f64> for FilterValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<DateTime<Utc>> for FilterValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

impl<T: Into<FilterValue>> From<Option<T>> for FilterValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

peg::parser! {
    grammar filter_grammar() for str {
        rule hex_digit() = ['0'..='9' | 'a'..='f' | 'A'..='F']
        rule digit() = ['0'..='9']

        rule key() -> String
            = k:$(['a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '.']+) { k.to_owned() }

        rule null() -> FilterValue
            = "null" ![_] { FilterValue::Null }

        rule quoted() -> FilterValue
            = "\"" s:$([^ '"']*) "\"" ![_] { FilterValue::Str(s.to_owned()) }

        rule hex() -> FilterValue
            = "0x" d:$(hex_digit()+) ![_] {?
                parse_integer(d, 16).ok_or("64-bit integer")
            }

        rule int() -> FilterValue
            = n:$("-"? digit()+) ![_] {?
                parse_integer(n, 10).ok_or("64-bit integer")
            }

        rule float() -> FilterValue
            = n:$("-"? digit()+ "." digit()*) ![_] {?
                n.parse().map(FilterValue::Float).or(Err("number"))
            }

        rule timestamp() -> FilterValue
            = s:$(digit()*<4> "-" digit()*<2> "-" digit()*<2> [_]*) {?
                parse_calendar(s).map(FilterValue::Timestamp).ok_or("RFC 3339 timestamp")
            }

        rule string() -> FilterValue
            = !("0x" hex_digit()+ ![_] / "-"? digit()+ ![_]) s:$([_]*) { FilterValue::Str(s.to_owned()) }

        pub rule value() -> FilterValue
            = null() / quoted() / hex() / int() / float() / timestamp() / string()

        pub rule filter() -> (String, FilterValue)
            = k:key() "=" v:value() { (k, v) }
    }
}

/// Signed when it fits, unsigned above `i64::MAX`, `None` when out of 64-bit range.
fn parse_integer(digits: &str, radix: u32) -> Option<FilterValue> {
    i64::from_str_radix(digits, radix)
        .map(FilterValue::Int)
        .or_else(|_| u64::from_str_radix(digits, radix).map(FilterValue::UInt))
        .ok()
}

fn parse_calendar(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

/// Parses a `key=value` filter expression as typed on the command line.
///
/// `null` is an explicit null, `0x..` and decimal literals are integers,
/// decimals with a fraction are floats, `YYYY-MM-DD[THH:MM:SSZ]` is a UTC
/// timestamp, and anything else (or anything in double quotes) is a string.
pub fn parse_filter(input: &str) -> Result<(String, FilterValue), String> {
    filter_grammar::filter(input).map_err(|err| format!("invalid filter {input:?}: {err}"))
}
