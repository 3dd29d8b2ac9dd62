use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::Serialize;

/// A single value of the query string, before URL encoding.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Str(String),
    List(Vec<String>),
}

impl Display for ParamValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Int(value) => write!(f, "{value}"),
            Self::UInt(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Str(value) => write!(f, "{value}"),
            Self::List(values) => write!(f, "{}", values.join(",")),
        }
    }
}

/// The full parameter mapping of one query.
///
/// `options` always holds every fixed query option, `None` when the option is
/// unset; unset options are left off the wire. `filters` holds the open-ended
/// filters with their type suffixes already applied, in insertion order.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct QueryParams {
    pub options: IndexMap<&'static str, Option<ParamValue>>,
    pub filters: IndexMap<String, ParamValue>,
}

impl QueryParams {
    pub fn option(&self, key: &str) -> Option<&ParamValue> {
        self.options.get(key).and_then(Option::as_ref)
    }

    pub fn filter(&self, key: &str) -> Option<&ParamValue> {
        self.filters.get(key)
    }

    /// Keys that carry a value, options first.
    pub fn present_keys(&self) -> Vec<&str> {
        self.options
            .iter()
            .filter(|(_, value)| value.is_some())
            .map(|(key, _)| *key)
            .chain(self.filters.keys().map(String::as_str))
            .collect()
    }

    /// URL query pairs. Lists repeat their key once per element; explicit
    /// null filters are sent with an empty value.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let options = self
            .options
            .iter()
            .filter_map(|(key, value)| value.as_ref().map(|value| (*key, value)));
        let filters = self.filters.iter().map(|(key, value)| (key.as_str(), value));

        let mut pairs = vec![];
        for (key, value) in options.chain(filters) {
            match value {
                ParamValue::List(values) => {
                    pairs.extend(values.iter().map(|v| (key.to_owned(), v.to_owned())))
                }
                value => pairs.push((key.to_owned(), value.to_string())),
            }
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_options_stay_off_the_wire() {
        let mut params = QueryParams::default();
        params.options.insert("table", None);
        params.options.insert("limit", Some(ParamValue::Int(2)));
        params
            .filters
            .insert("name:null".to_owned(), ParamValue::Null);

        assert_eq!(params.present_keys(), vec!["limit", "name:null"]);
        assert_eq!(
            params.to_pairs(),
            vec![
                ("limit".to_owned(), "2".to_owned()),
                ("name:null".to_owned(), String::new()),
            ]
        );
    }

    #[test]
    fn lists_repeat_their_key() {
        let mut params = QueryParams::default();
        params.options.insert(
            "fields",
            Some(ParamValue::List(vec!["bat".to_owned(), "in_temp".to_owned()])),
        );

        assert_eq!(
            params.to_pairs(),
            vec![
                ("fields".to_owned(), "bat".to_owned()),
                ("fields".to_owned(), "in_temp".to_owned()),
            ]
        );
    }
}
