use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use super::Database;

/// Aggregate functions documented for the relational store. The columnar
/// store accepts any of its own aggregate functions.
pub const RELATIONAL_AGGREGATES: [&str; 7] =
    ["avg", "count", "max", "min", "stddev", "sum", "variance"];

/// Name of the aggregate applied to every column within an interval.
///
/// The value is passed through to the server, which is the only authority on
/// what a given store accepts. `mean` is accepted as an alias of `avg`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct IntervalAgg(String);

impl IntervalAgg {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        if name == "mean" {
            Self("avg".to_owned())
        } else {
            Self(name)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the server is documented to accept this function on `db`.
    pub fn is_documented_for(&self, db: Database) -> bool {
        match db {
            Database::Postgresql => RELATIONAL_AGGREGATES.contains(&self.0.as_str()),
            Database::Clickhouse => true,
        }
    }
}

impl From<String> for IntervalAgg {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&str> for IntervalAgg {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<IntervalAgg> for String {
    fn from(agg: IntervalAgg) -> Self {
        agg.0
    }
}

impl Display for IntervalAgg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_is_an_alias_of_avg() {
        assert_eq!(IntervalAgg::new("mean").as_str(), "avg");
        assert_eq!(IntervalAgg::from("min").as_str(), "min");
    }

    #[test]
    fn relational_store_documents_a_fixed_set() {
        assert!(IntervalAgg::new("variance").is_documented_for(Database::Postgresql));
        assert!(!IntervalAgg::new("quantile").is_documented_for(Database::Postgresql));
        assert!(IntervalAgg::new("quantile").is_documented_for(Database::Clickhouse));
    }
}
