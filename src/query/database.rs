use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// The backing store answering a query. Rendered as the path segment of
/// `/api/query/{db}/`.
#[derive(
    Debug, Serialize, Deserialize, Hash, Eq, PartialEq, Clone, Copy, Display, EnumIter, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Database {
    /// Relational store: metadata filters, tags, every station except the raw flux tables.
    Postgresql,
    /// Columnar store holding the raw finseflux/mobileflux tables.
    Clickhouse,
}

impl Database {
    pub fn supports_tags(&self) -> bool {
        matches!(self, Self::Postgresql)
    }

    pub fn supports_table(&self) -> bool {
        matches!(self, Self::Clickhouse)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn renders_as_path_segment() {
        assert_eq!(Database::Postgresql.to_string(), "postgresql");
        assert_eq!(Database::Clickhouse.to_string(), "clickhouse");
    }

    #[test]
    fn parses_lowercase_names() {
        assert_eq!(Database::from_str("clickhouse").unwrap(), Database::Clickhouse);
        assert!(Database::from_str("mysql").is_err());
    }
}
