//! Translation of high level query options into the query string of
//! `/api/query/{db}/`.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use tracing::warn;

mod aggregate;
mod database;
mod filter;
mod params;

pub use aggregate::{IntervalAgg, RELATIONAL_AGGREGATES};
pub use database::Database;
pub use filter::{parse_filter, FilterValue, INT_SUFFIX, NULL_SUFFIX};
pub use params::{ParamValue, QueryParams};

use crate::{client::ClientError, time::epoch_seconds};

/// Default maximum number of rows returned by a query.
pub const DEFAULT_LIMIT: u64 = 100;

/// Upper end of the time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpperBound {
    /// `time__lte`
    Inclusive(DateTime<Utc>),
    /// `time__lt`
    Exclusive(DateTime<Utc>),
}

impl UpperBound {
    fn key(&self) -> &'static str {
        match self {
            Self::Inclusive(_) => "time__lte",
            Self::Exclusive(_) => "time__lt",
        }
    }

    fn timestamp(&self) -> &DateTime<Utc> {
        match self {
            Self::Inclusive(ts) | Self::Exclusive(ts) => ts,
        }
    }
}

/// What a query call hands back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// A [`ResultTable`](crate::ResultTable) shaped from the response.
    #[default]
    Table,
    /// The decoded response body, untouched.
    Json,
}

/// One query against the measurement service.
///
/// ```no_run
/// # use wsn_client::{Database, QueryRequest};
/// let request = QueryRequest::new(Database::Postgresql)
///     .filter("name", "fw-001")
///     .fields(["latitude", "longitude"])
///     .tags(["serial"])
///     .limit(Some(2));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    pub db: Database,
    /// Columnar store table, e.g. `finseflux_Biomet`
    pub table: Option<String>,
    /// Fields to return; all of them when `None`, which is slow and meant for exploration.
    /// `time` is always included.
    pub fields: Option<Vec<String>>,
    /// Metadata fields attached to every row (relational store only)
    pub tags: Option<Vec<String>>,
    pub time_gte: Option<DateTime<Utc>>,
    pub time_upper: Option<UpperBound>,
    /// `None` returns every matching row
    pub limit: Option<u64>,
    /// Bucket width in seconds, left-closed and right-open
    pub interval: Option<u64>,
    pub interval_agg: Option<IntervalAgg>,
    pub filters: IndexMap<String, FilterValue>,
    pub format: OutputFormat,
    pub time_index: bool,
    /// Logs the URL, parameters, byte count, elapsed time and rendered output
    /// through `tracing` at `info` level. Nothing is shown unless a subscriber
    /// is installed, as the `wsn` binary does.
    pub debug: bool,
}

impl QueryRequest {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            table: None,
            fields: None,
            tags: None,
            time_gte: None,
            time_upper: None,
            limit: Some(DEFAULT_LIMIT),
            interval: None,
            interval_agg: None,
            filters: IndexMap::new(),
            format: OutputFormat::Table,
            time_index: true,
            debug: false,
        }
    }

    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn time_gte(mut self, ts: DateTime<Utc>) -> Self {
        self.time_gte = Some(ts);
        self
    }

    pub fn time_lte(mut self, ts: DateTime<Utc>) -> Self {
        self.time_upper = Some(UpperBound::Inclusive(ts));
        self
    }

    pub fn time_lt(mut self, ts: DateTime<Utc>) -> Self {
        self.time_upper = Some(UpperBound::Exclusive(ts));
        self
    }

    pub fn limit(mut self, limit: Option<u64>) -> Self {
        self.limit = limit;
        self
    }

    pub fn interval(mut self, seconds: u64) -> Self {
        self.interval = Some(seconds);
        self
    }

    pub fn interval_agg(mut self, agg: impl Into<IntervalAgg>) -> Self {
        self.interval_agg = Some(agg.into());
        self
    }

    /// Adds an equality filter on a metadata or data field. Later filters with
    /// the same key replace earlier ones.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        self.filters.insert(key.into(), value.into());
        self
    }

    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn time_index(mut self, time_index: bool) -> Self {
        self.time_index = time_index;
        self
    }

    /// Turns on the diagnostics described on the `debug` field.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Tags are attached to individual rows and have no meaning on aggregated ones.
    /// Filters may not reuse the name of a fixed option.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.tags.is_some() && (self.interval.is_some() || self.interval_agg.is_some()) {
            return Err(ClientError::InvalidRequest(
                "tags cannot be combined with interval or interval_agg".to_owned(),
            ));
        }
        if let Some(key) = self.filters.keys().find(|key| is_reserved(key)) {
            return Err(ClientError::InvalidRequest(format!(
                "filter `{key}` collides with a query option of the same name"
            )));
        }
        Ok(())
    }

    /// Builds the parameter mapping sent to the server.
    pub fn params(&self) -> Result<QueryParams, ClientError> {
        self.validate()?;

        if let Some(agg) = &self.interval_agg {
            if !agg.is_documented_for(self.db) {
                warn!(function = %agg, db = %self.db, "aggregate function is not documented for this store");
            }
        }
        if self.table.is_some() && !self.db.supports_table() {
            warn!(db = %self.db, "table is only meaningful for clickhouse");
        }
        if self.tags.is_some() && !self.db.supports_tags() {
            warn!(db = %self.db, "tags are only meaningful for postgresql");
        }

        let upper_key = self
            .time_upper
            .as_ref()
            .map_or("time__lte", UpperBound::key);

        let mut options = IndexMap::new();
        options.insert("table", self.table.clone().map(ParamValue::Str));
        options.insert("fields", self.fields.clone().map(ParamValue::List));
        options.insert("tags", self.tags.clone().map(ParamValue::List));
        options.insert(
            "time__gte",
            self.time_gte
                .as_ref()
                .map(|ts| ParamValue::Int(epoch_seconds(ts))),
        );
        options.insert(
            upper_key,
            self.time_upper
                .as_ref()
                .map(|upper| ParamValue::Int(epoch_seconds(upper.timestamp()))),
        );
        options.insert("limit", self.limit.map(to_int_param));
        options.insert("interval", self.interval.map(to_int_param));
        options.insert(
            "interval_agg",
            self.interval_agg
                .as_ref()
                .map(|agg| ParamValue::Str(agg.to_string())),
        );

        let filters = self
            .filters
            .iter()
            .map(|(key, value)| value.to_param(key))
            .collect();

        Ok(QueryParams { options, filters })
    }
}

/// Keys the fixed options are sent under.
const RESERVED_KEYS: [&str; 9] = [
    "table",
    "fields",
    "tags",
    "time__gte",
    "time__lte",
    "time__lt",
    "limit",
    "interval",
    "interval_agg",
];

fn is_reserved(key: &str) -> bool {
    let name = key.split_once(':').map_or(key, |(name, _)| name);
    RESERVED_KEYS.contains(&name)
}

fn to_int_param(value: u64) -> ParamValue {
    i64::try_from(value).map_or(ParamValue::UInt(value), ParamValue::Int)
}
