//! Client for the UiO wireless sensor network measurement service.
//!
//! [`QueryClient::query`] maps a [`QueryRequest`] onto the query string of
//! `/api/query/{db}/` and shapes the JSON answer into a [`ResultTable`]. The
//! quality controlled data endpoints are covered by
//! [`QueryClient::download_station`], [`QueryClient::download_all`] and
//! [`QueryClient::upload`].

pub mod client;
pub mod names;
pub mod query;
pub mod response;
pub mod time;

pub use client::{ClientConfig, ClientError, QueryClient, QueryOutput, Record, StationData, UploadBatch};
pub use query::{Database, FilterValue, IntervalAgg, OutputFormat, QueryRequest};
pub use response::{IndexWarning, ResponseEnvelope, ResultTable, RowIndex};
