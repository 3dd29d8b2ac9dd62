//! Quality controlled data: per-station download and batch upload.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info_span, Instrument};

use super::{ClientError, QueryClient};
use crate::{
    response::{ResultTable, TIME_COLUMN},
    time::{epoch_seconds, parse_timestamp},
};

/// One row of quality controlled data: field name to value, with `time` as
/// integer epoch seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(pub IndexMap<String, Value>);

impl Record {
    pub fn new(time: DateTime<Utc>) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(TIME_COLUMN.to_owned(), Value::from(epoch_seconds(&time)));
        Self(fields)
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn time(&self) -> Option<i64> {
        self.0.get(TIME_COLUMN).and_then(Value::as_i64)
    }

    /// Converts a loosely typed record, accepting `time` as epoch seconds, RFC
    /// 3339 or a naive `%Y-%m-%d %H:%M:%S` local time.
    pub fn from_map(map: Map<String, Value>) -> Result<Self, ClientError> {
        let mut fields: IndexMap<String, Value> = map.into_iter().collect();
        let time = match fields.get(TIME_COLUMN) {
            Some(Value::Number(n)) => n.as_f64().map(|secs| secs as i64),
            Some(Value::String(s)) => parse_timestamp(s).map(|ts| epoch_seconds(&ts)),
            _ => None,
        }
        .ok_or_else(|| {
            ClientError::InvalidRequest(format!(
                "record without a usable time: {}",
                fields.get(TIME_COLUMN).unwrap_or(&Value::Null)
            ))
        })?;
        fields.insert(TIME_COLUMN.to_owned(), Value::from(time));
        Ok(Self(fields))
    }
}

/// Records of one station, as posted to `/api/qc/upload/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadBatch {
    pub name: String,
    pub data: Vec<Record>,
}

impl UploadBatch {
    pub fn new(name: impl Into<String>, data: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn to_table(&self) -> ResultTable {
        ResultTable::from_records(
            self.data
                .iter()
                .map(|record| record.0.clone().into_iter().collect())
                .collect(),
        )
    }
}

/// Data of one station, as in the all stations download.
#[derive(Debug, Clone, PartialEq)]
pub struct StationData {
    pub name: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub data: ResultTable,
}

/// Station data travels either as records or as columns.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StationPayload {
    Records(Vec<Map<String, Value>>),
    Columns(IndexMap<String, Vec<Value>>),
}

impl From<StationPayload> for ResultTable {
    fn from(payload: StationPayload) -> Self {
        match payload {
            StationPayload::Records(records) => ResultTable::from_records(records),
            StationPayload::Columns(columns) => ResultTable::from_column_map(columns),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawStation {
    name: String,
    lat: Option<f64>,
    lng: Option<f64>,
    data: StationPayload,
}

#[derive(Debug, Deserialize)]
struct DownloadAllResponse {
    results: Vec<RawStation>,
}

impl QueryClient {
    /// Downloads the quality controlled data of one station, optionally within
    /// `[since, until)`.
    pub async fn download_station(
        &self,
        name: &str,
        since: Option<DateTime<Utc>>,
        until: Option<DateTime<Utc>>,
    ) -> Result<ResultTable, ClientError> {
        let url = self.config.url(&format!("/api/qc/download/{}/", name));
        let pairs: Vec<(String, String)> = [("time__gte", since), ("time__lt", until)]
            .into_iter()
            .filter_map(|(key, ts)| ts.map(|ts| (key.to_owned(), epoch_seconds(&ts).to_string())))
            .collect();

        let fetched = self
            .get(&url, &pairs, self.config.api_key_header()?)
            .instrument(info_span!("download_station", station = name))
            .await?;
        let payload: StationPayload = fetched.json()?;

        Ok(payload.into())
    }

    /// Downloads the quality controlled data of every station.
    pub async fn download_all(&self) -> Result<Vec<StationData>, ClientError> {
        let url = self.config.url("/api/qc/download/");
        let fetched = self
            .get(&url, &[], self.config.api_key_header()?)
            .instrument(info_span!("download_all"))
            .await?;
        let response: DownloadAllResponse = fetched.json()?;

        Ok(response
            .results
            .into_iter()
            .map(|station| StationData {
                name: station.name,
                lat: station.lat,
                lng: station.lng,
                data: station.data.into(),
            })
            .collect())
    }

    /// Posts batches to `/api/qc/upload/` and returns the server's answer.
    pub async fn upload(&self, batches: &[UploadBatch]) -> Result<Value, ClientError> {
        let url = self.config.url("/api/qc/upload/");
        let mut builder = self.http.post(&url).json(batches);
        if let Some(authorization) = self.config.api_key_header()? {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization);
        }

        let records: usize = batches.iter().map(|batch| batch.data.len()).sum();
        let fetched = self
            .execute(builder)
            .instrument(info_span!("upload", batches = batches.len(), records))
            .await?;

        fetched.json()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use serde_json::json;

    use super::*;

    #[test]
    fn upload_body_matches_the_wire_format() {
        let time = Utc.with_ymd_and_hms(2019, 4, 6, 15, 0, 0).unwrap();
        let batch = UploadBatch::new(
            "test",
            vec![Record::new(time)
                .with("temperature", 22.6875)
                .with("temperature_qc", false)],
        );

        assert_eq!(
            serde_json::to_value([&batch]).unwrap(),
            json!([{
                "name": "test",
                "data": [{"time": 1554562800, "temperature": 22.6875, "temperature_qc": false}],
            }])
        );
    }

    #[test]
    fn records_accept_textual_times() {
        let record = Record::from_map(
            json!({"time": "2019-04-06T15:10:00Z", "humidity": 11.994140625})
                .as_object()
                .cloned()
                .unwrap(),
        )
        .unwrap();

        assert_eq!(record.time(), Some(1_554_563_400));
        assert_eq!(record.0.get_index(1).unwrap().0, "humidity");
    }

    #[test]
    fn records_require_a_time() {
        let map = json!({"humidity": 12.0}).as_object().cloned().unwrap();
        assert!(matches!(Record::from_map(map), Err(ClientError::InvalidRequest(_))));
    }

    #[test]
    fn station_payloads_accept_records_and_columns() {
        let records: StationPayload =
            serde_json::from_value(json!([{"time": 1, "ta": 1.5}, {"time": 2}])).unwrap();
        let table = ResultTable::from(records);
        assert_eq!(table.columns, vec!["time", "ta"]);
        assert_eq!(table.len(), 2);

        let columns: StationPayload =
            serde_json::from_value(json!({"time": [1, 2], "ta": [1.5, 2.5]})).unwrap();
        let table = ResultTable::from(columns);
        assert_eq!(table.rows[1], vec![json!(2), json!(2.5)]);
    }
}
