use serde::Deserialize;
use serde_json::{Map, Value};

/// Format tag of envelopes whose rows are objects with varying keys.
pub const SPARSE_FORMAT: &str = "sparse";

/// Body of a `/api/query/{db}/` response.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(try_from = "RawEnvelope")]
pub enum ResponseEnvelope {
    /// Rows are objects; a row may omit fields present in other rows.
    Sparse { rows: Vec<Map<String, Value>> },
    /// Rows are positional, one value per column.
    Columnar {
        format: String,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    },
}

impl ResponseEnvelope {
    pub fn len(&self) -> usize {
        match self {
            Self::Sparse { rows } => rows.len(),
            Self::Columnar { rows, .. } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The envelope as it travels, before the format tag is checked against the
/// shape of the rows.
#[derive(Clone, Debug, Deserialize)]
struct RawEnvelope {
    format: String,
    columns: Option<Vec<String>>,
    rows: Vec<Value>,
}

impl TryFrom<RawEnvelope> for ResponseEnvelope {
    type Error = String;

    fn try_from(raw: RawEnvelope) -> Result<Self, Self::Error> {
        if raw.format == SPARSE_FORMAT {
            let rows = raw
                .rows
                .into_iter()
                .enumerate()
                .map(|(i, row)| match row {
                    Value::Object(row) => Ok(row),
                    other => Err(format!("sparse row {i} is not an object: {other}")),
                })
                .collect::<Result<_, _>>()?;
            return Ok(Self::Sparse { rows });
        }

        let columns = raw
            .columns
            .ok_or_else(|| format!("{:?} response without columns", raw.format))?;
        let rows = raw
            .rows
            .into_iter()
            .enumerate()
            .map(|(i, row)| match row {
                Value::Array(values) if values.len() == columns.len() => Ok(values),
                Value::Array(values) => Err(format!(
                    "row {i} has {} values for {} columns",
                    values.len(),
                    columns.len()
                )),
                other => Err(format!("row {i} is not an array: {other}")),
            })
            .collect::<Result<_, _>>()?;

        Ok(Self::Columnar {
            format: raw.format,
            columns,
            rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_sparse_envelopes() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "format": "sparse",
            "rows": [{"a": 1, "b": 2}, {"a": 3}],
        }))
        .unwrap();

        match envelope {
            ResponseEnvelope::Sparse { rows } => {
                assert_eq!(rows.len(), 2);
                assert!(!rows[1].contains_key("b"));
            }
            other => panic!("expected sparse envelope, got {other:?}"),
        }
    }

    #[test]
    fn decodes_columnar_envelopes() {
        let envelope: ResponseEnvelope = serde_json::from_value(json!({
            "format": "columns",
            "columns": ["time", "x"],
            "rows": [[1609459200, 10], [1609462800, 20]],
        }))
        .unwrap();

        assert_eq!(envelope.len(), 2);
        assert!(matches!(
            envelope,
            ResponseEnvelope::Columnar { ref columns, .. } if columns == &["time", "x"]
        ));
    }

    #[test]
    fn rejects_ragged_columnar_rows() {
        let result = serde_json::from_value::<ResponseEnvelope>(json!({
            "format": "columns",
            "columns": ["time", "x"],
            "rows": [[1609459200, 10], [1609462800]],
        }));
        let message = result.unwrap_err().to_string();
        assert!(message.contains("row 1 has 1 values for 2 columns"), "{message}");
    }

    #[test]
    fn rejects_envelopes_without_rows() {
        assert!(serde_json::from_value::<ResponseEnvelope>(json!({"format": "sparse"})).is_err());
        assert!(
            serde_json::from_value::<ResponseEnvelope>(json!({"format": "columns", "rows": []}))
                .is_err()
        );
    }
}
