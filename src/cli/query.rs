//! `wsn query`

use chrono::{DateTime, Utc};
use clap::Args;
use wsn_client::{
    names::NameTable,
    query::{parse_filter, DEFAULT_LIMIT},
    ClientError, Database, FilterValue, OutputFormat, QueryClient, QueryOutput, QueryRequest,
};

use super::parse_time;

#[derive(Args, Debug)]
pub struct QueryArgs {
    /// Store to query: postgresql or clickhouse
    pub db: Database,

    /// Clickhouse table, e.g. finseflux_Biomet
    #[arg(long)]
    pub table: Option<String>,

    /// Field to return, repeatable; all fields when omitted (slow)
    #[arg(short, long = "field")]
    pub fields: Vec<String>,

    /// Metadata field to add to every row, repeatable (postgresql only)
    #[arg(long = "tag")]
    pub tags: Vec<String>,

    /// Start of the time range, inclusive
    #[arg(long, value_parser = parse_time)]
    pub since: Option<DateTime<Utc>>,

    /// End of the time range, inclusive unless --until-exclusive
    #[arg(long, value_parser = parse_time)]
    pub until: Option<DateTime<Utc>>,

    /// Make the end of the time range exclusive
    #[arg(long, requires = "until")]
    pub until_exclusive: bool,

    /// Maximum number of rows
    #[arg(short, long, default_value_t = DEFAULT_LIMIT, conflicts_with = "all")]
    pub limit: u64,

    /// Return every matching row
    #[arg(long)]
    pub all: bool,

    /// Interval size in seconds, one row per interval
    #[arg(short, long)]
    pub interval: Option<u64>,

    /// Aggregate applied within each interval, e.g. avg or min
    #[arg(long, requires = "interval")]
    pub agg: Option<String>,

    /// Filter as key=value, repeatable, e.g. name=fw-001 or serial=0x1F566F057C105487
    #[arg(long = "filter", value_parser = parse_filter)]
    pub filters: Vec<(String, FilterValue)>,

    /// Print the response as sent by the server
    #[arg(long)]
    pub json: bool,

    /// Keep the positional index instead of indexing by time
    #[arg(long)]
    pub no_time_index: bool,

    /// Rename columns with a name table: perm or mobile
    #[arg(long)]
    pub rename: Option<NameTable>,
}

impl QueryArgs {
    pub fn to_request(&self, debug: bool) -> QueryRequest {
        let mut request = QueryRequest::new(self.db)
            .limit((!self.all).then_some(self.limit))
            .format(if self.json {
                OutputFormat::Json
            } else {
                OutputFormat::Table
            })
            .time_index(!self.no_time_index)
            .debug(debug);

        request.table = self.table.clone();
        if !self.fields.is_empty() {
            request = request.fields(self.fields.iter().cloned());
        }
        if !self.tags.is_empty() {
            request = request.tags(self.tags.iter().cloned());
        }
        if let Some(since) = self.since {
            request = request.time_gte(since);
        }
        if let Some(until) = self.until {
            request = if self.until_exclusive {
                request.time_lt(until)
            } else {
                request.time_lte(until)
            };
        }
        if let Some(interval) = self.interval {
            request = request.interval(interval);
        }
        if let Some(agg) = &self.agg {
            request = request.interval_agg(agg.as_str());
        }
        for (key, value) in &self.filters {
            request = request.filter(key.as_str(), value.clone());
        }

        request
    }
}

pub async fn run(client: &QueryClient, args: QueryArgs, debug: bool) -> Result<(), ClientError> {
    let request = args.to_request(debug);

    let output = match client.query(&request).await? {
        QueryOutput::Table(mut table) => {
            if let Some(names) = args.rename {
                table.rename_columns(&names.rename_map());
            }
            QueryOutput::Table(table)
        }
        json => json,
    };

    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use wsn_client::query::ParamValue;

    use super::*;

    #[derive(Parser)]
    struct Cli {
        #[command(flatten)]
        args: QueryArgs,
    }

    fn request(argv: &[&str]) -> QueryRequest {
        let argv = std::iter::once(&"wsn").chain(argv);
        Cli::parse_from(argv).args.to_request(false)
    }

    #[test]
    fn builds_a_tags_query() {
        let request = request(&[
            "postgresql",
            "--filter",
            "name=fw-001",
            "-f",
            "latitude",
            "-f",
            "longitude",
            "--tag",
            "serial",
            "--limit",
            "2",
        ]);
        let params = request.params().unwrap();

        assert_eq!(params.present_keys(), vec!["fields", "tags", "limit", "name"]);
        assert_eq!(params.option("limit"), Some(&ParamValue::Int(2)));
    }

    #[test]
    fn all_rows_drops_the_limit() {
        let request = request(&["clickhouse", "--table", "finseflux_Biomet", "--all"]);
        assert_eq!(request.limit, None);
        assert_eq!(request.table.as_deref(), Some("finseflux_Biomet"));
    }

    #[test]
    fn exclusive_upper_bound() {
        let request = request(&[
            "postgresql",
            "--until",
            "2018-04-01T00:00:00Z",
            "--until-exclusive",
            "--interval",
            "3600",
            "--agg",
            "mean",
        ]);
        let params = request.params().unwrap();

        assert_eq!(params.option("time__lt"), Some(&ParamValue::Int(1_522_540_800)));
        assert_eq!(params.option("interval_agg"), Some(&ParamValue::Str("avg".to_owned())));
    }

    #[test]
    fn integer_filters_keep_their_type() {
        let signed = request(&["postgresql", "--filter", "serial=0x1F566F057C105487"]);
        assert!(signed.params().unwrap().filters.contains_key("serial:int"));

        let unsigned = request(&["postgresql", "--filter", "serial=0x9F566F057C105487"]);
        assert_eq!(
            unsigned.params().unwrap().filter("serial:int"),
            Some(&ParamValue::UInt(0x9F56_6F05_7C10_5487))
        );
    }
}
