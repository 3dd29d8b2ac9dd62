//! `wsn upload`

use std::{fs, path::PathBuf};

use clap::Args;
use serde_json::{Map, Value};
use tracing::info;
use wsn_client::{ClientError, QueryClient, Record, UploadBatch};

#[derive(Args, Debug)]
pub struct UploadArgs {
    /// Station the records belong to
    #[arg(long)]
    pub name: String,

    /// JSON file holding an array of records. `time` may be epoch seconds,
    /// RFC 3339 or `%Y-%m-%d %H:%M:%S` local time
    pub file: PathBuf,

    /// Print what would be sent without sending it
    #[arg(long)]
    pub dry_run: bool,
}

pub fn read_batch(name: &str, contents: &str) -> Result<UploadBatch, ClientError> {
    let records: Vec<Map<String, Value>> = serde_json::from_str(contents)?;
    let data = records
        .into_iter()
        .map(Record::from_map)
        .collect::<Result<_, _>>()?;
    Ok(UploadBatch::new(name, data))
}

pub async fn run(client: &QueryClient, args: UploadArgs) -> Result<(), ClientError> {
    let contents = fs::read_to_string(&args.file).map_err(|err| {
        ClientError::InvalidRequest(format!("cannot read {}: {}", args.file.display(), err))
    })?;
    let batch = read_batch(&args.name, &contents)?;

    println!("{}", batch.to_table());
    info!(name = %batch.name, records = batch.data.len(), "prepared upload");

    let batches = [batch];
    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&batches)?);
        return Ok(());
    }

    let response = client.upload(&batches).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
