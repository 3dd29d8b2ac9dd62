//! `wsn download`

use chrono::{DateTime, Utc};
use clap::Args;
use wsn_client::{ClientError, QueryClient};

use super::parse_time;

#[derive(Args, Debug)]
pub struct DownloadArgs {
    /// Station name, e.g. sw-001; every station when omitted
    pub name: Option<String>,

    /// Start of the time range, inclusive
    #[arg(long, value_parser = parse_time, requires = "name")]
    pub since: Option<DateTime<Utc>>,

    /// End of the time range, exclusive
    #[arg(long, value_parser = parse_time, requires = "name")]
    pub until: Option<DateTime<Utc>>,
}

pub async fn run(client: &QueryClient, args: DownloadArgs) -> Result<(), ClientError> {
    match &args.name {
        Some(name) => {
            let table = client.download_station(name, args.since, args.until).await?;
            println!("{}", table);
        }
        None => {
            for station in client.download_all().await? {
                let position = match (station.lat, station.lng) {
                    (Some(lat), Some(lng)) => format!(" ({lat}, {lng})"),
                    _ => String::new(),
                };
                println!("{}{}", station.name, position);
                println!("{}", station.data);
                println!();
            }
        }
    }
    Ok(())
}
