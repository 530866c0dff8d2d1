mod config;
mod sink;
mod telemetry;

use crate::config::ServiceConfig;
use crate::sink::JsonArraySink;
use anyhow::{Context, Result};
use enviro_domain::UplinkService;
use enviro_payload::EnviroProDecoder;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    telemetry::init_telemetry(&config.log_level);

    if let Err(e) = run(&config).await {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run(config: &ServiceConfig) -> Result<()> {
    let raw = tokio::fs::read_to_string(&config.msgs_path)
        .await
        .with_context(|| format!("reading messages from {}", config.msgs_path))?;
    let records: Vec<Value> =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", config.msgs_path))?;

    info!(
        record_count = records.len(),
        msgs_path = %config.msgs_path,
        "Decoding uplink records"
    );

    let sink = Arc::new(JsonArraySink::new());
    let service = UplinkService::new(Arc::new(EnviroProDecoder::new()), sink.clone());

    let published = service.process_batch(&records).await?;
    info!(
        published,
        skipped = records.len() - published,
        "Finished decoding"
    );

    let output = serde_json::to_string_pretty(&sink.entries())?;
    if config.output_path.is_empty() {
        println!("{}", output);
    } else {
        tokio::fs::write(&config.output_path, output)
            .await
            .with_context(|| format!("writing output to {}", config.output_path))?;
    }

    Ok(())
}
