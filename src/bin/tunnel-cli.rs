use clap::{Parser, Subcommand};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use serde_json::Value;
use std::path::PathBuf;

use sentry_tunnel::upstream::SENTRY_ENVELOPE_CONTENT_TYPE;

#[derive(Parser)]
#[command(name = "tunnel-cli")]
#[command(about = "Management CLI for the Sentry tunnel", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8100")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query the liveness probe; exits non-zero unless it reports ok
    Health,
    /// Post an envelope file through the tunnel
    Send {
        /// Path to a newline-delimited envelope
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{base}/health")).send().await?;
            let status = res.status();
            if !status.is_success() {
                return Err(format!("health check returned status {status}").into());
            }
            let json: Value = res.json().await?;
            println!("{}", serde_json::to_string_pretty(&json)?);
            check_health(&json)?;
        }
        Commands::Send { file } => {
            let body = tokio::fs::read(&file).await?;
            let res = client
                .post(format!("{base}/tunnel"))
                .header(CONTENT_TYPE, HeaderValue::from_static(SENTRY_ENVELOPE_CONTENT_TYPE))
                .body(body)
                .send()
                .await?;
            let status = res.status();
            let text = res.text().await?;
            println!("{status}");
            if !text.is_empty() {
                println!("{text}");
            }
            if !status.is_success() {
                return Err(format!("tunnel returned status {status}").into());
            }
        }
    }

    Ok(())
}

/// A 2xx probe still fails unless its body says `"status": "ok"`.
fn check_health(json: &Value) -> Result<(), String> {
    match json.get("status").and_then(Value::as_str) {
        Some("ok") => Ok(()),
        Some(other) => Err(format!("health check reported status {other:?}")),
        None => Err("health check response has no status field".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn health_requires_ok_status() {
        assert_eq!(check_health(&json!({"status": "ok", "version": "0.1.0"})), Ok(()));
        assert!(check_health(&json!({"status": "degraded"})).is_err());
        assert!(check_health(&json!({"status": 1})).is_err());
        assert!(check_health(&json!({})).is_err());
    }
}
