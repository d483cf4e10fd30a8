//! Demo CLI for PopSub
//!
//! Taps every configured topic with a `LogSubscriber`, then publishes one
//! message per stdin line of the form `<topic> <payload>`. The payload is
//! parsed as JSON when possible and sent as a JSON string otherwise.
//! EOF or Ctrl-C shuts the broker down.

use std::sync::Arc;

use popsub::broker::{Broker, MemoryBroker};
use popsub::config::load_config;
use popsub::subscriber::LogSubscriber;
use popsub::utils::logging;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("popsub failed: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    logging::init(&config.log.level);

    let ctx = CancellationToken::new();
    let broker: Arc<MemoryBroker<Value>> = Arc::new(MemoryBroker::with_settings(&config.broker));

    for topic in &config.broker.topics {
        let subscriber = Arc::new(LogSubscriber::new(format!("log-{topic}")));
        broker
            .subscribe(&ctx, topic.as_str().into(), subscriber)
            .await?;
    }
    info!(topics = ?config.broker.topics, "listening on stdin: <topic> <payload>");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let Some((topic, payload)) = parse_line(&line) else {
                    warn!("expected `<topic> <payload>`, got {:?}", line);
                    continue;
                };
                if let Err(e) = broker.publish(&ctx, topic.into(), payload).await {
                    warn!(label = e.as_label(), "{}", e);
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received. Exiting gracefully.");
                break;
            }
        }
    }

    broker.shutdown(&ctx).await;
    Ok(())
}

fn parse_line(line: &str) -> Option<(&str, Value)> {
    let (topic, payload) = line.trim().split_once(char::is_whitespace)?;
    let payload = payload.trim();
    let value = serde_json::from_str(payload).unwrap_or_else(|_| Value::String(payload.to_string()));
    Some((topic, value))
}
