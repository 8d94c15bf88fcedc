//! Runs a single update cycle against the configured dataset and prints the
//! resulting rankings as JSON. Handy for checking a dataset or config offline.

use chrono::Utc;
use content_trending::{build_engine, init_tracing, EngineConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cfg = EngineConfig::load_default()?;
    let engine = build_engine(&cfg).await?;

    let report = engine.trigger_cycle(Utc::now()).await;
    let limit = cfg.default_limit;

    let out = serde_json::json!({
        "cycle": report,
        "top_content": engine.get_top_content(limit).await?,
        "top_sources": engine.get_top_sources(limit).await?,
        "top_hotwords": engine
            .get_top_hotwords(limit)
            .into_iter()
            .map(|t| {
                let clout = engine.get_clout_history(&t);
                serde_json::json!({ "term": t, "clout": clout })
            })
            .collect::<Vec<_>>(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
