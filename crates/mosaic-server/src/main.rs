//! `mosaic` command-line interface

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use mosaic_server::{AppState, build_router};
use mosaic_utils::{AppConfig, init_tracing_with};
use mosaic_valuation::{
    AnalysisKind, ChatEnvelope, MarketDataService, ProgressSimulator, ResponseFormatter,
    SharedRng, ValuationConfig,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(about = "Mock crypto valuation assistant", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "MOSAIC_BIND_ADDR", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,
        /// Reply to chat messages without the simulated latency
        #[arg(long)]
        no_latency: bool,
    },
    /// Run a progress simulation to completion in the terminal
    Simulate {
        /// Analysis type (market_analysis, technical_analysis, fundamental_analysis)
        #[arg(long = "type", default_value = "market_analysis")]
        kind: String,
        /// Milliseconds between ticks
        #[arg(long, default_value_t = 500, value_parser = clap::value_parser!(u64).range(1..))]
        interval_ms: u64,
        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Send one chat message, locally or to a running server
    Ask {
        message: String,
        #[arg(long)]
        session_id: Option<String>,
        /// Base URL of a running server, e.g. http://localhost:3000
        #[arg(long)]
        server: Option<url::Url>,
    },
    /// Print the 30-day chart series
    Chart {
        /// Also print the 7-day projection
        #[arg(long)]
        predict: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let app_config = AppConfig::default().with_env();
    init_tracing_with(app_config.log_format, "info");

    let cli = Cli::parse();
    info!(environment = %app_config.environment, "starting mosaic");
    let config = ValuationConfig::default().with_env();
    config.validate().context("invalid configuration")?;

    match cli.command {
        Commands::Serve { bind, no_latency } => serve(config, bind, no_latency).await,
        Commands::Simulate {
            kind,
            interval_ms,
            seed,
        } => simulate(&kind, Duration::from_millis(interval_ms), seed).await,
        Commands::Ask {
            message,
            session_id,
            server,
        } => ask(config, &message, session_id.as_deref(), server).await,
        Commands::Chart { predict } => chart(config, predict).await,
    }
}

async fn serve(config: ValuationConfig, bind: SocketAddr, no_latency: bool) -> anyhow::Result<()> {
    let mut state = AppState::new(&config)?;
    if no_latency {
        state.formatter = state.formatter.without_latency();
    }

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    info!(addr = %bind, "mosaic API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

async fn simulate(kind: &str, interval: Duration, seed: Option<u64>) -> anyhow::Result<()> {
    let kind = AnalysisKind::resolve(Some(kind));
    let rng = seed.map_or_else(SharedRng::from_entropy, SharedRng::seeded);

    let mut local = rng.fork();
    let mut tick = 0_u32;
    ProgressSimulator::new()
        .drive(kind, interval, &mut local, |snapshot| {
            let steps: Vec<String> = snapshot
                .flow
                .iter()
                .map(|step| format!("{} {:>5.1}%", step.title, step.data.completion))
                .collect();
            println!("[{tick:>3}] agents active: {} | {}", snapshot.agents.len(), steps.join(" | "));
            tick += 1;
        })
        .await;

    println!("{} complete after {} ticks", kind.as_str(), tick.saturating_sub(1));
    Ok(())
}

async fn ask(
    config: ValuationConfig,
    message: &str,
    session_id: Option<&str>,
    server: Option<url::Url>,
) -> anyhow::Result<()> {
    let envelope = match server {
        Some(base) => ask_remote(&config, &base, message, session_id).await?,
        None => {
            ResponseFormatter::new(&config, SharedRng::from_entropy())
                .respond(message, session_id)
                .await?
        }
    };

    let reply = envelope.message().context("reply has no message")?;
    println!("session: {}", envelope.session_id);
    println!("sender:  {} ({})", reply.sender, reply.sender_name);
    println!("source:  {}", reply.properties.source.display_name);
    println!();
    println!("{}", reply.text);
    Ok(())
}

/// POST to a running server and check the reply has the envelope shape
async fn ask_remote(
    config: &ValuationConfig,
    base: &url::Url,
    message: &str,
    session_id: Option<&str>,
) -> anyhow::Result<ChatEnvelope> {
    let endpoint = base.join("/api/chat").context("invalid server URL")?;
    let mut body = serde_json::json!({ "message": message });
    if let Some(session_id) = session_id {
        body["session_id"] = session_id.into();
    }

    // Allow for the simulated inference latency on top of the usual timeout.
    let client = reqwest::Client::builder()
        .timeout(config.request_timeout + config.chat_delay_max)
        .build()?;
    let response = client.post(endpoint.clone()).json(&body).send().await?;
    let status = response.status();
    let payload: serde_json::Value = response.json().await?;
    if !status.is_success() {
        bail!("{endpoint} answered {status}: {payload}");
    }

    let envelope: ChatEnvelope =
        serde_json::from_value(payload).context("reply is not a chat envelope")?;
    if let Some(expected) = session_id.filter(|expected| envelope.session_id != *expected) {
        bail!("session id not echoed: sent {expected}, got {}", envelope.session_id);
    }
    info!(%endpoint, session_id = %envelope.session_id, "reply has the expected envelope shape");
    Ok(envelope)
}

async fn chart(config: ValuationConfig, predict: bool) -> anyhow::Result<()> {
    let market = MarketDataService::new(&config, SharedRng::from_entropy())?;
    let series = market.fetch_or_synthesize().await;

    println!(
        "source: {}{}",
        series.source.as_str(),
        if series.ohlc_derived { " (derived OHLC)" } else { "" }
    );
    println!("{:<11} {:>12} {:>12} {:>12} {:>12} {:>16}", "date", "open", "high", "low", "close", "volume");
    let projection = if predict { market.predict(&series.candles) } else { Vec::new() };
    for candle in series.candles.iter().chain(&projection) {
        println!(
            "{:<11} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>16.0}{}",
            candle.time,
            candle.open,
            candle.high,
            candle.low,
            candle.close,
            candle.volume,
            if candle.is_prediction == Some(true) { "  *" } else { "" }
        );
    }
    Ok(())
}
