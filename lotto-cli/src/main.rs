mod display;
mod fetch;
mod refresh;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use tokio::io::{AsyncBufReadExt, BufReader};

use lotto_core::config::StatsConfig;
use lotto_core::models::{MetricKind, StatsSnapshot};
use lotto_core::project::{
    build_report, to_chart_series, to_combined_table, to_delay_detail, to_ranked_list,
};
use lotto_core::rank::rank;

use crate::display::{
    display_chart, display_combined_table, display_delay_detail, display_header,
    display_refresh_error, display_report, display_top,
};
use crate::fetch::HttpSource;
use crate::refresh::Refresher;

#[derive(Parser)]
#[command(name = "lotto", about = "Statistiche Lotto: frequenze e ritardi dei numeri 1-90")]
struct Cli {
    /// File di configurazione JSON
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// URL base dell'API (sovrascrive apiBaseUrl)
    #[arg(short, long, global = true)]
    url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

/// Metric selector on the command line; also accepts the API names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Metric {
    #[value(alias = "frequenze")]
    Frequency,
    #[value(alias = "ritardi")]
    Delay,
}

impl From<Metric> for MetricKind {
    fn from(metric: Metric) -> Self {
        match metric {
            Metric::Frequency => MetricKind::Frequency,
            Metric::Delay => MetricKind::Delay,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Grafico a barre dei numeri in testa
    Chart {
        #[arg(short, long, default_value = "frequency")]
        metric: Metric,
    },

    /// Classifica dei numeri
    Top {
        #[arg(short, long, default_value = "frequency")]
        metric: Metric,

        /// Numero di posizioni (default: topNList)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Tabella combinata frequenze/ritardi
    Table {
        /// Numero di righe (default: topNTable)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Ritardi in dettaglio
    Delays {
        /// Numero di righe (default: topNDelayDetail)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Tutte le viste
    All {
        #[arg(short, long, default_value = "frequency")]
        metric: Metric,

        /// Stampa il report in JSON
        #[arg(long)]
        json: bool,
    },

    /// Aggiornamento periodico (Invio per aggiornare subito, q per uscire)
    Watch {
        #[arg(short, long, default_value = "frequency")]
        metric: Metric,

        /// Intervallo in secondi (default: refreshIntervalSecs)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Mostra la configurazione effettiva
    Config,
}

fn load_config(cli: &Cli) -> Result<StatsConfig> {
    let mut config = match &cli.config {
        Some(path) => StatsConfig::load(path)?,
        None => StatsConfig::default(),
    };
    if let Some(url) = &cli.url {
        config.api_base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = load_config(&cli).context("Configurazione rifiutata")?;

    if let Command::Config = cli.command {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    info!("API: {}", config.api_base_url);
    let refresher = Refresher::new(HttpSource::new(&config.api_base_url), config.refresh_timeout());

    match cli.command {
        Command::Chart { metric } => cmd_chart(&refresher, &config, metric.into()).await,
        Command::Top { metric, limit } => cmd_top(&refresher, &config, metric.into(), limit).await,
        Command::Table { limit } => cmd_table(&refresher, &config, limit).await,
        Command::Delays { limit } => cmd_delays(&refresher, &config, limit).await,
        Command::All { metric, json } => cmd_all(&refresher, &config, metric.into(), json).await,
        Command::Watch { metric, interval } => {
            cmd_watch(&refresher, &config, metric.into(), interval).await
        }
        Command::Config => Ok(()),
    }
}

/// `--limit` if given, else the configured default. Zero is rejected like a zero `topN*` in config.
fn window(limit: Option<usize>, default: usize) -> Result<usize> {
    match limit {
        Some(0) => anyhow::bail!("Il limite deve essere > 0"),
        Some(n) => Ok(n),
        None => Ok(default),
    }
}

fn spinner() -> Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}")?);
    pb.set_message("Aggiornando...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Ok(pb)
}

async fn load(refresher: &Refresher<HttpSource>) -> Result<Arc<StatsSnapshot>> {
    let pb = spinner()?;
    let result = refresher.refresh().await;
    pb.finish_and_clear();
    let snapshot = result.context("Impossibile caricare le statistiche")?;
    display_header(&snapshot);
    Ok(snapshot)
}

async fn cmd_chart(refresher: &Refresher<HttpSource>, config: &StatsConfig, metric: MetricKind) -> Result<()> {
    let snapshot = load(refresher).await?;
    let ranked = rank(snapshot.dataset(metric), config.top_n_chart, config);
    display_chart(&to_chart_series(&ranked), metric);
    Ok(())
}

async fn cmd_top(
    refresher: &Refresher<HttpSource>,
    config: &StatsConfig,
    metric: MetricKind,
    limit: Option<usize>,
) -> Result<()> {
    let limit = window(limit, config.top_n_list)?;
    let snapshot = load(refresher).await?;
    let ranked = rank(snapshot.dataset(metric), limit, config);
    display_top(&to_ranked_list(&ranked, limit), metric);
    Ok(())
}

async fn cmd_table(refresher: &Refresher<HttpSource>, config: &StatsConfig, limit: Option<usize>) -> Result<()> {
    let limit = window(limit, config.top_n_table)?;
    let snapshot = load(refresher).await?;
    display_combined_table(&to_combined_table(&snapshot.frequencies, &snapshot.delays, limit));
    Ok(())
}

async fn cmd_delays(refresher: &Refresher<HttpSource>, config: &StatsConfig, limit: Option<usize>) -> Result<()> {
    let limit = window(limit, config.top_n_delay_detail)?;
    let snapshot = load(refresher).await?;
    let ranked = rank(&snapshot.delays, limit, config);
    display_delay_detail(&to_delay_detail(&ranked, limit));
    Ok(())
}

async fn cmd_all(
    refresher: &Refresher<HttpSource>,
    config: &StatsConfig,
    metric: MetricKind,
    json: bool,
) -> Result<()> {
    if json {
        let snapshot = refresher
            .refresh()
            .await
            .context("Impossibile caricare le statistiche")?;
        let report = build_report(&snapshot, metric, config);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let snapshot = load(refresher).await?;
    display_report(&build_report(&snapshot, metric, config));
    Ok(())
}

async fn cmd_watch(
    refresher: &Refresher<HttpSource>,
    config: &StatsConfig,
    metric: MetricKind,
    interval: Option<u64>,
) -> Result<()> {
    let period = match interval {
        Some(0) => anyhow::bail!("L'intervallo deve essere > 0"),
        Some(secs) => Duration::from_secs(secs),
        None => config.refresh_interval(),
    };
    println!(
        "Aggiornamento ogni {} s. Invio per aggiornare subito, q per uscire.",
        period.as_secs()
    );

    let mut ticker = tokio::time::interval(period);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            line = lines.next_line(), if stdin_open => match line {
                Ok(Some(l)) if l.trim().eq_ignore_ascii_case("q") => break,
                Ok(Some(_)) => ticker.reset(),
                Ok(None) | Err(_) => {
                    stdin_open = false;
                    continue;
                }
            },
            _ = tokio::signal::ctrl_c() => break,
        }

        let pb = spinner()?;
        let result = refresher.refresh().await;
        pb.finish_and_clear();

        match result {
            Ok(snapshot) => {
                display_header(&snapshot);
                display_report(&build_report(&snapshot, metric, config));
            }
            Err(e) => display_refresh_error(&e, refresher.current().is_some()),
        }
    }

    println!("Uscita.");
    Ok(())
}
