use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use tempmon_service::alert::thresholds::{check_current_temperature, current_season};
use tempmon_service::analysis::annotate::annotate;
use tempmon_service::analysis::groupings::city_slice;
use tempmon_service::analysis::seasonal::season_stats;
use tempmon_service::analysis::summary::describe;
use tempmon_service::analysis::yearly::yearly_profile;
use tempmon_service::bench::batch::run_batch_benchmark;
use tempmon_service::bench::fanout::{FanoutReport, run_fanout_benchmark, successful};
use tempmon_service::bench::schedule::TaskOutcome;
use tempmon_service::bench::{BenchmarkResult, StrategyRun};
use tempmon_service::config::{AppConfig, api_key_from_env};
use tempmon_service::ingest::csv_table::{TemperatureTable, load_temperature_csv_path};
use tempmon_service::ingest::openweather::{build_blocking_client, fetch_current_blocking};
use tempmon_service::logging::{self, DataSource, LogLevel};
use tempmon_service::model::{CityAnomalySummary, CitySeries, WeatherQuoteResult};

// ---------------------------------------------------------------------------
// CLI argument structs
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(
    name = "tempmon",
    version,
    about = "Temperature anomaly analysis and weather fetch benchmarks",
    propagate_version = true
)]
struct Cli {
    /// TOML config file; every setting has a default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Overrides logging.level from the config file
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the cities present in a temperature CSV
    Cities(CsvArgs),
    /// Rolling and seasonal anomaly bands for one city
    Analyze(AnalyzeArgs),
    /// Per-season mean and spread for one city
    Seasons(CityArgs),
    /// Calendar-year mean temperature for one city
    Yearly(CityArgs),
    /// Fetch the live temperature and judge it against the season band
    Current(CityArgs),
    /// Time blocking vs. event-loop live weather fetches
    BenchLive(BenchLiveArgs),
    /// Time sequential vs. worker-pool anomaly analysis
    BenchBatch(BenchBatchArgs),
}

#[derive(Parser)]
struct CsvArgs {
    /// Temperature CSV with city, timestamp, temperature[, season] columns
    #[arg(long)]
    csv: PathBuf,
}

#[derive(Parser)]
struct CityArgs {
    #[command(flatten)]
    input: CsvArgs,

    #[arg(long)]
    city: String,
}

#[derive(Parser)]
struct AnalyzeArgs {
    #[command(flatten)]
    target: CityArgs,

    /// Rolling window in readings (default from config)
    #[arg(long)]
    window: Option<usize>,

    /// Print only readings flagged by either detector
    #[arg(long)]
    anomalies_only: bool,
}

#[derive(Parser)]
struct BenchLiveArgs {
    /// Comma-separated city names
    #[arg(long, value_delimiter = ',', required = true)]
    cities: Vec<String>,
}

#[derive(Parser)]
struct BenchBatchArgs {
    #[command(flatten)]
    input: CsvArgs,

    /// Comma-separated city names (default: every city in the CSV)
    #[arg(long, value_delimiter = ',')]
    cities: Vec<String>,

    #[arg(long)]
    window: Option<usize>,

    #[arg(long)]
    workers: Option<usize>,
}

// ---------------------------------------------------------------------------
// Table rows
// ---------------------------------------------------------------------------

#[derive(Tabled)]
struct BandRow {
    date: String,
    season: String,
    #[tabled(rename = "temp °C")]
    temperature: String,
    roll_mean: String,
    roll_lower: String,
    roll_upper: String,
    roll_anomaly: String,
    season_lower: String,
    season_upper: String,
    season_anomaly: String,
}

#[derive(Tabled)]
struct SeasonRow {
    season: String,
    count: usize,
    mean: String,
    std: String,
    lower: String,
    upper: String,
}

#[derive(Tabled)]
struct YearRow {
    year: i32,
    #[tabled(rename = "mean °C")]
    temp_mean: String,
}

#[derive(Tabled)]
struct QuoteRow {
    city: String,
    #[tabled(rename = "temp °C")]
    temp: String,
    error: String,
}

#[derive(Tabled)]
struct SummaryRow {
    city: String,
    n_days: usize,
    period_start: String,
    period_end: String,
    rolling_anomalies: String,
    season_anomalies: String,
}

#[derive(Tabled)]
struct TimingRow {
    strategy: String,
    seconds: String,
    results: usize,
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "-".to_string())
}

fn flag(value: bool) -> String {
    if value { "YES".to_string() } else { String::new() }
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    if rows.is_empty() {
        println!("(no rows)");
    } else {
        let mut table = Table::new(rows);
        table.with(Style::modern());
        println!("{}", table);
    }
}

fn print_timings<R>(result: &BenchmarkResult<R>) {
    let row = |run: &StrategyRun<R>| TimingRow {
        strategy: run.label.to_string(),
        seconds: format!("{:.3}", run.seconds()),
        results: run.results.len(),
    };
    print_table(vec![row(&result.baseline), row(&result.contender)]);
    println!("speedup: {}", result.speedup());
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn load_table(path: &Path) -> Result<TemperatureTable> {
    let table = load_temperature_csv_path(path)
        .with_context(|| format!("failed to load {}", path.display()))?;
    logging::log_row_errors(&table.row_errors);
    table
        .ensure_valid()
        .with_context(|| format!("{} has invalid rows", path.display()))?;
    logging::info(
        DataSource::Csv,
        None,
        &format!(
            "Loaded {} readings for {} cities from {}",
            table.len(),
            table.cities().len(),
            path.display()
        ),
    );
    Ok(table)
}

fn load_city(args: &CityArgs) -> Result<CitySeries> {
    let table = load_table(&args.input.csv)?;
    let series = city_slice(&table, &args.city);
    if series.is_empty() {
        bail!("no readings for city '{}'", args.city);
    }
    Ok(series)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_cities(args: CsvArgs) -> Result<()> {
    let table = load_table(&args.csv)?;
    for city in table.cities() {
        println!("{}", city);
    }
    Ok(())
}

fn cmd_analyze(args: AnalyzeArgs, config: &AppConfig) -> Result<()> {
    let window = args.window.unwrap_or(config.analysis.window);
    let series = load_city(&args.target)?;

    if let Some(d) = describe(&series) {
        println!(
            "{}: {} readings, mean {:.2}, std {}, min {:.2}, 25% {:.2}, 50% {:.2}, 75% {:.2}, max {:.2}",
            series.city,
            d.count,
            d.mean,
            fmt_opt(d.std),
            d.min,
            d.q25,
            d.median,
            d.q75,
            d.max
        );
    }

    let annotated = annotate(series, window);
    let rows: Vec<BandRow> = annotated
        .rows()
        .filter(|(_, roll, season)| {
            !args.anomalies_only || roll.roll_anomaly || season.season_anomaly
        })
        .map(|(reading, roll, season)| BandRow {
            date: reading.timestamp.format("%Y-%m-%d").to_string(),
            season: reading.season.to_string(),
            temperature: format!("{:.2}", reading.temperature),
            roll_mean: fmt_opt(roll.roll_mean),
            roll_lower: fmt_opt(roll.roll_lower),
            roll_upper: fmt_opt(roll.roll_upper),
            roll_anomaly: flag(roll.roll_anomaly),
            season_lower: fmt_opt(season.season_lower),
            season_upper: fmt_opt(season.season_upper),
            season_anomaly: flag(season.season_anomaly),
        })
        .collect();
    print_table(rows);

    let summary = annotated.summary();
    println!(
        "window {}: {} rolling anomalies, {} seasonal anomalies",
        annotated.window, summary.rolling_anomalies, summary.season_anomalies
    );
    Ok(())
}

fn cmd_seasons(args: CityArgs) -> Result<()> {
    let series = load_city(&args)?;
    let rows: Vec<SeasonRow> = season_stats(&series)
        .iter()
        .map(|(season, stat)| {
            let bounds = stat.bounds();
            SeasonRow {
                season: season.to_string(),
                count: stat.count,
                mean: format!("{:.2}", stat.mean),
                std: fmt_opt(stat.std),
                lower: fmt_opt(bounds.map(|(lower, _)| lower)),
                upper: fmt_opt(bounds.map(|(_, upper)| upper)),
            }
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_yearly(args: CityArgs) -> Result<()> {
    let series = load_city(&args)?;
    let rows: Vec<YearRow> = yearly_profile(&series)
        .into_iter()
        .map(|p| YearRow {
            year: p.year,
            temp_mean: format!("{:.2}", p.temp_mean),
        })
        .collect();
    print_table(rows);
    Ok(())
}

fn cmd_current(args: CityArgs, config: &AppConfig) -> Result<()> {
    let series = load_city(&args)?;
    let api_key = api_key_from_env()?;

    let client = build_blocking_client(&config.weather)?;
    let quote = fetch_current_blocking(&client, &config.weather, &args.city, &api_key)
        .inspect_err(|e| logging::log_weather_failure(&args.city, "current temperature", e))
        .with_context(|| format!("could not fetch current weather for {}", args.city))?;

    let season = current_season(&Utc::now());
    let check = check_current_temperature(&args.city, quote.temperature, season, &season_stats(&series))?;
    println!("{}", check.message());
    Ok(())
}

fn quote_rows(outcomes: &[TaskOutcome<WeatherQuoteResult>]) -> Vec<QuoteRow> {
    let mut rows: Vec<QuoteRow> = outcomes
        .iter()
        .map(|o| match &o.result {
            Ok(q) => QuoteRow {
                city: q.city.clone(),
                temp: fmt_opt(q.temp),
                error: q.error.as_ref().map(|e| e.to_string()).unwrap_or_default(),
            },
            Err(failure) => QuoteRow {
                city: o.city.clone(),
                temp: fmt_opt(None),
                error: failure.to_string(),
            },
        })
        .collect();
    rows.sort_by(|a, b| a.city.cmp(&b.city));
    rows
}

fn cmd_bench_live(args: BenchLiveArgs, config: &AppConfig) -> Result<()> {
    let api_key = api_key_from_env()?;
    let report: FanoutReport = run_fanout_benchmark(&args.cities, &api_key, &config.weather)?;

    for run in [&report.baseline, &report.contender] {
        println!(
            "{}: {}/{} successful",
            run.label,
            successful(&run.results),
            run.results.len()
        );
        print_table(quote_rows(&run.results));
    }
    print_timings(&report);
    Ok(())
}

fn summary_row(outcome: &TaskOutcome<CityAnomalySummary>) -> SummaryRow {
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_else(|| "-".into());
    match &outcome.result {
        Ok(s) => SummaryRow {
            city: s.city.clone(),
            n_days: s.n_days,
            period_start: date(s.period_start),
            period_end: date(s.period_end),
            rolling_anomalies: s.rolling_anomalies.to_string(),
            season_anomalies: s.season_anomalies.to_string(),
        },
        Err(failure) => SummaryRow {
            city: outcome.city.clone(),
            n_days: 0,
            period_start: "-".into(),
            period_end: "-".into(),
            rolling_anomalies: failure.to_string(),
            season_anomalies: "-".into(),
        },
    }
}

fn cmd_bench_batch(args: BenchBatchArgs, config: &AppConfig) -> Result<()> {
    let table = load_table(&args.input.csv)?;
    let cities = if args.cities.is_empty() {
        table.cities()
    } else {
        args.cities
    };
    let window = args.window.unwrap_or(config.analysis.window);
    let workers = args.workers.unwrap_or(config.analysis.workers);

    let report = run_batch_benchmark(&table, &cities, window, workers)?;
    for run in [&report.baseline, &report.contender] {
        println!("{}:", run.label);
        print_table(run.results.iter().map(summary_row).collect());
    }
    print_timings(&report);
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let level = match cli.log_level {
        Some(level) => level,
        None => config.logging.log_level()?,
    };
    logging::init_logger(level, config.logging.file.as_deref(), config.logging.timestamps)
        .context("failed to open log file")?;

    match cli.command {
        Commands::Cities(args) => cmd_cities(args),
        Commands::Analyze(args) => cmd_analyze(args, &config),
        Commands::Seasons(args) => cmd_seasons(args),
        Commands::Yearly(args) => cmd_yearly(args),
        Commands::Current(args) => cmd_current(args, &config),
        Commands::BenchLive(args) => cmd_bench_live(args, &config),
        Commands::BenchBatch(args) => cmd_bench_batch(args, &config),
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        logging::error(DataSource::System, None, &format!("{:#}", e));
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
