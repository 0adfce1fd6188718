//! CLI definition and dispatch.

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::console_report_adapter::ConsoleReportAdapter;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_table_adapter::CsvTableAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::config_validation::{
    parse_date, parse_optional, resolve_grid, validate_search_config,
};
use crate::domain::error::FracscanError;
use crate::domain::fracdiff::{self, ConvolutionMode, FracDiff, DEFAULT_WEIGHT_WINDOW};
use crate::domain::search::{self as search_engine, CancelToken, SearchConfig, SearchOutcome};
use crate::domain::stationarity::adf::{AdfConfig, Autolag};
use crate::domain::stationarity::kpss::{KpssConfig, KpssLags, KpssRegression};
use crate::domain::stationarity::{DualTestBattery, DEFAULT_SIGNIFICANCE};
use crate::domain::universe::{load_universe, parse_symbols};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;
use crate::ports::table_port::TablePort;

pub const DEFAULT_RESULTS_PATH: &str = "stock_analysis_results.csv";
pub const DEFAULT_CSV_DIR: &str = "data";

#[derive(Parser, Debug)]
#[command(
    name = "fracscan",
    about = "Find the minimal fractional differencing order that makes every window stationary"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the stationarity search
    Search {
        #[arg(short, long)]
        config: PathBuf,
        /// Result table path (overrides [output] results_path)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Search a single symbol instead of [search] symbols
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
        /// Worker threads, 0 for one per core
        #[arg(long)]
        threads: Option<usize>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a search configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Print the fractional differencing weights for an order
    Weights {
        #[arg(long)]
        d: f64,
        #[arg(long, default_value_t = DEFAULT_WEIGHT_WINDOW)]
        size: usize,
    },
    /// List symbols available in the CSV directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub output: Option<PathBuf>,
    pub symbol: Option<String>,
    pub csv_dir: Option<PathBuf>,
    pub threads: Option<usize>,
}

/// Everything a search run needs, resolved from config and overrides.
#[derive(Debug, Clone)]
pub struct SearchPlan {
    pub symbols: Vec<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub search: SearchConfig,
    pub battery: DualTestBattery,
    pub threads: usize,
    pub csv_dir: PathBuf,
    pub results_path: PathBuf,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Search {
            config,
            output,
            symbol,
            csv_dir,
            threads,
            dry_run,
        } => {
            let overrides = Overrides {
                output,
                symbol,
                csv_dir,
                threads,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_search(&config, &overrides)
            }
        }
        Command::Validate { config } => run_validate(&config),
        Command::Weights { d, size } => run_weights(d, size),
        Command::ListSymbols { config, csv_dir } => run_list_symbols(&config, csv_dir),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        error!("{err}");
        ExitCode::from(&err)
    })
}

fn fail(err: FracscanError) -> ExitCode {
    error!("{err}");
    ExitCode::from(&err)
}

pub fn build_search_config(config: &dyn ConfigPort) -> Result<SearchConfig, FracscanError> {
    let window_length = parse_optional::<usize>(config, "search", "window_length")?
        .ok_or_else(|| FracscanError::missing("search", "window_length"))?;
    let weight_window = parse_optional(config, "fracdiff", "weight_window")?
        .unwrap_or(DEFAULT_WEIGHT_WINDOW);
    let mode = parse_optional(config, "fracdiff", "mode")?.unwrap_or(ConvolutionMode::Valid);

    Ok(SearchConfig {
        window_length,
        d_grid: resolve_grid(config)?,
        fracdiff: FracDiff::new(weight_window, mode),
    })
}

pub fn build_battery(config: &dyn ConfigPort) -> Result<DualTestBattery, FracscanError> {
    Ok(DualTestBattery {
        adf: AdfConfig {
            autolag: parse_optional(config, "adf", "autolag")?.unwrap_or(Autolag::Aic),
            max_lag: parse_optional(config, "adf", "max_lag")?,
        },
        kpss: KpssConfig {
            regression: parse_optional(config, "kpss", "regression")?
                .unwrap_or(KpssRegression::Level),
            lags: parse_optional(config, "kpss", "nlags")?.unwrap_or(KpssLags::Auto),
        },
        significance: parse_optional(config, "search", "significance")?
            .unwrap_or(DEFAULT_SIGNIFICANCE),
    })
}

pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, FracscanError> {
    let raw = match symbol_override {
        Some(s) => s.to_string(),
        None => config
            .get_string("search", "symbols")
            .ok_or_else(|| FracscanError::missing("search", "symbols"))?,
    };
    parse_symbols(&raw).map_err(|e| FracscanError::invalid("search", "symbols", e.to_string()))
}

/// Validates `config` and resolves it into a runnable plan.
pub fn build_plan(
    config: &dyn ConfigPort,
    overrides: &Overrides,
) -> Result<SearchPlan, FracscanError> {
    validate_search_config(config)?;

    let csv_dir = overrides
        .csv_dir
        .clone()
        .or_else(|| config.get_string("data", "csv_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_DIR));
    let results_path = overrides
        .output
        .clone()
        .or_else(|| config.get_string("output", "results_path").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_RESULTS_PATH));
    let threads = match overrides.threads {
        Some(t) => t,
        None => parse_optional(config, "search", "threads")?.unwrap_or(0),
    };

    Ok(SearchPlan {
        symbols: resolve_symbols(overrides.symbol.as_deref(), config)?,
        start_date: parse_date(config, "start_date")?,
        end_date: parse_date(config, "end_date")?,
        search: build_search_config(config)?,
        battery: build_battery(config)?,
        threads,
        csv_dir,
        results_path,
    })
}

/// Loads data, searches, writes the table and reports every configured symbol.
pub fn run_search_pipeline(
    plan: &SearchPlan,
    data_port: &dyn DataPort,
    table_port: &dyn TablePort,
    report_port: &dyn ReportPort,
    cancel: &CancelToken,
) -> Result<SearchOutcome, FracscanError> {
    let universe = load_universe(data_port, &plan.symbols, plan.start_date, plan.end_date);
    if universe.count() == 0 {
        warn!("no symbol could be loaded");
    }

    info!(
        symbols = universe.count(),
        grid = plan.search.d_grid.len(),
        window_length = plan.search.window_length,
        threads = plan.threads,
        "starting search"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(plan.threads)
        .build()
        .map_err(|e| FracscanError::Io(std::io::Error::other(e)))?;
    let outcome = pool.install(|| {
        search_engine::search(&universe.series, &plan.search, &plan.battery, cancel)
    });
    if outcome.cancelled {
        warn!("search cancelled; results are partial");
    }

    let output = plan.results_path.display().to_string();
    table_port.write_table(&outcome.table, &output)?;
    info!(rows = outcome.table.len(), path = %output, "results written");

    let answers: Vec<_> = plan
        .symbols
        .iter()
        .map(|s| (s.clone(), outcome.optimal_for(s)))
        .collect();
    report_port.report_all(&answers)?;

    Ok(outcome)
}

fn run_search(config_path: &PathBuf, overrides: &Overrides) -> ExitCode {
    info!("loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let plan = match build_plan(&config, overrides) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };

    let data_port = CsvAdapter::new(plan.csv_dir.clone());
    let report_port = ConsoleReportAdapter::stdout();
    match run_search_pipeline(
        &plan,
        &data_port,
        &CsvTableAdapter,
        &report_port,
        &CancelToken::new(),
    ) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

fn print_plan(plan: &SearchPlan) {
    let grid = plan.search.d_grid.values();
    eprintln!("\nSearch plan:");
    eprintln!("  symbols:       {}", plan.symbols.join(", "));
    eprintln!("  date range:    {} to {}", plan.start_date, plan.end_date);
    eprintln!("  window_length: {}", plan.search.window_length);
    eprintln!(
        "  d grid:        {} values, {} to {}",
        grid.len(),
        grid.first().copied().unwrap_or_default(),
        grid.last().copied().unwrap_or_default()
    );
    eprintln!(
        "  fracdiff:      weight_window={} mode={}",
        plan.search.fracdiff.weight_window, plan.search.fracdiff.mode
    );
    eprintln!(
        "  adf:           autolag={} max_lag={}",
        plan.battery.adf.autolag,
        plan.battery
            .adf
            .max_lag
            .map_or_else(|| "auto".to_string(), |m| m.to_string())
    );
    eprintln!(
        "  kpss:          regression={} nlags={}",
        plan.battery.kpss.regression, plan.battery.kpss.lags
    );
    eprintln!("  significance:  {}", plan.battery.significance);
    eprintln!("  csv_dir:       {}", plan.csv_dir.display());
    eprintln!("  results_path:  {}", plan.results_path.display());
}

pub fn run_dry_run(config_path: &PathBuf, overrides: &Overrides) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let plan = match build_plan(&config, overrides) {
        Ok(p) => p,
        Err(e) => return fail(e),
    };
    print_plan(&plan);
    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    match build_plan(&config, &Overrides::default()) {
        Ok(plan) => {
            print_plan(&plan);
            eprintln!("\nSearch configuration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_weights(d: f64, size: usize) -> ExitCode {
    if !d.is_finite() || d < 0.0 {
        return fail(FracscanError::invalid("weights", "d", "d must be a non-negative number"));
    }
    let weights = fracdiff::filter_weights(d, size);
    for (k, w) in weights.iter().enumerate() {
        println!("{k}\t{w:.10}");
    }
    eprintln!("{} weights (filter order {})", weights.len(), weights.len() - 1);
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf, csv_dir: Option<PathBuf>) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    let csv_dir = csv_dir
        .or_else(|| config.get_string("data", "csv_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CSV_DIR));

    let adapter = CsvAdapter::new(csv_dir.clone());
    let symbols = match adapter.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(e),
    };

    if symbols.is_empty() {
        eprintln!("No symbols found in {}", csv_dir.display());
        return ExitCode::SUCCESS;
    }
    for symbol in &symbols {
        match adapter.get_data_range(symbol) {
            Ok(Some((first, last, count))) => {
                println!("{symbol}: {count} rows, {first} to {last}");
            }
            Ok(None) => println!("{symbol}: no rows"),
            Err(e) => warn!(symbol = symbol.as_str(), error = %e, "unreadable"),
        }
    }
    eprintln!("{} symbols found", symbols.len());
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const BASE: &str = "[search]\n\
        symbols = aapl, ibm\n\
        start_date = 2014-01-01\n\
        end_date = 2024-01-01\n\
        window_length = 30\n\
        d_values = 0.0, 0.5, 1.0\n";

    #[test]
    fn plan_uses_defaults() {
        let plan = build_plan(&config(BASE), &Overrides::default()).unwrap();
        assert_eq!(plan.symbols, vec!["AAPL", "IBM"]);
        assert_eq!(plan.search.window_length, 30);
        assert_eq!(plan.search.d_grid.values(), &[0.0, 0.5, 1.0]);
        assert_eq!(plan.search.fracdiff, FracDiff::default());
        assert_eq!(plan.battery, DualTestBattery::default());
        assert_eq!(plan.threads, 0);
        assert_eq!(plan.csv_dir, PathBuf::from(DEFAULT_CSV_DIR));
        assert_eq!(plan.results_path, PathBuf::from(DEFAULT_RESULTS_PATH));
    }

    #[test]
    fn plan_reads_optional_sections() {
        let content = format!(
            "{BASE}significance = 0.01\nthreads = 2\n\n[fracdiff]\nweight_window = 5\nmode = same\n\n\
             [adf]\nautolag = t-stat\nmax_lag = 4\n\n[kpss]\nregression = ct\nnlags = 3\n\n\
             [data]\ncsv_dir = prices\n\n[output]\nresults_path = out.csv\n"
        );
        let plan = build_plan(&config(&content), &Overrides::default()).unwrap();
        assert_eq!(plan.search.fracdiff, FracDiff::new(5, ConvolutionMode::Same));
        assert_eq!(plan.battery.adf.autolag, Autolag::TStat);
        assert_eq!(plan.battery.adf.max_lag, Some(4));
        assert_eq!(plan.battery.kpss.regression, KpssRegression::Trend);
        assert_eq!(plan.battery.kpss.lags, KpssLags::Fixed(3));
        assert_eq!(plan.battery.significance, 0.01);
        assert_eq!(plan.threads, 2);
        assert_eq!(plan.csv_dir, PathBuf::from("prices"));
        assert_eq!(plan.results_path, PathBuf::from("out.csv"));
    }

    #[test]
    fn overrides_take_precedence() {
        let overrides = Overrides {
            output: Some(PathBuf::from("override.csv")),
            symbol: Some("spy".into()),
            csv_dir: Some(PathBuf::from("elsewhere")),
            threads: Some(1),
        };
        let plan = build_plan(&config(BASE), &overrides).unwrap();
        assert_eq!(plan.symbols, vec!["SPY"]);
        assert_eq!(plan.results_path, PathBuf::from("override.csv"));
        assert_eq!(plan.csv_dir, PathBuf::from("elsewhere"));
        assert_eq!(plan.threads, 1);
    }

    #[test]
    fn invalid_config_is_rejected_before_resolution() {
        let content = BASE.replace("window_length = 30", "window_length = 0");
        let err = build_plan(&config(&content), &Overrides::default()).unwrap_err();
        assert!(matches!(err, FracscanError::ConfigInvalid { key, .. } if key == "window_length"));
    }

    #[test]
    fn cli_parses_search_flags() {
        let cli = Cli::try_parse_from([
            "fracscan", "search", "-c", "cfg.ini", "--symbol", "AAPL", "--threads", "4",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Command::Search {
                config,
                symbol,
                threads,
                dry_run,
                ..
            } => {
                assert_eq!(config, PathBuf::from("cfg.ini"));
                assert_eq!(symbol.as_deref(), Some("AAPL"));
                assert_eq!(threads, Some(4));
                assert!(dry_run);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn cli_parses_weights_with_default_size() {
        let cli = Cli::try_parse_from(["fracscan", "weights", "--d", "0.4"]).unwrap();
        assert!(matches!(cli.command, Command::Weights { d, size } if d == 0.4 && size == 10));
    }
}
