//! Spreadmap CLI binary.
//!
//! Reads a prices sheet and a quantities sheet and prints Hold/Actual
//! attribution tables, contribution matrices and reports.

use clap::{Args, Parser, Subcommand, ValueEnum};
use spreadmap::engine::MatrixMode;
use spreadmap::output::{
    ExportFormat, MatrixTable, PositionsTable, SpreadTable, StrategyTable,
};
use spreadmap::{Analysis, AppConfig};
use std::error::Error;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spreadmap")]
#[command(about = "Spreadmap: Hold vs Actual spread P/L attribution", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Input sheets and column selection shared by every command.
#[derive(Args)]
struct Input {
    /// Prices CSV (contracts as rows, dates as columns)
    #[arg(long)]
    prices: PathBuf,

    /// Quantities CSV with the same layout
    #[arg(long)]
    quantities: PathBuf,

    /// Start date column (default: earliest common column, or the one before --end)
    #[arg(long)]
    start: Option<String>,

    /// End date column (default: next common column after start)
    #[arg(long)]
    end: Option<String>,

    /// JSON config file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-contract Hold and Actual P/L
    Positions {
        #[command(flatten)]
        input: Input,
    },

    /// Hold vs Actual P/L of one spread (Cash/3M by default)
    Spread {
        #[command(flatten)]
        input: Input,

        /// Near leg label
        #[arg(long, requires = "far")]
        near: Option<String>,

        /// Far leg label
        #[arg(long, requires = "near")]
        far: Option<String>,
    },

    /// Strategy decomposition, waterfall and reconciliation
    Strategy {
        #[command(flatten)]
        input: Input,
    },

    /// Spread contribution matrix and ranked pairs
    Matrix {
        #[command(flatten)]
        input: Input,

        /// Which quantities feed the matrix
        #[arg(long, value_enum, default_value = "delta")]
        mode: ModeArg,

        /// Ranked pairs to list (default: from config)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Full report
    Report {
        #[command(flatten)]
        input: Input,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,

        /// Also write positions, pairs and matrices to this directory
        #[arg(long)]
        export_dir: Option<PathBuf>,

        /// Export file format
        #[arg(long, value_enum, default_value = "csv")]
        export_format: ExportArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Hold,
    Actual,
    Delta,
}

impl From<ModeArg> for MatrixMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Hold => Self::Hold,
            ModeArg::Actual => Self::Actual,
            ModeArg::Delta => Self::Delta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ExportArg {
    Csv,
    Json,
    PrettyJson,
}

impl From<ExportArg> for ExportFormat {
    fn from(format: ExportArg) -> Self {
        match format {
            ExportArg::Csv => Self::Csv,
            ExportArg::Json => Self::Json,
            ExportArg::PrettyJson => Self::PrettyJson,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Markdown,
    Json,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Logs go to stderr so tables and JSON on stdout stay clean.
fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<(), Box<dyn Error>> {
    match command {
        Commands::Positions { input } => {
            let (analysis, _) = load(&input)?;
            print_period(&analysis);
            print!(
                "{}",
                PositionsTable::new(&analysis.positions, &analysis.quantity_check)
            );
        }
        Commands::Spread { input, near, far } => {
            let (analysis, _) = load(&input)?;
            print_period(&analysis);
            let spread = match (near, far) {
                (Some(near), Some(far)) => Some(analysis.spread(&near.into(), &far.into())?),
                _ => analysis.cash_three_month.clone(),
            };
            print!("{}", SpreadTable::new(spread.as_ref()));
        }
        Commands::Strategy { input } => {
            let (analysis, _) = load(&input)?;
            print_period(&analysis);
            print!(
                "{}",
                StrategyTable::new(&analysis.decomposition, Some(&analysis.reconciliation))
            );
        }
        Commands::Matrix { input, mode, top } => {
            let (analysis, config) = load(&input)?;
            let mode = MatrixMode::from(mode);
            let ranked = analysis.ranked(mode);
            print_period(&analysis);
            print!(
                "{}",
                MatrixTable::new(
                    analysis.matrix(mode),
                    &ranked,
                    top.unwrap_or(config.output.top_pairs)
                )
            );
        }
        Commands::Report {
            input,
            format,
            export_dir,
            export_format,
        } => {
            let (analysis, config) = load(&input)?;
            match format {
                ReportFormat::Text => print_text_report(&analysis, &config),
                ReportFormat::Markdown => print_markdown_report(&analysis, &config),
                ReportFormat::Json => println!("{}", analysis.report()?.to_json()?),
            }

            if let Some(dir) = export_dir {
                for file in analysis.export(&dir, export_format.into())? {
                    eprintln!("Wrote {} to {}", file.name, file.path.display());
                }
            }
        }
    }

    Ok(())
}

fn load(input: &Input) -> Result<(Analysis, AppConfig), Box<dyn Error>> {
    let mut config = input
        .config
        .as_ref()
        .map_or_else(|| Ok(AppConfig::default()), AppConfig::from_file)?;
    if let Some(start) = &input.start {
        config.loader.start_column = Some(start.clone());
    }
    if let Some(end) = &input.end {
        config.loader.end_column = Some(end.clone());
    }
    tracing::debug!(?config, "resolved config");

    let analysis = Analysis::from_paths(&input.prices, &input.quantities, &config)?;
    if !analysis.defaulted.is_empty() {
        eprintln!(
            "Note: {} missing or unparseable cell(s) were treated as 0",
            analysis.defaulted.len()
        );
    }
    Ok((analysis, config))
}

fn print_period(analysis: &Analysis) {
    println!(
        "Period: {} to {} ({} contracts)",
        analysis.start,
        analysis.end,
        analysis.contracts.len()
    );
}

fn print_text_report(analysis: &Analysis, config: &AppConfig) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║{:^62}║", "SPREAD P/L ATTRIBUTION");
    println!("╚══════════════════════════════════════════════════════════════╝\n");
    print_period(analysis);

    print!(
        "{}",
        PositionsTable::new(&analysis.positions, &analysis.quantity_check)
    );
    print!("{}", SpreadTable::new(analysis.cash_three_month.as_ref()));
    print!(
        "{}",
        StrategyTable::new(&analysis.decomposition, Some(&analysis.reconciliation))
    );
    for mode in [MatrixMode::Hold, MatrixMode::Actual, MatrixMode::Delta] {
        let ranked = analysis.ranked(mode);
        print!(
            "{}",
            MatrixTable::new(analysis.matrix(mode), &ranked, config.output.top_pairs)
        );
    }
}

fn print_markdown_report(analysis: &Analysis, config: &AppConfig) {
    println!("# Spread P/L Attribution\n");
    println!(
        "**Period:** {} to {}\n",
        analysis.start, analysis.end
    );

    let positions = PositionsTable::new(&analysis.positions, &analysis.quantity_check);
    println!("{}", positions.to_markdown());
    println!(
        "{}",
        SpreadTable::new(analysis.cash_three_month.as_ref()).to_markdown()
    );
    println!(
        "{}",
        StrategyTable::new(&analysis.decomposition, Some(&analysis.reconciliation)).to_markdown()
    );
    for mode in [MatrixMode::Hold, MatrixMode::Actual, MatrixMode::Delta] {
        let ranked = analysis.ranked(mode);
        println!(
            "{}",
            MatrixTable::new(analysis.matrix(mode), &ranked, config.output.top_pairs)
                .to_markdown()
        );
    }
}
