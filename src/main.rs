//! Query 5 CLI

use clap::{Parser, Subcommand, ValueEnum};
use query5::config::DEFAULT_MORSEL_SIZE;
use query5::execution::print_results;
use query5::output::write_results;
use query5::{
    ExecutionConfig, ExecutionContext, Partitioning, Query5Params, TableFormat, TpchGenerator,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::error;

#[derive(Parser)]
#[command(name = "query5")]
#[command(about = "Parallel TPC-H Query 5 (local supplier volume)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the query over tables on disk and write the ranked result
    Run {
        /// Region name to match exactly (e.g. ASIA)
        #[arg(long = "r_name")]
        r_name: String,

        /// First order date included (YYYY-MM-DD)
        #[arg(long = "start_date")]
        start_date: String,

        /// First order date excluded (YYYY-MM-DD)
        #[arg(long = "end_date")]
        end_date: String,

        /// Number of worker threads
        #[arg(long)]
        threads: usize,

        /// Directory holding region, nation, customer, supplier, orders, lineitem
        #[arg(long = "table_path")]
        table_path: PathBuf,

        /// File to write `NATION|revenue` lines to
        #[arg(long = "result_path")]
        result_path: PathBuf,

        /// On-disk table format
        #[arg(long, value_enum, default_value = "tbl")]
        format: FormatArg,

        /// Pull fixed-size morsels from a shared queue instead of one range per thread
        #[arg(long)]
        morsel: bool,

        /// Line items per morsel (implies --morsel)
        #[arg(long = "morsel-size")]
        morsel_size: Option<usize>,

        /// Also print the result table and timings
        #[arg(long)]
        print: bool,
    },

    /// Generate synthetic TPC-H data for the six Q5 relations
    Generate {
        /// Scale factor (0.01 = 60K line items, 1 = 6M line items)
        #[arg(short, long, default_value = "0.01")]
        sf: f64,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// On-disk table format
        #[arg(long, value_enum, default_value = "tbl")]
        format: FormatArg,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Tbl,
    Parquet,
}

impl From<FormatArg> for TableFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Tbl => TableFormat::Tbl,
            FormatArg::Parquet => TableFormat::Parquet,
        }
    }
}

fn main() -> ExitCode {
    // Set up logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let outcome = match cli.command {
        Commands::Run {
            r_name,
            start_date,
            end_date,
            threads,
            table_path,
            result_path,
            format,
            morsel,
            morsel_size,
            print,
        } => run(RunArgs {
            r_name,
            start_date,
            end_date,
            threads,
            table_path,
            result_path,
            format: format.into(),
            morsel_size: match (morsel, morsel_size) {
                (_, Some(size)) => Some(size),
                (true, None) => Some(DEFAULT_MORSEL_SIZE),
                (false, None) => None,
            },
            print,
        }),

        Commands::Generate {
            sf,
            output,
            format,
            seed,
        } => {
            let start = Instant::now();
            TpchGenerator::with_seed(sf, seed)
                .generate_to(&output, format.into())
                .map(|_| {
                    println!(
                        "Generated SF={} data in {} in {:?}",
                        sf,
                        output.display(),
                        start.elapsed()
                    );
                })
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

struct RunArgs {
    r_name: String,
    start_date: String,
    end_date: String,
    threads: usize,
    table_path: PathBuf,
    result_path: PathBuf,
    format: TableFormat,
    morsel_size: Option<usize>,
    print: bool,
}

fn run(args: RunArgs) -> query5::Result<()> {
    // Validate everything before touching the tables
    let params = Query5Params::try_new(args.r_name, args.start_date, args.end_date)?;
    let mut config = ExecutionConfig::try_new(args.threads)?;
    if let Some(morsel_size) = args.morsel_size {
        config = config.with_partitioning(Partitioning::Morsel { morsel_size })?;
    }

    let mut ctx = ExecutionContext::new().with_config(config);
    ctx.load_tables(&args.table_path, args.format)?;

    let result = ctx.query5(&params)?;
    write_results(&args.result_path, &result.rows)?;

    if args.print {
        print_results(&result)?;
    }
    Ok(())
}
