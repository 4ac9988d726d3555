//! gpemu CLI: design of experiments datasets and training summaries

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::{Builder, Env};
use gpemu::functions::TestFunction;
use gpemu::{Dataset, DesignKind, SplitParams, TrainingSummary};
use linfa::ParamGuard;
use log::info;
use ndarray::Array1;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gpemu")]
#[command(version)]
#[command(about = "Gaussian process emulators toolbox")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a test function over a design of experiments and write the splits as .npy files
    Design {
        /// Sampling strategy: srs, lhs or sobol
        #[arg(short, long, default_value = "lhs")]
        kind: DesignKind,

        /// Input dimension, defaults to the test function dimension
        #[arg(short, long)]
        dim: Option<usize>,

        /// Number of training points
        #[arg(long, default_value = "20")]
        n_train: usize,

        /// Number of validation points
        #[arg(long, default_value = "0")]
        n_val: usize,

        /// Number of test points
        #[arg(long, default_value = "0")]
        n_test: usize,

        /// Seed of the sampler
        #[arg(short, long)]
        seed: Option<u64>,

        /// Lower bounds, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        lower: Option<Vec<f64>>,

        /// Upper bounds, comma separated
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        upper: Option<Vec<f64>>,

        /// Test function: forrester, xsinx or branin
        #[arg(short, long, default_value = "forrester")]
        function: TestFunction,

        /// Output directory
        #[arg(short, long)]
        outdir: PathBuf,
    },

    /// Print a training summary saved as json
    Summary {
        /// Path to the summary file
        file: PathBuf,
    },
}

fn design(
    kind: DesignKind,
    dim: Option<usize>,
    counts: (usize, usize, usize),
    seed: Option<u64>,
    bounds: (Option<Vec<f64>>, Option<Vec<f64>>),
    function: TestFunction,
    outdir: PathBuf,
) -> Result<()> {
    let dim = dim.unwrap_or_else(|| function.dim());
    anyhow::ensure!(
        dim == function.dim(),
        "{function} function expects inputs of dimension {}, got {dim}",
        function.dim()
    );
    let (n_train, n_val, n_test) = counts;
    let (default_lower, default_upper) = function.bounds();
    let lower = bounds.0.unwrap_or(default_lower);
    let upper = bounds.1.unwrap_or(default_upper);

    let mut params = SplitParams::new(dim, n_train)
        .n_val(n_val)
        .n_test(n_test)
        .kind(kind)
        .bounds(Array1::from(lower), Array1::from(upper));
    if let Some(seed) = seed {
        params = params.seed(seed);
    }
    let params = params.check()?;
    let dataset = Dataset::build_from_function(|x| function.eval(x), &params)?;
    dataset
        .write_npy(&outdir)
        .with_context(|| format!("cannot write dataset in {}", outdir.display()))?;
    info!(
        "{} dataset of {function} ({n_train} train, {n_val} val, {n_test} test) written in {}",
        kind,
        outdir.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let env = Env::new().filter_or("GPEMU_LOG", "info");
    Builder::from_env(env)
        .target(env_logger::Target::Stdout)
        .try_init()
        .ok();

    let cli = Cli::parse();
    match cli.command {
        Commands::Design {
            kind,
            dim,
            n_train,
            n_val,
            n_test,
            seed,
            lower,
            upper,
            function,
            outdir,
        } => design(
            kind,
            dim,
            (n_train, n_val, n_test),
            seed,
            (lower, upper),
            function,
            outdir,
        ),
        Commands::Summary { file } => {
            let summary = TrainingSummary::<f64>::from_file(&file)
                .with_context(|| format!("cannot read training summary {}", file.display()))?;
            print!("{summary}");
            Ok(())
        }
    }
}
