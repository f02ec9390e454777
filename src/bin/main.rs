//! digitsvm command line interface
//!
//! The `run` subcommand reproduces the classic digit-recognizer pipeline
//! end to end; `train`, `predict`, `evaluate`, and `info` work with saved
//! model files so the expensive fit can be reused.

use clap::{Args, Parser, Subcommand, ValueEnum};
use digitsvm::core::Result;
use digitsvm::encode::LabelEncoder;
use digitsvm::metrics::ConfusionMatrix;
use digitsvm::model::MulticlassSvm;
use digitsvm::persistence::SavedModel;
use digitsvm::pipeline::{self, KernelChoice, PipelineConfig};
use digitsvm::{submission, OptimizerConfig, TestSet, TrainingSet};
use env_logger::Env;
use log::{error, info};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "digitsvm")]
#[command(about = "Handwritten digit classification with a polynomial-kernel SVM")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline: train, validate, refit, predict, write CSV
    Run(RunArgs),
    /// Train a model on a labeled CSV and save it
    Train(TrainArgs),
    /// Predict an unlabeled CSV with a saved model
    Predict(PredictArgs),
    /// Score a saved model against a labeled CSV
    Evaluate(EvaluateArgs),
    /// Display a saved model's summary
    Info(InfoArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum CliKernel {
    /// Plain dot product
    #[value(name = "linear")]
    Linear,
    /// (gamma * <x,y>)^degree with gamma = 1/n_pixels
    #[value(name = "polynomial")]
    Polynomial,
    /// exp(-gamma * ||x-y||^2) with gamma = 1/n_pixels
    #[value(name = "rbf")]
    Rbf,
}

/// Shared SVM hyperparameters.
#[derive(Args, Clone)]
struct SvmArgs {
    /// Kernel function
    #[arg(long, default_value = "polynomial")]
    kernel: CliKernel,

    /// Polynomial degree (polynomial kernel only)
    #[arg(long, default_value = "2")]
    degree: u32,

    /// Regularization parameter C
    #[arg(short = 'C', long, default_value = "1.0")]
    c: f64,

    /// Convergence tolerance
    #[arg(short, long, default_value = "0.001")]
    epsilon: f64,

    /// Maximum solver passes per binary machine
    #[arg(short, long, default_value = "10000")]
    max_iterations: usize,

    /// Kernel cache size in MB
    #[arg(long, default_value = "100")]
    cache_size: usize,

    /// Scale pixel intensities into [0, 1]
    #[arg(long)]
    normalize: bool,
}

impl SvmArgs {
    fn kernel_choice(&self) -> KernelChoice {
        match self.kernel {
            CliKernel::Linear => KernelChoice::Linear,
            CliKernel::Polynomial => KernelChoice::Polynomial {
                degree: self.degree,
            },
            CliKernel::Rbf => KernelChoice::Rbf,
        }
    }

    fn optimizer_config(&self) -> OptimizerConfig {
        OptimizerConfig {
            c: self.c,
            epsilon: self.epsilon,
            max_iterations: self.max_iterations,
            cache_size: self.cache_size * 1024 * 1024,
        }
    }
}

#[derive(Args)]
struct RunArgs {
    /// Labeled training CSV (label column first)
    #[arg(long, default_value = "Data/train.csv")]
    train: PathBuf,

    /// Unlabeled test CSV
    #[arg(long, default_value = "Data/test.csv")]
    test: PathBuf,

    /// Output submission CSV
    #[arg(short, long, default_value = "result.csv")]
    output: PathBuf,

    /// Fraction of training rows held out for validation
    #[arg(long, default_value = "0.2")]
    holdout_fraction: f64,

    /// Seed for the validation split
    #[arg(long, default_value = "0")]
    seed: u64,

    #[command(flatten)]
    svm: SvmArgs,
}

#[derive(Args)]
struct TrainArgs {
    /// Labeled training CSV (label column first)
    #[arg(long)]
    data: PathBuf,

    /// Output model file
    #[arg(short, long)]
    output: PathBuf,

    #[command(flatten)]
    svm: SvmArgs,
}

#[derive(Args)]
struct PredictArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Unlabeled test CSV
    #[arg(long)]
    data: PathBuf,

    /// Output submission CSV
    #[arg(short, long, default_value = "result.csv")]
    output: PathBuf,

    /// Scale pixel intensities into [0, 1] (use if the model was trained
    /// with --normalize)
    #[arg(long)]
    normalize: bool,
}

#[derive(Args)]
struct EvaluateArgs {
    /// Trained model file
    #[arg(short, long)]
    model: PathBuf,

    /// Labeled CSV to score against
    #[arg(long)]
    data: PathBuf,

    /// Show the per-class breakdown
    #[arg(long)]
    detailed: bool,

    /// Scale pixel intensities into [0, 1] (use if the model was trained
    /// with --normalize)
    #[arg(long)]
    normalize: bool,
}

#[derive(Args)]
struct InfoArgs {
    /// Model file
    model: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Run(args) => run_command(args),
        Commands::Train(args) => train_command(args),
        Commands::Predict(args) => predict_command(args),
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Info(args) => info_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(args: RunArgs) -> Result<()> {
    let config = PipelineConfig {
        train_path: args.train,
        test_path: args.test,
        output_path: args.output,
        holdout_fraction: args.holdout_fraction,
        seed: args.seed,
        kernel: args.svm.kernel_choice(),
        c: args.svm.c,
        epsilon: args.svm.epsilon,
        max_iterations: args.svm.max_iterations,
        cache_size: args.svm.cache_size * 1024 * 1024,
        normalize: args.svm.normalize,
    };

    let summary = pipeline::run(&config)?;

    println!("=== Pipeline Results ===");
    println!(
        "Training rows: {} ({} train / {} validation)",
        summary.n_train + summary.n_validation,
        summary.n_train,
        summary.n_validation
    );
    println!("Classes: {}", summary.n_classes);
    println!(
        "Validation accuracy: {:.2}%",
        summary.validation_accuracy * 100.0
    );
    println!(
        "Wrote {} predictions to {:?}",
        summary.n_predictions, summary.output_path
    );

    Ok(())
}

fn train_command(args: TrainArgs) -> Result<()> {
    info!("Loading training data from {:?}", args.data);
    let mut training = TrainingSet::from_file(&args.data)?;
    if args.svm.normalize {
        training.normalize();
    }
    info!(
        "Loaded {} images with {} pixels each",
        training.len(),
        training.dim()
    );

    let (encoder, classes) = LabelEncoder::fit_transform(training.labels())?;
    let kernel = args.svm.kernel_choice().resolve(training.dim());
    let config = args.svm.optimizer_config();

    let model = MulticlassSvm::new(kernel)
        .with_c(config.c)
        .with_epsilon(config.epsilon)
        .with_max_iterations(config.max_iterations)
        .with_cache_size(config.cache_size)
        .fit(training.images(), &classes)?;

    info!(
        "Trained {} machines with {} support vectors total",
        model.n_machines(),
        model.n_support_vectors()
    );

    let saved = SavedModel::from_trained(&model, &encoder, kernel, &config);
    saved.save_to_file(&args.output)?;
    info!("Model saved to {:?}", args.output);

    Ok(())
}

fn predict_command(args: PredictArgs) -> Result<()> {
    info!("Loading model from {:?}", args.model);
    let saved = SavedModel::load_from_file(&args.model)?;
    let (model, encoder) = saved.to_model()?;

    info!("Loading test data from {:?}", args.data);
    let mut test = TestSet::from_file(&args.data)?;
    if args.normalize {
        test.normalize();
    }

    let predicted_classes = model.predict_batch(test.images());
    let predicted_labels = encoder.decode_batch(&predicted_classes)?;

    submission::write_predictions_to_file(&args.output, &predicted_labels)?;
    println!(
        "Wrote {} predictions to {:?}",
        predicted_labels.len(),
        args.output
    );

    Ok(())
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    info!("Loading model from {:?}", args.model);
    let saved = SavedModel::load_from_file(&args.model)?;
    let (model, encoder) = saved.to_model()?;

    info!("Loading labeled data from {:?}", args.data);
    let mut labeled = TrainingSet::from_file(&args.data)?;
    if args.normalize {
        labeled.normalize();
    }

    let actual = encoder.transform(labeled.labels())?;
    let predicted = model.predict_batch(labeled.images());
    let matrix = ConfusionMatrix::from_pairs(model.n_classes(), &predicted, &actual)?;

    println!("=== Model Evaluation ===");
    saved.print_summary();

    println!("\nTest results:");
    println!("  Samples:  {}", matrix.total());
    println!("  Accuracy: {:.2}%", matrix.accuracy() * 100.0);

    if args.detailed {
        println!("\nPer-class breakdown:");
        for class in 0..model.n_classes() {
            let label = encoder.decode(class)?;
            println!(
                "  label {label}: precision {:.4}, recall {:.4}, f1 {:.4}",
                matrix.precision(class),
                matrix.recall(class),
                matrix.f1(class)
            );
        }
        println!("  Macro F1: {:.4}", matrix.macro_f1());
    }

    Ok(())
}

fn info_command(args: InfoArgs) -> Result<()> {
    info!("Loading model from {:?}", args.model);
    let saved = SavedModel::load_from_file(&args.model)?;

    saved.print_summary();

    println!("\nMachines:");
    for machine in &saved.machines {
        println!(
            "  {}v{}: {} support vectors, bias {:.6}",
            machine.positive,
            machine.negative,
            machine.support_vectors.len(),
            machine.bias
        );
    }

    Ok(())
}
