use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use speechact_classifier::{features_from_analysis, ClassifierStack, ModelConfig};
use speechact_core::{CategoryListing, DEFAULT_MODEL_NAME};
use speechact_observability::{init_cli_tracing, AppMetrics};

#[derive(Debug, Parser)]
#[command(name = "speechact")]
#[command(about = "French dialogue act tagger")]
struct Cli {
    /// Directory of extra `.lex` / `.gaz` files merged over the built-in lexicon.
    #[arg(long, global = true, env = "SPEECHACT_MODEL_DIR")]
    model_dir: Option<PathBuf>,

    #[arg(long, global = true, env = "SPEECHACT_MODEL_NAME", default_value = DEFAULT_MODEL_NAME)]
    model_name: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Classify a single utterance.
    Classify {
        text: String,
        /// Restrict predictions to these labels. Repeatable.
        #[arg(long = "allow")]
        allow: Vec<String>,
        #[arg(long)]
        no_features: bool,
    },
    /// Classify one utterance per line from FILE, or stdin when omitted.
    Batch {
        file: Option<PathBuf>,
        #[arg(long = "allow")]
        allow: Vec<String>,
        #[arg(long)]
        no_features: bool,
    },
    /// Print the linguistic analysis of an utterance.
    Analyze { text: String },
    /// List the supported labels.
    Categories,
    /// Tag utterances typed on stdin until `exit`.
    Interactive,
}

fn main() -> Result<()> {
    init_cli_tracing("speechact_cli");
    let cli = Cli::parse();

    let config = ModelConfig {
        model_name: cli.model_name,
        model_dir: cli.model_dir,
    };

    match cli.command {
        Command::Classify {
            text,
            allow,
            no_features,
        } => {
            let stack = load_stack(&config)?;
            let result = stack.classify(&text, allowed(&allow), !no_features)?;
            print_json(&result)?;
        }
        Command::Batch {
            file,
            allow,
            no_features,
        } => {
            let texts = read_lines(file.as_ref())?;
            let stack = load_stack(&config)?;
            let result = stack.classify_batch(&texts, allowed(&allow), !no_features)?;
            print_json(&result)?;
        }
        Command::Analyze { text } => {
            let analysis = load_stack(&config)?.analyze(&text)?;
            print_json(&features_from_analysis(&analysis))?;
        }
        Command::Categories => print_json(&CategoryListing::supported())?,
        Command::Interactive => run_interactive(&load_stack(&config)?)?,
    }

    Ok(())
}

fn load_stack(config: &ModelConfig) -> Result<ClassifierStack> {
    let stack = ClassifierStack::load(config, AppMetrics::shared());
    if let Some(reason) = stack.load_error() {
        bail!("language model {} unavailable: {reason}", stack.model_name());
    }
    Ok(stack)
}

fn allowed(labels: &[String]) -> Option<&[String]> {
    (!labels.is_empty()).then_some(labels)
}

fn read_lines(file: Option<&PathBuf>) -> Result<Vec<String>> {
    let raw = match file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed reading {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed reading stdin")?;
            buffer
        }
    };
    Ok(raw.lines().map(ToString::to_string).collect())
}

fn run_interactive(stack: &ClassifierStack) -> Result<()> {
    println!("speechact interactive mode. type 'exit' to quit.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let utterance = line.trim();
        if utterance.eq_ignore_ascii_case("exit") || utterance.eq_ignore_ascii_case("quit") {
            break;
        }
        if utterance.is_empty() {
            continue;
        }

        let result = stack.classify(utterance, None, false)?;
        println!("{} ({:.1})", result.prediction, result.confidence);
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
