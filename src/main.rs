use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rustyrnn::prelude::*;
use std::error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Train a character-level LSTM language model on a text file and sample from it
#[derive(Parser, Debug)]
#[command(name = "rustyrnn", version, about)]
struct Args {
    /// Training text. Every non-empty line is one sequence
    #[arg(long)]
    text: String,

    /// JSON run configuration (model, training and generation sections)
    #[arg(long)]
    config: Option<String>,

    /// Write the trained parameters to this JSON file
    #[arg(long)]
    save: Option<String>,

    /// Load parameters from this JSON file before training
    #[arg(long)]
    load: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => RunConfig::from_path(path)?,
        None => RunConfig::default(),
    };

    let text = std::fs::read_to_string(&args.text)?;
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let vocabulary = Vocabulary::from_text(&text);
    info!(
        symbols = vocabulary.len(),
        sequences = lines.len(),
        "loaded training text"
    );

    let mut rnn = CharRnn::from_config(&config.model, vocabulary)?;
    if let Some(path) = &args.load {
        rnn.model_mut().load_from_path(path)?;
        info!(path = %path, "loaded parameters");
    }
    rnn.mode_learn(config.training.steps)?;
    rnn.mode_inference()?;

    let mut optimizer = config.training.optimizer.build()?;

    let progress_bar = ProgressBar::new(lines.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} | {msg}")?
            .progress_chars("█▓░"),
    );
    progress_bar.set_message("Training");

    for line in &lines {
        let sequence = Vocabulary::sequence_with_end(line);
        let history = rnn.learn(&sequence, config.training.iterations, optimizer.as_mut())?;
        if let (Some(cost), Some(perplexity)) = (history.cost.last(), history.perplexity.last()) {
            progress_bar.set_message(format!("cost {:.4} | perplexity {:.4}", cost, perplexity));
        }
        progress_bar.inc(1);
    }
    progress_bar.finish_with_message("Training finished");

    if let Some(path) = &args.save {
        rnn.model().save_to_path(path)?;
        info!(path = %path, "saved parameters");
    }

    let mut rng = match config.generation.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let prediction = rnn.predict(&config.generation, &mut rng)?;
    println!("Sampled: {:?}", prediction.sampled);
    println!("ArgMax: {:?}", prediction.greedy);

    Ok(())
}
