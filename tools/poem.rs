/// Poem: writes a poem from a directory of sample poems and a set of themes.
///
/// Usage: poem --corpus <DIR> (--themes a,b,c | --detections label:score,...)
///             [--sentences N] [--seed N] [--config <file.ron>] [--json]
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process;

use poem_engine::source::{DetectedThemes, Detection, FixedThemes};
use poem_engine::{GeneratorConfig, PoemEngine};

#[derive(Parser)]
#[command(author, version, about = "Generates a poem from sample poems and themes")]
struct Cli {
    /// Directory of sample poems (*.txt)
    #[arg(short, long, value_name = "DIR")]
    corpus: PathBuf,

    /// Comma-separated theme words
    #[arg(short, long, value_delimiter = ',')]
    themes: Vec<String>,

    /// Comma-separated detector output, e.g. dog:0.93,kite:0.71
    #[arg(short, long, value_delimiter = ',', value_parser = parse_detection, conflicts_with = "themes")]
    detections: Vec<Detection>,

    /// Sentences per poem (overrides the config)
    #[arg(short = 'n', long)]
    sentences: Option<usize>,

    #[arg(long)]
    seed: Option<u64>,

    /// Generator configuration (RON)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Sentiment lexicon (RON map of word: (polarity, subjectivity))
    #[arg(long, value_name = "FILE")]
    lexicon: Option<PathBuf>,

    /// Print {"name": ..., "poem": ...} instead of plain text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Response<'a> {
    name: &'a str,
    poem: &'a str,
}

fn parse_detection(s: &str) -> Result<Detection, String> {
    let (label, score) = s
        .rsplit_once(':')
        .ok_or_else(|| format!("expected label:score, got '{}'", s))?;
    let score: f64 = score
        .trim()
        .parse()
        .map_err(|_| format!("invalid score in '{}'", s))?;
    Ok(Detection::new(label, score))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => GeneratorConfig::load_from_ron(path).unwrap_or_else(|e| {
            eprintln!("Error loading config '{}': {}", path.display(), e);
            process::exit(1);
        }),
        None => GeneratorConfig::default(),
    };
    if let Some(n) = cli.sentences {
        config.num_sentences = n;
    }

    let mut builder = PoemEngine::builder().corpus_dir(&cli.corpus);
    builder = if cli.detections.is_empty() {
        builder.with_theme_source(FixedThemes::new(&cli.themes, config.max_themes))
    } else {
        builder.with_theme_source(DetectedThemes::new(cli.detections.clone(), config.max_themes))
    };
    if let Some(path) = &cli.lexicon {
        builder = builder.lexicon(path);
    }
    if let Some(seed) = cli.seed {
        builder = builder.seed(seed);
    }

    let mut engine = builder.with_config(config).build().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    let outcome = engine.run().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if cli.json {
        let response = Response {
            name: outcome.name(),
            poem: outcome.text(),
        };
        match serde_json::to_string_pretty(&response) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing response: {}", e);
                process::exit(1);
            }
        }
    } else {
        println!("{}\n", outcome.name());
        println!("{}", outcome.text());
    }
}
