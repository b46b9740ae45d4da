/// Lexicon Stats: learns a knowledge base from sample poems and reports
/// what it found.
///
/// Usage: lexicon_stats <FILE|DIR>... [--tags] [--top N]
use clap::Parser;
use std::path::PathBuf;
use std::process;

use poem_engine::core::generator::PoemGenerator;
use poem_engine::nlp::{ContractionTable, HeuristicParser, LexiconScorer};
use poem_engine::source::{Corpus, CorpusSource, DirectoryCorpus};
use poem_engine::GeneratorConfig;

#[derive(Parser)]
#[command(author, version, about = "Reports the tags, words and dependencies learned from sample poems")]
struct Cli {
    /// Text files or directories of *.txt files
    #[arg(required = true, value_name = "PATH")]
    inputs: Vec<PathBuf>,

    /// List every tag with its word count
    #[arg(long)]
    tags: bool,

    /// Example words shown per tag
    #[arg(long, default_value_t = 6)]
    top: usize,
}

fn load(inputs: &[PathBuf]) -> Corpus {
    let mut corpus = Corpus::new();
    let mut rng = rand::thread_rng();
    for path in inputs {
        if path.is_dir() {
            let texts = DirectoryCorpus::new(path).load(&mut rng).unwrap_or_else(|e| {
                eprintln!("Error reading '{}': {}", path.display(), e);
                process::exit(1);
            });
            corpus.extend(texts);
        } else {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading '{}': {}", path.display(), e);
                process::exit(1);
            });
            corpus.insert(path.display().to_string(), text);
        }
    }
    corpus
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let corpus = load(&cli.inputs);
    let (parser, scorer, expander) = (
        HeuristicParser,
        LexiconScorer::default(),
        ContractionTable::default(),
    );
    let config = GeneratorConfig::default();
    let mut generator = PoemGenerator::new(&parser, &scorer, &expander, &config);
    let templates = generator.learn_corpus(&corpus);

    let kb = generator.knowledge();
    println!("Texts:             {}", corpus.len());
    println!("Templates:         {}", templates);
    println!("Vocabulary:        {}", kb.vocabulary_len());
    println!("Tags:              {}", kb.tags().count());
    println!("Dependency edges:  {}", kb.dependency_edge_count());

    if cli.tags {
        let mut tags: Vec<_> = kb.tags().collect();
        tags.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)));
        println!();
        for (tag, words) in tags {
            let examples: Vec<&str> = words.iter().take(cli.top).map(String::as_str).collect();
            println!("{:<6} {:>5}  {}", tag, words.len(), examples.join(", "));
        }
    }
}
