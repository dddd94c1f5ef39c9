use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};
use warta_core::corpus::load_raw_articles;
use warta_core::{HybridRanker, Language, Method, Model, ModelStore, Normalizer};

#[derive(Parser)]
#[command(name = "warta-indexer")]
#[command(about = "Build and query hybrid TF-IDF/BM25 article snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a snapshot from scraped articles (always a full rebuild)
    Build {
        /// Input path (JSON/JSONL file or directory)
        #[arg(long)]
        input: PathBuf,
        /// Snapshot file to write
        #[arg(long, default_value = "model/snapshot.bin")]
        output: PathBuf,
        #[arg(long, default_value_t = Language::Indonesian)]
        language: Language,
    },
    /// Rank articles in an existing snapshot
    Search {
        #[arg(long, default_value = "model/snapshot.bin")]
        snapshot: PathBuf,
        #[arg(long)]
        query: String,
        /// Weight of content relevance against popularity
        #[arg(long, default_value_t = 0.7)]
        alpha: f32,
        #[arg(long, default_value_t = Method::Tfidf)]
        method: Method,
        #[arg(long, default_value_t = warta_core::DEFAULT_TOP_K)]
        k: usize,
        #[arg(long, default_value_t = Language::Indonesian)]
        language: Language,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, language } => build(&input, output, language),
        Commands::Search { snapshot, query, alpha, method, k, language } => {
            search(snapshot, &query, alpha, method, k, language)
        }
    }
}

fn build(input: &std::path::Path, output: PathBuf, language: Language) -> Result<()> {
    let raw = load_raw_articles(input)?;
    let model = Model::build(raw, &Normalizer::new(language));
    let store = ModelStore::new(&output).with_language(language);
    store.save(&model)?;
    tracing::info!(
        output = %output.display(),
        num_docs = model.num_docs(),
        tfidf_terms = model.tfidf.vocab().len(),
        bm25_terms = model.bm25.vocab().len(),
        "snapshot build complete"
    );
    Ok(())
}

fn search(snapshot: PathBuf, query: &str, alpha: f32, method: Method, k: usize, language: Language) -> Result<()> {
    let store = ModelStore::new(&snapshot).with_language(language);
    let model = store.load().with_context(|| {
        format!(
            "no usable {language} snapshot at {}; run `build --language {language}` first",
            snapshot.display()
        )
    })?;
    let normalizer = Normalizer::new(language);
    let results = HybridRanker::new(&model, &normalizer).rank_top(query, alpha, method, k)?;
    for (rank, hit) in results.iter().enumerate() {
        println!(
            "{:>2}. {} <{}>\n    content {:.3} | akses {} kali | skor {:.3}",
            rank + 1,
            hit.title,
            hit.url,
            hit.content_score,
            hit.access_count,
            hit.combined_score
        );
    }
    Ok(())
}
