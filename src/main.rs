use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sift::cache::{CacheBlob, INDEX_CACHE_KEY};
use sift::engine::{EngineHandle, Providers, SearchEngine};
use sift::{FileStore, InvertedIndex, ResultPage, Settings, Vault};

mod cli;
use cli::display::{self, BLUE, BOLD, CYAN, DIM, GRAY};
use cli::{Cli, Commands};

const CACHE_DIR: &str = ".sift";

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("SIFT_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("sift=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Index {
            vault,
            cache,
            settings,
        } => run_index(&vault, cache, settings.as_deref()),
        Commands::Search {
            vault,
            query,
            limit,
            single,
            json,
            cache,
            settings,
        } => run_search(&vault, &query, limit, single.as_deref(), json, cache, settings.as_deref()),
        Commands::Inspect { file } => run_inspect(&file),
    }
}

fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let Some(path) = path else {
        return Ok(Settings::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("settings {} is not valid JSON", path.display()))?;
    Ok(Settings::load_or_default(&value))
}

fn open_engine(vault: &Path, cache: Option<PathBuf>, settings: Option<&Path>) -> Result<SearchEngine> {
    let settings = load_settings(settings)?;
    let vault = Vault::open(vault).context("failed to open vault")?;
    let cache_dir = cache.unwrap_or_else(|| vault.root().join(CACHE_DIR));
    let store = FileStore::open(&cache_dir)
        .with_context(|| format!("failed to open cache {}", cache_dir.display()))?;
    Ok(SearchEngine::new(
        settings,
        Providers::from_one(Arc::new(vault)),
        Arc::new(store),
    ))
}

fn run_index(vault: &Path, cache: Option<PathBuf>, settings: Option<&Path>) -> Result<()> {
    let engine = open_engine(vault, cache, settings)?;
    let started = Instant::now();

    #[cfg(feature = "parallel")]
    let report = engine.full_reindex_with_progress(&sift::engine::bulk::reindex_progress_bar(0));
    #[cfg(not(feature = "parallel"))]
    let report = engine.full_reindex();

    let elapsed = started.elapsed().as_secs_f64() * 1000.0;
    display::section_top("INDEX");
    display::row(&format!(" documents  {}", report.indexed));
    display::row(&format!(" skipped    {}", report.skipped));
    display::row(&format!(" terms      {}", engine.term_count()));
    display::row(&format!(" time       {}", display::timing_ms(elapsed)));
    display::section_bot();
    Ok(())
}

fn run_search(
    vault: &Path,
    query: &str,
    limit: usize,
    single: Option<&str>,
    json: bool,
    cache: Option<PathBuf>,
    settings: Option<&Path>,
) -> Result<()> {
    let handle = EngineHandle::new(open_engine(vault, cache, settings)?);
    let engine = handle.ensure_initialized();

    let started = Instant::now();
    let parsed = engine.parse_query(query);
    let mut results = engine.search(&parsed, single);
    let elapsed = started.elapsed().as_secs_f64() * 1000.0;
    results.truncate(limit);

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }
    print_results(query, &results, elapsed);
    Ok(())
}

fn print_results(query: &str, results: &[ResultPage], elapsed: f64) {
    display::section_top(&format!("\"{}\"", query));
    display::row(&format!(
        " {} results in {}",
        results.len(),
        display::timing_ms(elapsed)
    ));
    if results.is_empty() {
        display::section_bot();
        return;
    }
    for page in results {
        display::row("");
        let id = display::truncate_path(&page.document.id, display::BOX_WIDTH - 14);
        display::row(&format!(
            " {} {}",
            display::score_value(page.score),
            display::themed(BLUE, &[BOLD], &id)
        ));
        for excerpt in &page.excerpts {
            for line in display::render_excerpt(&excerpt.excerpt) {
                for wrapped in display::wrap(&line, display::BOX_WIDTH - 4) {
                    display::row(&format!("   {}", wrapped));
                }
            }
        }
        if !page.found_words.is_empty() {
            display::row(&format!(
                "   {}",
                display::themed(GRAY, &[DIM], &page.found_words.join(", "))
            ));
        }
    }
    display::section_bot();
}

fn run_inspect(file: &Path) -> Result<()> {
    let path = if file.is_dir() {
        file.join(format!("{}.bin", INDEX_CACHE_KEY))
    } else {
        file.to_path_buf()
    };
    let bytes = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let blob = CacheBlob::decode(&bytes).context("not a valid sift cache")?;

    display::section_top("CACHE");
    display::row(&format!(" file       {}", path.display()));
    display::row(&format!(" size       {}", display::format_size(bytes.len())));
    display::row(&format!(
        " schema     v{}{}",
        blob.schema_version.as_u8(),
        if blob.schema_version.is_current() {
            String::new()
        } else {
            display::themed(GRAY, &[], " (outdated, will be rebuilt)")
        }
    ));
    display::row(&format!(
        " payload    {}",
        display::format_size(blob.serialized_index.len())
    ));

    if blob.schema_version.is_current() {
        let index = InvertedIndex::restore(&blob.serialized_index, Default::default())
            .context("cache payload is not a valid index")?;
        display::row(&format!(
            " documents  {}",
            display::themed(CYAN, &[BOLD], &index.len().to_string())
        ));
        display::row(&format!(" terms      {}", index.term_count()));
    }
    display::section_bot();
    Ok(())
}
