use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use wof_graph::label::Labeler;
use wof_graph::store::{CachingStore, MultiStore};
use wof_graph::{index_paths, Assembler, Config, GraphAccumulator};

#[derive(Parser, Debug)]
#[command(name = "wof-graph")]
#[command(about = "Render parent and supersession relationships of Who's On First records as a Graphviz digraph")]
struct Args {
    /// Repositories to graph
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Config file (defaults to $WOF_GRAPH_CONFIG, then ./wof-graph.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// One or more filesystem sources used to read parent and related records (fs://<path> or a path)
    #[arg(long = "source")]
    sources: Vec<String>,

    /// One or more placetypes to exclude
    #[arg(long)]
    exclude: Vec<String>,

    /// One or more WOF IDs that a record should belong to
    #[arg(long)]
    belongs_to: Vec<i64>,

    /// Include supersedes relationships
    #[arg(long)]
    supersedes: bool,

    /// Include superseded_by relationships
    #[arg(long)]
    superseded_by: bool,

    /// Follow supersession relationships transitively
    #[arg(long)]
    recursive: bool,

    /// Exclude records that have ceased
    #[arg(long)]
    exclude_ceased: bool,

    /// Do not colour nodes
    #[arg(long)]
    no_style: bool,

    /// Number of records processed concurrently
    #[arg(long)]
    workers: Option<usize>,

    /// Number of fetched records kept in memory
    #[arg(long)]
    cache_capacity: Option<usize>,

    /// Log records that fail to load instead of aborting
    #[arg(long)]
    keep_going: bool,

    /// Currently only 'repo' is supported
    #[arg(long)]
    mode: Option<String>,
}

impl Args {
    /// Flags extend list settings and switch booleans on; they never turn a
    /// setting from the config file off, except --no-style and --keep-going.
    fn apply(&self, config: &mut Config) {
        config.graph.sources.extend(self.sources.iter().cloned());
        config.filter.exclude.extend(self.exclude.iter().cloned());
        config.filter.belongs_to.extend(self.belongs_to.iter().copied());
        config.filter.exclude_ceased |= self.exclude_ceased;
        config.relations.supersedes |= self.supersedes;
        config.relations.superseded_by |= self.superseded_by;
        config.relations.recursive |= self.recursive;

        if self.no_style {
            config.graph.styled = false;
        }
        if self.keep_going {
            config.graph.fail_fast = false;
        }
        if let Some(workers) = self.workers {
            config.graph.workers = workers;
        }
        if let Some(capacity) = self.cache_capacity {
            config.graph.cache_capacity = capacity;
        }
        if let Some(mode) = &self.mode {
            config.graph.mode = mode.clone();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the graph.
    env_logger::Builder::from_env(
        env_logger::Env::default()
            .filter_or("RUST_LOG", "info")
    ).init();

    let args = Args::parse();

    // Flags override the file, so validate after merging them.
    let mut config = Config::load(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    let mode = config.mode()?;

    let sources: Vec<String> = if config.graph.sources.is_empty() {
        args.paths
            .iter()
            .map(|p| mode.data_root(p).to_string_lossy().to_string())
            .collect()
    } else {
        config.graph.sources.clone()
    };
    log::info!("Record sources: {}", sources.join(", "));

    let stores = MultiStore::from_sources(&sources).context("Failed to open record sources")?;
    let store = Arc::new(CachingStore::new(stores, config.graph.cache_capacity));

    let graph = Arc::new(GraphAccumulator::new());
    let assembler = Arc::new(Assembler::new(
        store.clone(),
        config.filter_policy(),
        Labeler::new(config.graph.styled),
        config.relation_options(),
        Arc::clone(&graph),
    ));

    log::info!(
        "Walking {} path(s) with {} workers",
        args.paths.len(),
        config.graph.workers
    );
    let stats = index_paths(
        assembler,
        &args.paths,
        mode,
        config.graph.workers,
        config.graph.fail_fast,
    )
    .await?;

    let (hits, misses) = store.stats();
    log::info!("=== Graph Complete ===");
    log::info!("Files discovered: {}", stats.files);
    log::info!("  Added: {}", stats.added);
    log::info!("  Skipped (non-principal): {}", stats.skipped);
    log::info!("  Filtered: {}", stats.filtered);
    log::info!("  Failed: {}", stats.failed);
    log::info!("Nodes: {}, edges: {}", graph.node_count(), graph.edge_count());
    log::info!("Record cache: {} hits, {} misses", hits, misses);
    log::info!("Time: {:?}", stats.elapsed);

    if stats.failed > 0 {
        log::warn!("Some records failed to load. Check logs above for details.");
    }

    print!("{}", graph.to_dot());
    Ok(())
}
