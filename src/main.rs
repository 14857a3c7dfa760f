use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use netprox::config::Config;
use netprox::graph::algorithms;
use netprox::metrics::{self, Metric, ScoreMap, ScoringContext};
use netprox::progress::LogProgress;
use netprox::{data, ranking, storage, ArtifactCache, SeedPartition};

#[derive(Parser, Debug)]
#[clap(
    name = "netprox",
    about = "Score proteins by network proximity to an adverse-event seed set"
)]
struct Cli {
    /// Interaction network as an edge list (two identifiers per line)
    #[clap(long)]
    edges: PathBuf,

    /// Seed proteins, one identifier per line
    #[clap(long)]
    seeds: PathBuf,

    /// Label used in output file names (e.g. the adverse event)
    #[clap(long)]
    label: String,

    /// Metric to compute (repeatable: mfpt, bc, sn, isp); all by default
    #[clap(long = "metric")]
    metrics: Vec<Metric>,

    /// Drug-target pairs (drug and target per line); scores each drug by its best target
    #[clap(long)]
    drug_targets: Option<PathBuf>,

    /// Output directory for score files
    #[clap(long, default_value = "results")]
    output_dir: PathBuf,

    /// Directory for stored intermediate artifacts
    #[clap(long, default_value = "stored_vals")]
    cache_dir: PathBuf,

    /// Do not read or write stored artifacts
    #[clap(long)]
    no_cache: bool,

    /// Remove this network's stored artifacts before running
    #[clap(long)]
    clear_cache: bool,

    /// Recompute metrics even if a score file already exists
    #[clap(long)]
    recompute: bool,

    /// Use the network as given instead of its largest connected component
    #[clap(long)]
    no_lcc: bool,

    /// Sources between two progress lines
    #[clap(long, default_value = "500")]
    progress_every: usize,

    /// Number of worker threads (0 = use all available cores)
    #[clap(long, default_value = "0")]
    threads: usize,

    /// Verbose logging
    #[clap(long, short)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        let metrics = if self.metrics.is_empty() {
            Metric::ALL.to_vec()
        } else {
            self.metrics.clone()
        };

        Config {
            progress_interval: self.progress_every,
            largest_component: !self.no_lcc,
            ..Config::new(&self.cache_dir, &self.output_dir, metrics, self.threads)
        }
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp_millis()
        .init();

    let config = args.config();

    let num_threads = config.worker_threads();
    log::info!("Using {} worker threads", num_threads);
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;

    log::info!("Scoring network proximity for {}", args.label);
    std::fs::create_dir_all(&config.output_dir)?;

    // 1. Load network
    let mut graph = data::load_edge_list(&args.edges)
        .with_context(|| format!("loading network {}", args.edges.display()))?;
    if config.largest_component {
        graph = algorithms::largest_connected_component(&graph)?;
    } else if !algorithms::is_connected(&graph) {
        log::warn!("Network is disconnected; mfpt and isp require a connected network");
    }
    log::info!(
        "Network has {} proteins and {} interactions (~{} KiB)",
        graph.node_count,
        graph.edge_count(),
        graph.memory_usage() / 1024
    );

    // 2. Partition around the seeds
    let raw_seeds = data::load_seeds(&args.seeds)
        .with_context(|| format!("loading seeds {}", args.seeds.display()))?;
    let partition = SeedPartition::new(&graph, raw_seeds.as_slice())?;

    // 3. Artifact cache for this network
    let cache = if args.no_cache {
        ArtifactCache::disabled(&graph)
    } else {
        ArtifactCache::open(&config.cache_dir, &graph)
    };
    if args.clear_cache {
        cache.clear()?;
    }

    let progress = LogProgress {
        every: config.progress_interval,
    };
    let ctx = ScoringContext::new(&graph, &partition, &cache, &progress);

    // 4. Reuse existing score files, compute the rest in parallel
    let mut results: Vec<ScoreMap> = Vec::with_capacity(config.metrics.len());
    let mut pending = Vec::new();
    for &metric in &config.metrics {
        let path = storage::score_file_path(&config.output_dir, metric, &args.label);
        if path.is_file() && !args.recompute {
            log::info!("Loading {} from {}", metric, path.display());
            results.push(storage::read_scores(&path, metric)?);
        } else {
            pending.push(metric);
        }
    }

    for scores in metrics::run_metrics(&ctx, &pending)? {
        let path = storage::score_file_path(&config.output_dir, scores.metric, &args.label);
        storage::write_scores(&path, &scores)?;
        results.push(scores);
    }
    results.sort_by_key(|scores| scores.metric);

    // 5. Drug scores and summary
    if let Some(targets_path) = &args.drug_targets {
        let drug_targets = data::load_drug_targets(targets_path)
            .with_context(|| format!("loading drug targets {}", targets_path.display()))?;
        let drugs = ranking::score_drugs(&results, &drug_targets);
        let metrics: Vec<Metric> = results.iter().map(|scores| scores.metric).collect();
        let drugs_path = storage::drug_scores_path(&config.output_dir, &args.label);
        storage::write_drug_scores(&drugs_path, &metrics, &drugs)?;
    }

    let summary_path = config.output_dir.join(format!("summary_{}.json", args.label));
    storage::write_summary(&summary_path, &args.label, &graph, &partition, &results)?;

    let stats = cache.stats();
    log::info!(
        "Done: {} artifact hits, {} computed. Results saved to {}",
        stats.hits,
        stats.misses,
        config.output_dir.display()
    );

    Ok(())
}
