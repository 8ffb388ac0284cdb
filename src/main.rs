use anyhow::Context;
use clap::{Parser, ValueEnum};
use likegraph::{
    BenchConfig, BenchContext, GeneratorConfig, GraphStatistics, Sampler, SamplingResult,
    TraversalEngine,
};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "likegraph", version, about = "LIKES graph traversal benchmarks")]
struct Args {
    /// YAML config file; overrides the graph size flags
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long, default_value_t = 100_000)]
    persons: usize,

    #[arg(long, default_value_t = 2_000)]
    items: usize,

    #[arg(long, default_value_t = 100)]
    likes: usize,

    #[arg(long)]
    seed: Option<u64>,

    /// Weight threshold of the weighted recommendation traversal
    #[arg(long)]
    threshold: Option<f64>,

    /// Unmeasured calls per query
    #[arg(long, default_value_t = 10)]
    warmup: usize,

    /// Measured calls per query
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Queries to run (default: all)
    #[arg(long, value_enum)]
    query: Vec<Query>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
enum Query {
    Ordered,
    Unordered,
    Recommendation,
    WeightedRecommendation,
}

impl Query {
    const ALL: [Query; 4] = [
        Query::Ordered,
        Query::Unordered,
        Query::Recommendation,
        Query::WeightedRecommendation,
    ];

    fn run(self, engine: &TraversalEngine<'_>, sampler: &mut Sampler) -> SamplingResult<u64> {
        match self {
            Query::Ordered => engine.measure_ordered_traversal(sampler),
            Query::Unordered => engine.measure_unordered_traversal(sampler),
            Query::Recommendation => engine.measure_recommendation_traversal(sampler),
            Query::WeightedRecommendation => {
                engine.measure_recommendation_traversal_with_relationship_properties(sampler)
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct QueryReport {
    query: Query,
    iterations: usize,
    mean_ms: f64,
    last_count: u64,
}

#[derive(Debug, Serialize)]
struct Report {
    statistics: GraphStatistics,
    results: Vec<QueryReport>,
}

fn load_config(args: &Args) -> anyhow::Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => BenchConfig::new(GeneratorConfig::new(args.persons, args.items, args.likes)),
    };
    if let Some(seed) = args.seed {
        config.graph.seed = Some(seed);
    }
    if let Some(threshold) = args.threshold {
        config.traversal.weight_threshold = threshold;
    }
    Ok(config)
}

fn measure(
    engine: &TraversalEngine<'_>,
    sampler: &mut Sampler,
    query: Query,
    warmup: usize,
    iterations: usize,
) -> SamplingResult<QueryReport> {
    for _ in 0..warmup {
        std::hint::black_box(query.run(engine, sampler)?);
    }

    let mut last_count = 0;
    let start = Instant::now();
    for _ in 0..iterations {
        last_count = std::hint::black_box(query.run(engine, sampler)?);
    }
    let elapsed = start.elapsed();

    Ok(QueryReport {
        query,
        iterations,
        mean_ms: elapsed.as_secs_f64() * 1000.0 / iterations.max(1) as f64,
        last_count,
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let setup = Instant::now();
    let ctx = BenchContext::open(config).context("preparing benchmark graph")?;
    let setup_elapsed = setup.elapsed();

    let queries = if args.query.is_empty() {
        Query::ALL.to_vec()
    } else {
        args.query.clone()
    };

    let engine = ctx.engine();
    let mut sampler = ctx.sampler();
    let mut results = Vec::with_capacity(queries.len());
    for query in queries {
        let report = measure(&engine, &mut sampler, query, args.warmup, args.iterations)
            .with_context(|| format!("running {:?}", query))?;
        results.push(report);
    }
    drop(engine);

    let report = Report {
        statistics: ctx.close(),
        results,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("likegraph v{}", likegraph::version());
    println!("==========================================");
    println!(
        "Graph: {} nodes, {} edges (generated in {:.2?})",
        report.statistics.node_count, report.statistics.edge_count, setup_elapsed
    );
    println!();
    for result in &report.results {
        println!(
            "  {:<26} {:>10.3} ms/op   count = {}",
            format!("{:?}", result.query),
            result.mean_ms,
            result.last_count
        );
    }
    Ok(())
}
