use anyhow::{
    Context,
    Result,
};
use clap::{
    Parser,
    ValueEnum,
};
use dualring::{
    Entry,
    KeyHasher,
    RingManager,
    config::{
        PlacementConfig,
        SentryConfig,
    },
    observability,
};
use rand::Rng;
use serde::Serialize;
use tracing::info;

const DEFAULT_NODES: [&str; 6] = [
    "123.45.83.190",
    "123.45.83.191",
    "123.45.83.192",
    "123.45.78.191",
    "123.45.78.189",
    "123.12.09.249",
];

const DEFAULT_KEY_COUNT: usize = 100;

#[derive(Copy, Clone, ValueEnum, Debug)]
enum Format {
    Table,
    Json,
}

#[derive(Debug, Parser, Clone)]
#[command(name = "ringctl", about = "Show how keys are placed across a consistent hash ring.")]
struct Config {
    #[clap(flatten)]
    placement: PlacementConfig,

    #[clap(flatten)]
    sentry: SentryConfig,

    /// Node to remove once all nodes and keys are placed. Repeatable.
    #[arg(long = "remove-node")]
    remove_nodes: Vec<String>,

    /// Key to resolve to its owning node. Repeatable.
    #[arg(long = "lookup")]
    lookups: Vec<String>,

    #[arg(long, value_enum, default_value_t = Format::Table)]
    format: Format,
}

#[derive(Debug, Serialize)]
struct NodeReport {
    #[serde(flatten)]
    node: Entry,
    keys: Vec<Entry>,
}

#[derive(Debug, Serialize)]
struct LookupReport {
    key: String,
    hash_id: u32,
    owner: String,
}

#[derive(Debug, Serialize)]
struct Report {
    nodes: Vec<NodeReport>,
    lookups: Vec<LookupReport>,
}

fn main() -> Result<()> {
    let config = Config::parse();
    let _sentry = observability::init_tracing_and_sentry(config.sentry.clone(), observability::DEFAULT_LOG_DIRECTIVE);
    info!(config = ?config, version = env!("CARGO_PKG_VERSION"), "Starting ringctl");

    let manager = RingManager::builder()
        .hasher(config.placement.hasher.build())
        .span(tracing::info_span!("ring_manager"))
        .build();

    let nodes: Vec<String> = if config.placement.nodes.is_empty() {
        DEFAULT_NODES.iter().map(|n| n.to_string()).collect()
    } else {
        config.placement.nodes.clone()
    };
    for node in &nodes {
        manager
            .add_node(node)
            .with_context(|| format!("Failed to add node {node}"))?;
    }

    let mut keys = config.placement.keys.clone();
    if keys.is_empty() && config.placement.random_keys == 0 {
        keys = (1..=DEFAULT_KEY_COUNT).map(|i| format!("user_{i}")).collect();
    }
    let mut rng = rand::rng();
    keys.extend((0..config.placement.random_keys).map(|_| format!("key_{:08x}", rng.random::<u32>())));
    for key in &keys {
        manager
            .add_key(key)
            .with_context(|| format!("Failed to add key {key}"))?;
    }

    for node in &config.remove_nodes {
        manager
            .remove_node(node)
            .with_context(|| format!("Failed to remove node {node}"))?;
    }

    let report = build_report(&manager, &config.lookups)?;
    match config.format {
        Format::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        Format::Table => print_table(&report),
    }

    Ok(())
}

fn build_report(manager: &RingManager, lookups: &[String]) -> Result<Report> {
    let nodes = manager
        .nodes()
        .into_iter()
        .map(|node| {
            let keys = manager
                .get_keys(&node.id)
                .with_context(|| format!("Failed to fetch keys for node {}", node.id))?;
            Ok(NodeReport { node, keys })
        })
        .collect::<Result<Vec<_>>>()?;

    let lookups = lookups
        .iter()
        .map(|key| {
            let owner = manager
                .get(key)
                .with_context(|| format!("Failed to look up key {key}"))?;
            Ok(LookupReport {
                key: key.clone(),
                hash_id: manager.hasher().hash(key),
                owner,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Report { nodes, lookups })
}

fn print_table(report: &Report) {
    for node in &report.nodes {
        println!("{:<20} {:>10}  {} keys", node.node.id, node.node.hash_id, node.keys.len());
        for key in &node.keys {
            println!("    {:<16} {:>10}", key.id, key.hash_id);
        }
    }

    if !report.lookups.is_empty() {
        println!();
        for lookup in &report.lookups {
            println!("{:<20} {:>10}  -> {}", lookup.key, lookup.hash_id, lookup.owner);
        }
    }
}
