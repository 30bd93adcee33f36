//! CLI interface for the vector database

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vecdb::{
    CollectionConfig, DistanceMetric, Filter, HnswParams, IndexConfig, IndexKind, Metadata,
    Vector, VectorDatabase,
};

#[derive(Parser)]
#[command(name = "vecdb")]
#[command(about = "An embeddable vector database with HNSW search and snapshots", long_about = None)]
struct Cli {
    /// Snapshot file holding the collection
    #[arg(long, default_value = "vecdb.snap")]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
struct HnswArgs {
    /// Max connections per node
    #[arg(long)]
    m: Option<usize>,
    /// Candidate pool size during construction
    #[arg(long)]
    ef_construction: Option<usize>,
    /// Candidate pool size during search
    #[arg(long)]
    ef_search: Option<usize>,
    /// Seed for reproducible graphs
    #[arg(long)]
    seed: Option<u64>,
}

impl HnswArgs {
    fn params(&self) -> HnswParams {
        let defaults = HnswParams::default();
        HnswParams {
            m: self.m.unwrap_or(defaults.m),
            ef_construction: self.ef_construction.unwrap_or(defaults.ef_construction),
            ef_search: self.ef_search.unwrap_or(defaults.ef_search),
            seed: self.seed,
            ..defaults
        }
    }

    fn index_config(&self, kind: IndexKind) -> IndexConfig {
        match kind {
            IndexKind::Hnsw => IndexConfig::Hnsw(self.params()),
            IndexKind::BruteForce => IndexConfig::BruteForce,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty collection
    Init {
        /// Vector dimension
        #[arg(short, long, required_unless_present = "config")]
        dimension: Option<usize>,
        /// Distance metric (cosine, euclidean, dot, manhattan)
        #[arg(long, default_value = "cosine")]
        metric: DistanceMetric,
        /// Index kind (hnsw, brute_force)
        #[arg(long, default_value = "hnsw")]
        index: IndexKind,
        #[command(flatten)]
        hnsw: HnswArgs,
        /// Read the collection config from a JSON file instead
        #[arg(long, conflicts_with_all = ["dimension", "metric", "index"])]
        config: Option<PathBuf>,
        /// Overwrite an existing snapshot
        #[arg(long)]
        force: bool,
    },
    /// Insert a vector
    Add {
        /// Vector ID
        id: String,
        /// Vector data as comma-separated values (e.g., "1.0,2.0,3.0")
        #[arg(short, long)]
        vector: Vector,
        /// Metadata as a JSON object (e.g., '{"lang": "en"}')
        #[arg(short, long)]
        metadata: Option<String>,
    },
    /// Print a vector and its metadata
    Get {
        id: String,
    },
    /// Replace a vector and/or its metadata
    Update {
        id: String,
        #[arg(short, long)]
        vector: Option<Vector>,
        #[arg(short, long)]
        metadata: Option<String>,
    },
    /// Delete a vector
    Delete {
        /// Vector ID to delete
        id: String,
    },
    /// Search for similar vectors
    Search {
        /// Query vector as comma-separated values (e.g., "1.0,2.0,3.0")
        query: Vector,
        /// Number of results to return
        #[arg(short, long, default_value = "5")]
        k: usize,
        /// Metadata filter as JSON (e.g., '{"year": {"$gte": 2020}}')
        #[arg(short, long)]
        filter: Option<String>,
        /// Override the HNSW search candidate pool
        #[arg(long)]
        ef: Option<usize>,
    },
    /// List all vector IDs
    List,
    /// Print collection statistics as JSON
    Stats,
    /// Purge deleted vectors and rebuild the index
    Rebuild,
    /// Rebuild the collection under a different index
    Switch {
        /// Index kind (hnsw, brute_force)
        index: IndexKind,
        #[command(flatten)]
        hnsw: HnswArgs,
    },
}

fn parse_metadata(raw: &str) -> Result<Metadata> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("metadata is not valid JSON")?;
    Ok(Metadata::from_json(&value)?)
}

fn open(path: &Path) -> Result<VectorDatabase> {
    VectorDatabase::open(path).with_context(|| {
        format!(
            "cannot open {} (create it with `vecdb --db {} init`)",
            path.display(),
            path.display()
        )
    })
}

fn run(cli: Cli) -> Result<()> {
    let path = cli.db.as_path();

    let db = match cli.command {
        Commands::Init {
            dimension,
            metric,
            index,
            hnsw,
            config,
            force,
        } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            let config = match (config, dimension) {
                (Some(file), _) => CollectionConfig::from_json_file(&file)
                    .with_context(|| format!("reading {}", file.display()))?,
                (None, Some(dimension)) => CollectionConfig::new(dimension)
                    .with_metric(metric)
                    .with_index(hnsw.index_config(index)),
                (None, None) => anyhow::bail!("--dimension or --config is required"),
            };
            let db = VectorDatabase::new(config)?;
            println!("Created collection at {}", path.display());
            db
        }
        Commands::Add {
            id,
            vector,
            metadata,
        } => {
            let db = open(path)?;
            let metadata = metadata.as_deref().map(parse_metadata).transpose()?;
            db.add_with_metadata(id.clone(), vector, metadata.unwrap_or_default())?;
            println!("Inserted vector with ID: {}", id);
            db
        }
        Commands::Get { id } => {
            let db = open(path)?;
            let (vector, metadata) = db.get(&id)?;
            let output = serde_json::json!({
                "id": id,
                "vector": vector.as_slice(),
                "metadata": metadata.to_json(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }
        Commands::Update {
            id,
            vector,
            metadata,
        } => {
            let db = open(path)?;
            let metadata = metadata.as_deref().map(parse_metadata).transpose()?;
            db.update(&id, vector, metadata)?;
            println!("Updated vector with ID: {}", id);
            db
        }
        Commands::Delete { id } => {
            let db = open(path)?;
            db.delete(&id)?;
            println!("Deleted vector with ID: {}", id);
            db
        }
        Commands::Search {
            query,
            k,
            filter,
            ef,
        } => {
            let db = open(path)?;
            let filter = filter.as_deref().map(Filter::parse).transpose()?;
            let results = match ef {
                Some(ef) => db.search_with_ef(&query, k, ef, filter.as_ref())?,
                None => db.search(&query, k, filter.as_ref())?,
            };

            if results.is_empty() {
                println!("No results found");
            } else {
                println!("Top {} results:", results.len());
                for (i, result) in results.iter().enumerate() {
                    println!(
                        "{}. {} (distance: {:.4}) {}",
                        i + 1,
                        result.id,
                        result.distance,
                        result.metadata.to_json()
                    );
                }
            }
            return Ok(());
        }
        Commands::List => {
            let ids = open(path)?.list_ids();
            if ids.is_empty() {
                println!("No vectors in store");
            } else {
                println!("Vector IDs ({} total):", ids.len());
                for id in ids {
                    println!("  - {}", id);
                }
            }
            return Ok(());
        }
        Commands::Stats => {
            let stats = open(path)?.get_stats();
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }
        Commands::Rebuild => {
            let db = open(path)?;
            db.rebuild_index();
            println!("Rebuilt index over {} vectors", db.len());
            db
        }
        Commands::Switch { index, hnsw } => {
            let db = open(path)?;
            db.switch_index(hnsw.index_config(index))?;
            println!("Switched to {} index over {} vectors", index, db.len());
            db
        }
    };

    db.save(path)
        .with_context(|| format!("saving {}", path.display()))?;
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
