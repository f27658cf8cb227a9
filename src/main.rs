use anyhow::Context;
use clap::{Parser, Subcommand};
use filmx::pipeline::{IngestStage, SplitByGenreStage, Stage};
use filmx::{
    find_similar_with_stats, query_films, FilmxConfig, FilterSpec, MembershipMode, Pipeline,
    RowErrorPolicy, SimilaritySchema,
};
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// A columnar film data engine
#[derive(Parser, Debug)]
#[command(name = "filmx")]
#[command(about = "Ingest, partition and query film data", long_about = None)]
struct Args {
    /// Directory for every generated artifact
    #[arg(short, long, env = "FILMX_DATA_DIR", default_value = "output", global = true)]
    data_dir: PathBuf,

    /// Log level
    #[arg(long, env = "FILMX_LOG_LEVEL", default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct IngestArgs {
    /// Raw film CSV
    #[arg(long, env = "FILMX_INPUT", default_value = "resources/csv/allFilms.csv")]
    input: PathBuf,

    /// JSON field schema
    #[arg(long, env = "FILMX_SCHEMA", default_value = "resources/json/allFilesSchema.json")]
    schema: PathBuf,

    /// Null out cells that fail to coerce instead of aborting
    #[arg(long)]
    null_on_error: bool,
}

#[derive(clap::Args, Debug)]
struct SplitArgs {
    /// Match whole genre tokens instead of substrings of the raw cell
    #[arg(long)]
    token_membership: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Coerce the raw CSV into the typed films table
    Ingest(IngestArgs),
    /// Split the films table into one artifact per genre
    Split(SplitArgs),
    /// Run ingest and split, skipping stages whose output exists
    Run {
        #[command(flatten)]
        ingest: IngestArgs,
        #[command(flatten)]
        split: SplitArgs,
        /// Rerun every stage
        #[arg(long)]
        force: bool,
    },
    /// Print the films matching a JSON filter spec, one JSON object per line
    Query {
        /// e.g. '{"durationMins": {"range": [100, 160]}, "title": {"substring": "Star"}}'
        #[arg(long)]
        filter: String,
    },
    /// Print the films similar to a film, most similar first
    Similar {
        /// Id of the target film
        #[arg(long)]
        id: i64,
        /// Minimum score (inclusive)
        #[arg(long, default_value_t = 0.0)]
        threshold: f64,
        /// Weight of each similarity category
        #[arg(long, env = "FILMX_CATEGORY_WEIGHT", default_value_t = filmx::DEFAULT_CATEGORY_WEIGHT)]
        weight: f64,
    },
}

fn apply_ingest(config: &mut FilmxConfig, args: &IngestArgs) {
    config.input_csv = args.input.clone();
    config.schema_path = args.schema.clone();
    if args.null_on_error {
        config.row_errors = RowErrorPolicy::NullOnError;
    }
}

fn apply_split(config: &mut FilmxConfig, args: &SplitArgs) {
    if args.token_membership {
        config.membership = MembershipMode::Token;
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting filmx v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let mut config = FilmxConfig {
        data_dir: args.data_dir.clone(),
        ..Default::default()
    };

    match args.command {
        Command::Ingest(ingest) => {
            apply_ingest(&mut config, &ingest);
            config.validate()?;
            IngestStage::new(config)
                .run()
                .context("ingest failed")?;
        }
        Command::Split(split) => {
            apply_split(&mut config, &split);
            config.validate()?;
            SplitByGenreStage::new(config)
                .run()
                .context("split failed")?;
        }
        Command::Run { ingest, split, force } => {
            apply_ingest(&mut config, &ingest);
            apply_split(&mut config, &split);
            config.validate()?;
            let report = Pipeline::films(&config)
                .force(force)
                .run()
                .context("pipeline failed")?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Query { filter } => {
            let spec = FilterSpec::from_json_str(&filter).context("invalid filter")?;
            let films = query_films(config.films_path(), &spec)?;
            for film in films.rows() {
                println!("{}", film.to_json());
            }
        }
        Command::Similar {
            id,
            threshold,
            weight,
        } => {
            config.category_weight = weight;
            config.validate()?;
            let schema = SimilaritySchema::films(config.category_weight);
            let (results, stats) =
                find_similar_with_stats(id, threshold, config.films_path(), &schema)
                    .with_context(|| format!("similarity search for film {} failed", id))?;
            for result in &results {
                println!("{}", serde_json::to_string(result)?);
            }
            println!("{}", serde_json::to_string(&stats)?);
        }
    }

    Ok(())
}
