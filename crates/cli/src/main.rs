use clap::{Parser, Subcommand};
use docimpact_core::{AnalysisError, Config, Result};
use docimpact_pipeline::{run as run_pipeline, RunInputs};
use docimpact_rewriter::{apply_rewrite, generate_doc_update, meets_confidence_floor, RewriteRequest};
use docimpact_snapshot::{LocalGitSource, RemoteConfig, RemoteSource, SnapshotSource};
use std::path::PathBuf;
use tracing::{info, warn, Level};

#[derive(Parser)]
#[command(name = "docimpact")]
#[command(about = "Analyzes how a code change impacts documentation and proposes rewrites")]
#[command(version)]
pub struct Cli {
    /// TOML file overriding a subset of the default pipeline/logging config.
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compares two code refs, cross-references the docs at the new ref, and
    /// reports the documentation impact as JSON.
    Analyze {
        /// Base ref to diff from.
        #[arg(long)]
        old_ref: String,

        /// Head ref to diff to.
        #[arg(long)]
        new_ref: String,

        /// `owner/repo` slug hosting the code, or a local path when `--local`
        /// is set.
        #[arg(long)]
        code_slug: String,

        /// `owner/repo` slug hosting the docs (often the same as `code_slug`),
        /// or a local path when `--local` is set. Docs are read at `new_ref`.
        #[arg(long)]
        docs_slug: String,

        /// Bearer token for the hosting API. Ignored with `--local`.
        #[arg(long)]
        token: Option<String>,

        /// Fetch both slugs from local git working copies instead of a
        /// remote host.
        #[arg(long)]
        local: bool,

        /// Where to write the JSON report; stdout when omitted.
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Generate doc rewrite suggestions for every impacted doc and apply
        /// the ones that clear `rewrite_confidence_floor` in place.
        #[arg(long)]
        rewrite: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
    };

    init_tracing(&config);

    let result = match cli.command {
        Commands::Analyze {
            old_ref,
            new_ref,
            code_slug,
            docs_slug,
            token,
            local,
            output,
            rewrite,
        } => {
            analyze_command(
                config, old_ref, new_ref, code_slug, docs_slug, token, local, output, rewrite,
            )
            .await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(exit_code(&e));
    }
}

fn exit_code(err: &AnalysisError) -> i32 {
    if err.is_fatal() {
        1
    } else {
        2
    }
}

fn load_config(path: &Option<PathBuf>) -> Result<Config> {
    match path {
        Some(p) => {
            info!(path = %p.display(), "loading config");
            Config::from_file(p)
        }
        None => {
            info!("using default configuration");
            Ok(Config::default())
        }
    }
}

fn init_tracing(config: &Config) {
    let level = if config.pipeline.debug {
        Level::DEBUG
    } else {
        match config.logging.level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => {
                if config.pipeline.verbose {
                    Level::DEBUG
                } else {
                    Level::INFO
                }
            }
        }
    };
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(!config.logging.json)
        .with_target(true)
        .with_writer(std::io::stderr);
    if config.logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

async fn fetch_snapshot(
    slug: &str,
    reference: &str,
    token: &Option<String>,
    local: bool,
    max_file_size_mb: u64,
) -> Result<docimpact_core::Snapshot> {
    if local {
        let source = LocalGitSource::new(PathBuf::from(slug), max_file_size_mb);
        source.fetch(reference).await
    } else {
        let mut remote_config = RemoteConfig::new(slug.to_string());
        remote_config.token = token.clone();
        remote_config.max_file_size_mb = max_file_size_mb;
        let source = RemoteSource::new(remote_config)?;
        source.fetch(reference).await
    }
}

#[allow(clippy::too_many_arguments)]
async fn analyze_command(
    config: Config,
    old_ref: String,
    new_ref: String,
    code_slug: String,
    docs_slug: String,
    token: Option<String>,
    local: bool,
    output: Option<PathBuf>,
    rewrite: bool,
) -> Result<()> {
    info!(old_ref, new_ref, code_slug, docs_slug, "starting analysis");

    let max_file_size_mb = config.pipeline.max_file_size_mb;
    let code_old = fetch_snapshot(&code_slug, &old_ref, &token, local, max_file_size_mb).await?;
    let code_new = fetch_snapshot(&code_slug, &new_ref, &token, local, max_file_size_mb).await?;
    let docs = fetch_snapshot(&docs_slug, &new_ref, &token, local, max_file_size_mb).await?;

    let inputs = RunInputs {
        old_ref,
        new_ref,
        code_slug,
        docs_slug,
        code_old: code_old.clone(),
        code_new: code_new.clone(),
        docs: docs.clone(),
    };

    let mut result = run_pipeline(inputs, &config.pipeline);

    if rewrite {
        apply_rewrites(&mut result, &code_old, &code_new, &docs, &config)?;
    }

    for warning in &result.warnings {
        warn!(component = %warning.component, "{}", warning.message);
    }

    let json = serde_json::to_string_pretty(&result)?;
    match output {
        Some(path) => std::fs::write(&path, json)?,
        None => println!("{json}"),
    }

    info!(
        impacted_docs = result.impacted_docs.len(),
        elapsed_seconds = result.elapsed_seconds,
        "analysis complete"
    );
    Ok(())
}

/// Builds a rewrite request per impacted doc from the change that most
/// affects it (highest severity weight, ties broken by path) and writes
/// every suggestion that clears `rewrite_confidence_floor` back into its
/// doc's snapshot content before the report is emitted. No LLM provider is
/// wired in by default, so this always exercises the deterministic
/// fallback stub.
fn apply_rewrites(
    result: &mut docimpact_core::AnalysisResult,
    code_old: &docimpact_core::Snapshot,
    code_new: &docimpact_core::Snapshot,
    docs: &docimpact_core::Snapshot,
    config: &Config,
) -> Result<()> {
    for doc in &result.impacted_docs {
        let Some(entity_name) = doc.changed_entities.iter().next() else {
            continue;
        };
        let Some(change) = result
            .changes
            .iter()
            .find(|c| c.entities.contains(entity_name))
        else {
            continue;
        };
        let Some(current_doc_entry) = docs.get(&doc.doc_path) else {
            continue;
        };
        let Some(current_doc_bytes) = &current_doc_entry.content else {
            continue;
        };
        let current_doc = String::from_utf8_lossy(current_doc_bytes);

        let old_code = code_old
            .get(&change.path)
            .and_then(|e| e.content.as_ref())
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default();
        let new_code = code_new
            .get(&change.path)
            .and_then(|e| e.content.as_ref())
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default();
        let line_numbers = doc
            .line_numbers
            .get(entity_name)
            .cloned()
            .unwrap_or_default();

        let request = RewriteRequest {
            old_code: &old_code,
            new_code: &new_code,
            current_doc: &current_doc,
            change_type: change.change_type.as_str(),
            entity_name,
            filename: Some(change.path.as_str()),
            language: change.language,
            distance: change.distance,
            mention_count: doc.mention_counts.get(entity_name).copied().unwrap_or(0),
            line_numbers: &line_numbers,
        };

        let suggestion = generate_doc_update(&request, None);
        if !meets_confidence_floor(suggestion.confidence, config.pipeline.rewrite_confidence_floor) {
            info!(
                doc = %doc.doc_path,
                entity = entity_name,
                confidence = suggestion.confidence,
                "rewrite suggestion below confidence floor, leaving doc untouched"
            );
            continue;
        }

        let rewritten = apply_rewrite(&current_doc, entity_name, &change.path, &suggestion.explanation);
        std::fs::write(&doc.doc_path, &rewritten).map_err(|e| AnalysisError::Rewrite {
            entity: entity_name.clone(),
            doc_path: doc.doc_path.clone(),
            message: e.to_string(),
        })?;
        info!(doc = %doc.doc_path, entity = entity_name, "wrote rewrite suggestion");
    }
    Ok(())
}
