//! `bbdata`: command-line access to a BookBrainz SQLite store.
//!
//! Reads `bookbrainz.toml` (or the path given with `--config`), opens the
//! store, runs one command, and prints the result as JSON.
//!
//! ```text
//! bbdata add-editor alice
//! bbdata commit Author --input author.json
//! bbdata show Author 8d8f4a1e-... --relations aliasSet,defaultAlias
//! ```

mod settings;

use std::{future::Future, io::Read as _, path::PathBuf, time::Duration};

use anyhow::Context as _;
use bookbrainz_core::{
  achievement::process_fun_runner,
  attributes::additional_entity_props,
  derived_set::entity_set_metadata_by_type,
  entity::{Bbid, Relation},
  registry::{Fetch, get_entity, get_entity_parent_alias},
  revision::NewRevision,
  store::EntityModel as _,
};
use bookbrainz_store_sqlite::SqliteStore;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::settings::Settings;

#[derive(Parser)]
#[command(author, version, about = "BookBrainz entity data tool")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "bookbrainz.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Register an editor.
  AddEditor { name: String },

  /// Register a language.
  AddLanguage {
    name:     String,
    #[arg(long)]
    iso_code: Option<String>,
  },

  /// Record a revision from a JSON document (`-` reads stdin).
  Commit {
    entity_type: String,
    /// Existing entity to revise; omit to create one.
    #[arg(long)]
    bbid:        Option<Bbid>,
    #[arg(short, long, default_value = "-")]
    input:       String,
  },

  /// Logically delete an entity.
  Delete {
    entity_type: String,
    bbid:        Bbid,
    #[arg(long)]
    editor:      i64,
    #[arg(long)]
    note:        Option<String>,
  },

  /// Print the master row of an entity with the requested relations.
  Show {
    entity_type: String,
    bbid:        Bbid,
    /// Relation names, e.g. `aliasSet,defaultAlias,revision`.
    #[arg(long, value_delimiter = ',')]
    relations:   Vec<String>,
    /// Print `null` instead of failing when the entity does not exist.
    #[arg(long)]
    optional:    bool,
  },

  /// Print every revision row of an entity.
  History { entity_type: String, bbid: Bbid },

  /// Print the last known default alias of an entity.
  ParentAlias { entity_type: String, bbid: Bbid },

  /// Print the derived-set descriptors of an entity type.
  DerivedSets { entity_type: String },

  /// Project a JSON document onto an entity type's attributes.
  Project {
    entity_type: String,
    #[arg(short, long, default_value = "-")]
    input:       String,
  },

  /// Evaluate the "Fun Runner" achievement for an editor.
  FunRunner { editor: i64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();

  // Commands that never touch the store.
  match &cli.command {
    Command::DerivedSets { entity_type } => {
      return print_json(&entity_set_metadata_by_type(entity_type));
    }
    Command::Project { entity_type, input } => {
      let payload: serde_json::Value =
        serde_json::from_str(&read_input(input)?).context("input is not valid JSON")?;
      let projected = additional_entity_props(&payload, entity_type)
        .context("failed to project attributes")?;
      return print_json(&projected);
    }
    _ => {}
  }

  let settings = Settings::load(&cli.config)?;
  let limit = settings.fetch_timeout();

  let store = SqliteStore::open(&settings.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", settings.store_path))?;
  let registry = store.registry();

  match cli.command {
    Command::AddEditor { name } => {
      print_json(&timed(limit, store.add_editor(&name)).await?)
    }
    Command::AddLanguage { name, iso_code } => {
      print_json(&timed(limit, store.add_language(&name, iso_code.as_deref())).await?)
    }
    Command::Commit { entity_type, bbid, input } => {
      let revision: NewRevision = serde_json::from_str(&read_input(&input)?)
        .context("input is not a valid revision")?;
      let model = registry.resolve(&entity_type)?;
      let row = timed(limit, model.insert_revision(bbid, revision)).await?;
      tracing::info!(bbid = %row.bbid, revision_id = row.revision_id, "committed");
      print_json(&row)
    }
    Command::Delete { entity_type, bbid, editor, note } => {
      let model = registry.resolve(&entity_type)?;
      print_json(&timed(limit, model.delete(bbid, editor, note)).await?)
    }
    Command::Show { entity_type, bbid, relations, optional } => {
      let relations = relations
        .iter()
        .map(|name| Relation::parse(name))
        .collect::<Result<Vec<_>, _>>()?;
      let fetch = if optional { Fetch::Optional } else { Fetch::Required };
      let snapshot =
        timed(limit, get_entity(&registry, &entity_type, bbid, &relations, fetch)).await?;
      print_json(&snapshot)
    }
    Command::History { entity_type, bbid } => {
      let model = registry.resolve(&entity_type)?;
      print_json(&timed(limit, model.history(bbid)).await?)
    }
    Command::ParentAlias { entity_type, bbid } => {
      let alias = timed(limit, get_entity_parent_alias(&registry, &entity_type, bbid)).await?;
      print_json(&alias)
    }
    Command::FunRunner { editor } => {
      print_json(&timed(limit, process_fun_runner(&store, editor)).await?)
    }
    Command::DerivedSets { .. } | Command::Project { .. } => Ok(()),
  }
}

/// Run one store call under the configured time limit.
async fn timed<T, E>(
  limit: Duration,
  call: impl Future<Output = Result<T, E>>,
) -> anyhow::Result<T>
where
  E: std::error::Error + Send + Sync + 'static,
{
  tokio::time::timeout(limit, call)
    .await
    .with_context(|| format!("store call timed out after {limit:?}"))?
    .map_err(anyhow::Error::from)
}

/// Read a JSON document from a file, or from stdin for `-`.
fn read_input(input: &str) -> anyhow::Result<String> {
  if input == "-" {
    let mut buf = String::new();
    std::io::stdin()
      .read_to_string(&mut buf)
      .context("failed to read stdin")?;
    return Ok(buf);
  }
  std::fs::read_to_string(input).with_context(|| format!("failed to read {input}"))
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(value)?);
  Ok(())
}
