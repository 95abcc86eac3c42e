//! Role binding commands

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use clap::Args;
use serde::Serialize;
use tracing::{info, warn};

use super::Command;
use crate::config::AppConfig;
use crate::domain::role_binding::{RoleBinding, RoleBindingQuery, RoleBindingRepository};
use crate::domain::storage::{Entity, Kind, Metadata};
use crate::infrastructure::logging;
use crate::infrastructure::role_binding::StorageRoleBindingRepository;
use crate::infrastructure::storage::{StorageType, StoreFactory};

/// Arguments for the list command
#[derive(Args, Clone, Debug, Default)]
pub struct ListArgs {
    /// Only bindings of this project
    #[arg(long)]
    pub project: Option<String>,

    /// Only bindings whose name starts with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// Print identity metadata only
    #[arg(long)]
    pub metadata: bool,

    /// Forward stored documents without decoding them
    #[arg(long)]
    pub raw: bool,
}

impl ListArgs {
    fn query(&self) -> RoleBindingQuery {
        RoleBindingQuery {
            project: self.project.clone(),
            name_prefix: self.prefix.clone(),
        }
    }
}

/// Identity view printed for `list --metadata`
#[derive(Debug, Serialize)]
struct EntitySummary<'a> {
    kind: Kind,
    #[serde(skip_serializing_if = "Option::is_none")]
    project: Option<&'a str>,
    #[serde(flatten)]
    metadata: &'a Metadata,
}

impl<'a> EntitySummary<'a> {
    fn from_entity(entity: &'a dyn Entity) -> Self {
        Self {
            kind: entity.kind(),
            project: entity.project(),
            metadata: entity.metadata(),
        }
    }
}

/// Load configuration, initialize logging and execute a command
pub async fn run(command: Command) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    let storage_config = config.storage.to_storage_config()?;
    if command.is_mutating() && storage_config.storage_type() == StorageType::InMemory {
        warn!("Using in-memory storage, changes are discarded when the command exits");
    }

    let store = StoreFactory::create(&storage_config, &config.storage.table_name).await?;
    let repository = StorageRoleBindingRepository::new(store);

    execute(Arc::new(repository), command, &mut std::io::stdout()).await
}

/// Execute a command against a repository, writing JSON output to `out`
pub async fn execute(
    repository: Arc<dyn RoleBindingRepository>,
    command: Command,
    out: &mut (dyn Write + Send),
) -> anyhow::Result<()> {
    match command {
        Command::Get { project, name } => {
            let entity = repository.get(&project, &name).await?;
            write_json(out, &entity)?;
        }
        Command::List(args) => list(repository.as_ref(), &args, out).await?,
        Command::Create { file } => {
            let entity = read_role_binding(&file)?;
            repository.create(&entity).await?;
            info!(name = entity.name(), project = ?entity.project(), "Role binding created");
            write_json(out, &entity)?;
        }
        Command::Apply { file } => {
            let mut entity = read_role_binding(&file)?;
            let project = entity.project().unwrap_or_default().to_string();

            match repository.get(&project, entity.name()).await {
                Ok(previous) => entity.revise_from(&previous),
                Err(e) if e.is_not_found() => {}
                Err(e) => return Err(e.into()),
            }

            repository.update(&entity).await?;
            info!(name = entity.name(), project = %project, "Role binding applied");
            write_json(out, &entity)?;
        }
        Command::Delete { project, name } => {
            repository.delete(&project, &name).await?;
            info!(%project, %name, "Role binding deleted");
        }
        Command::DeleteAll { project } => {
            let deleted = repository.delete_all(&project).await?;
            info!(%project, deleted, "Role bindings deleted");
            write_json(out, &serde_json::json!({ "deleted": deleted }))?;
        }
    }

    Ok(())
}

async fn list(
    repository: &dyn RoleBindingRepository,
    args: &ListArgs,
    out: &mut (dyn Write + Send),
) -> anyhow::Result<()> {
    let query = args.query();

    match (args.raw, args.metadata) {
        (true, true) => write_raw_array(out, &repository.raw_metadata_list(&query).await?)?,
        (true, false) => write_raw_array(out, &repository.raw_list(&query).await?)?,
        (false, true) => {
            let entities = repository.metadata_list(&query).await?;
            let summaries: Vec<EntitySummary<'_>> = entities
                .iter()
                .map(|entity| EntitySummary::from_entity(entity.as_ref()))
                .collect();
            write_json(out, &summaries)?;
        }
        (false, false) => write_json(out, &repository.list(&query).await?)?,
    }

    Ok(())
}

fn read_role_binding(path: &Path) -> anyhow::Result<RoleBinding> {
    let data = std::fs::read(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;

    serde_json::from_slice(&data)
        .map_err(|e| anyhow::anyhow!("Invalid role binding in {}: {}", path.display(), e))
}

fn write_json<T: Serialize + ?Sized>(
    out: &mut (dyn Write + Send),
    value: &T,
) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

/// Writes already-encoded documents as one JSON array without re-encoding them
fn write_raw_array(out: &mut (dyn Write + Send), documents: &[Vec<u8>]) -> anyhow::Result<()> {
    out.write_all(b"[")?;

    for (i, document) in documents.iter().enumerate() {
        if i > 0 {
            out.write_all(b",")?;
        }
        out.write_all(document)?;
    }

    out.write_all(b"]\n")?;
    Ok(())
}
