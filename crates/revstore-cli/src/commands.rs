use anyhow::{bail, Context};
use colored::Colorize;
use revstore_engine::{AccessMode, ConnectionManager, RedbEngine};
use revstore_store::{Datastore, Object, ObjectStore};
use serde::Serialize;
use serde_json::Value;

use crate::bootstrap::{bootstrap, BootstrapOutcome, StoredNodeConfig};
use crate::cli::*;
use crate::config::NodeConfig;

type ValueStore = ObjectStore<Value, RedbEngine>;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = NodeConfig::load_or_default(&cli.config)?;
    if let Some(db) = cli.db {
        config.me.datastore_path = db;
    }
    let connection = ConnectionManager::new(config.me.datastore_path.clone());
    let format = cli.format;

    match cli.command {
        Command::Init => cmd_init(&connection, &config, format),
        Command::Get(args) => {
            cmd_get(&value_store(&connection, AccessMode::ReadOnly)?, args, format)
        }
        Command::Put(args) => {
            cmd_put(&value_store(&connection, AccessMode::ReadWrite)?, args, format)
        }
        Command::Delete(args) => {
            cmd_delete(&value_store(&connection, AccessMode::ReadWrite)?, args)
        }
        Command::List(args) => {
            cmd_list(&value_store(&connection, AccessMode::ReadOnly)?, args, format)
        }
        Command::History(args) => {
            cmd_history(&value_store(&connection, AccessMode::ReadOnly)?, args, format)
        }
        Command::Verify(args) => {
            cmd_verify(&value_store(&connection, AccessMode::ReadOnly)?, args)
        }
    }
}

fn value_store(connection: &ConnectionManager, mode: AccessMode) -> anyhow::Result<ValueStore> {
    let engine = connection
        .open(mode)
        .with_context(|| format!("opening datastore {}", connection.path().display()))?;
    Ok(ObjectStore::new(engine))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_init(
    connection: &ConnectionManager,
    config: &NodeConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let engine = connection
        .open(AccessMode::ReadWrite)
        .with_context(|| format!("opening datastore {}", connection.path().display()))?;
    let store: ObjectStore<StoredNodeConfig, _> = ObjectStore::new(engine);
    let outcome = bootstrap(&store, config)?;

    if format == OutputFormat::Json {
        return print_json(outcome.object());
    }
    match &outcome {
        BootstrapOutcome::Onboarded(object) => {
            println!(
                "{} Onboarded node {}",
                "✓".green().bold(),
                object.payload.node.name.bold()
            );
            println!("  Revision: {}", object.revision.yellow());
        }
        BootstrapOutcome::Existing(object) => {
            println!(
                "Config already exists for node {}",
                object.payload.node.name.bold()
            );
            println!("  Revision: {}", object.revision.yellow());
        }
    }
    println!("  Datastore: {}", connection.path().display());
    Ok(())
}

fn cmd_get<D: Datastore<Value>>(
    store: &D,
    args: IdArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let object = store.read(&args.id)?;
    match format {
        OutputFormat::Json => print_json(&object),
        OutputFormat::Text => {
            println!("{} {}", "Object".bold(), object.identifier.cyan());
            println!("  Revision: {}", object.revision.yellow());
            println!("  Env: {}  Type: {}", object.environment, object.kind);
            println!("  Data: {}", serde_json::to_string_pretty(&object.payload)?);
            Ok(())
        }
    }
}

/// Apply a `put` to the store and return the written object.
pub(crate) fn put_object<D: Datastore<Value>>(
    store: &D,
    args: PutArgs,
) -> anyhow::Result<Object<Value>> {
    let payload: Value = serde_json::from_str(&args.data).context("--data is not valid JSON")?;

    let object = match store.read(&args.id) {
        Ok(mut existing) => {
            existing.payload = payload;
            if let Some(env) = args.env {
                existing.environment = env;
            }
            if let Some(kind) = args.kind {
                existing.kind = kind;
            }
            existing
        }
        Err(e) if e.is_not_found() => {
            let (Some(env), Some(kind)) = (args.env, args.kind) else {
                bail!(
                    "object {} does not exist; --env and --type are required to create it",
                    args.id
                );
            };
            Object::new(payload)
                .with_identifier(args.id.clone())
                .in_environment(env)
                .of_type(kind)
        }
        Err(e) => return Err(e.into()),
    };

    Ok(store.write(&args.id, object)?)
}

fn cmd_put<D: Datastore<Value>>(
    store: &D,
    args: PutArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let written = put_object(store, args)?;
    match format {
        OutputFormat::Json => print_json(&written),
        OutputFormat::Text => {
            println!("{} Stored {}", "✓".green().bold(), written.identifier.cyan());
            println!("  Revision: {}", written.revision.yellow());
            Ok(())
        }
    }
}

fn cmd_delete<D: Datastore<Value>>(store: &D, args: IdArgs) -> anyhow::Result<()> {
    store.delete(&args.id)?;
    println!("{} Deleted {}", "✓".green(), args.id.cyan());
    Ok(())
}

fn cmd_list<D: Datastore<Value>>(
    store: &D,
    args: ListArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let ids = store.read_all(&args.env, &args.kind)?;
    match format {
        OutputFormat::Json => print_json(&ids),
        OutputFormat::Text => {
            if ids.is_empty() {
                println!("No objects in {} of type {}.", args.env.bold(), args.kind);
            }
            for id in ids {
                println!("{id}");
            }
            Ok(())
        }
    }
}

fn cmd_history<D: Datastore<Value>>(
    store: &D,
    args: IdArgs,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let object = store.read(&args.id)?;
    match format {
        OutputFormat::Json => print_json(&object.history),
        OutputFormat::Text => {
            for revision in object.history.iter().rev() {
                let marker = if *revision == object.revision { "*" } else { " " };
                println!("{} {}", marker.green(), revision.yellow());
            }
            Ok(())
        }
    }
}

fn cmd_verify<D: Datastore<Value>>(store: &D, args: IdArgs) -> anyhow::Result<()> {
    let object = store.read(&args.id)?;
    match object.verify() {
        Ok(()) => {
            println!("{} Revision {} verified", "✓".green().bold(), object.revision.yellow());
            println!("  History: {} entries", object.history.len());
            Ok(())
        }
        Err(e) => {
            println!("{} {}", "✗".red().bold(), e);
            Err(e).with_context(|| format!("object {} failed verification", args.id))
        }
    }
}
