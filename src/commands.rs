use std::io::Write as _;
use std::sync::Arc;

use anyhow::Context as _;

use crate::catalog::CatalogManager;
use crate::cli::{AddArgs, Cli, Command, ListArgs, RemoveArgs};
use crate::config::{CatalogConfig, parse_endpoint};
use crate::error::CatalogError;
use crate::resolver::HttpMetadataResolver;
use crate::session::CatalogSession;
use crate::store::LocalFsCatalogStore;

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = CatalogConfig::from_env().context("load config")?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir.into();
    }
    if let Some(raw) = cli.resolver_url.as_deref() {
        config.resolver_endpoint =
            parse_endpoint(raw).with_context(|| format!("invalid --resolver-url {raw:?}"))?;
    }

    let mut session = open_session(&config).await?;
    match cli.command {
        Command::Add(args) => add(&session, args).await,
        Command::List(args) => {
            session.on_search_term_changed(&args.search);
            list(&session, &args)
        }
        Command::Remove(args) => {
            session.on_search_term_changed(&args.search);
            remove(&session, &args).await
        }
    }
}

pub async fn open_session(config: &CatalogConfig) -> anyhow::Result<CatalogSession> {
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        resolver = %config.resolver_endpoint,
        "open catalog"
    );
    let store = LocalFsCatalogStore::new(config.data_dir.clone())
        .with_placeholder_image(config.placeholder_image.clone());
    let resolver = HttpMetadataResolver::new(
        config.resolver_endpoint.clone(),
        config.resolve_timeout,
        config.placeholder_image.clone(),
    )?;
    let manager = CatalogManager::open(Arc::new(store), Arc::new(resolver)).await;
    Ok(CatalogSession::new(Arc::new(manager)))
}

async fn add(session: &CatalogSession, args: AddArgs) -> anyhow::Result<()> {
    match session.on_add_link_submitted(&args.link).await {
        Some(record) => println!("{}\t{}", record.title, record.url),
        None => eprintln!("link is empty; nothing added"),
    }
    Ok(())
}

fn list(session: &CatalogSession, args: &ListArgs) -> anyhow::Result<()> {
    let view = session.visible();
    let mut stdout = std::io::stdout().lock();
    if args.json {
        serde_json::to_writer_pretty(&mut stdout, &view.to_vec()).context("write json")?;
        writeln!(stdout).context("write stdout")?;
        return Ok(());
    }
    for (visible_index, record) in view.iter().enumerate() {
        writeln!(
            stdout,
            "{visible_index}\t{}\t{}\t{}",
            record.title, record.url, record.image
        )
        .context("write stdout")?;
    }
    Ok(())
}

async fn remove(session: &CatalogSession, args: &RemoveArgs) -> anyhow::Result<()> {
    match session.on_delete_requested(args.index).await {
        Ok(record) => println!("removed\t{}\t{}", record.title, record.url),
        // A stale index is a no-op; the caller should re-list.
        Err(err @ CatalogError::IndexOutOfRange { .. }) => {
            eprintln!("nothing removed: {err}");
        }
    }
    Ok(())
}
