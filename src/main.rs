//! Main entry point for the remote-collection CLI application.
//!
//! This binary browses a paginated collection of the remote API: listing
//! its entries, printing single entries, running finds and creates, and
//! walking up to the parent entry.

use anyhow::{Result, bail};
use clap::Parser;
use std::sync::Arc;

use remote_collection::{ApiConfig, Cli, Collection, Entry, HttpTransport, ParentEntry, Transport};

/// Application entry point.
///
/// Parses command-line arguments, sets up logging and the HTTP transport,
/// then dispatches to the requested action.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_filter()))
        .init();

    let mut config = ApiConfig::from_env()?;
    if let Some(ref base) = cli.api_base {
        config = config.with_api_base(base.as_str());
    }
    let transport = Arc::new(HttpTransport::with_config(&config)?);

    run(Arc::clone(&transport), &cli).await?;

    if !cli.quiet {
        eprintln!("\nTotal requests: {}", transport.request_count());
    }

    Ok(())
}

/// Run the action selected on the command line.
///
/// Only one of create, parent, id, offset and find is honoured, in that
/// order; without any of them the collection is listed.
async fn run<T: Transport + 'static>(transport: Arc<T>, cli: &Cli) -> Result<()> {
    let mut collection = Collection::load(transport, &cli.url).await?;

    if !cli.create.is_empty() {
        let entry = collection.create(cli.create_fields()).await?;
        print_entry(&entry, cli.json)?;
        return Ok(());
    }

    if cli.parent {
        match collection.parent_entry().await? {
            ParentEntry::Found(entry) => print_entry(&entry, cli.json)?,
            ParentEntry::NoParentUrl => bail!("{} is at the top of the tree", collection.url()),
            ParentEntry::NotAnEntry { url, reason } => {
                bail!("parent {url} is not an entry: {reason}")
            }
        }
        return Ok(());
    }

    if let Some(ref id) = cli.id {
        let entry = collection.get_by_id(id).await?;
        print_entry(&entry, cli.json)?;
        return Ok(());
    }

    if let Some(offset) = cli.offset {
        let entry = collection.get(offset).await?;
        print_entry(entry.as_ref(), cli.json)?;
        return Ok(());
    }

    if !cli.find.is_empty() {
        collection = collection.find(cli.find_criteria()).await?;
    }

    list_entries(&mut collection, cli).await
}

/// List entries of the collection, one per line.
///
/// Prints the entry URL by default or the full payload with `-j`, and a
/// summary line on stderr unless quiet.
async fn list_entries<T: Transport + 'static>(
    collection: &mut Collection<T>,
    cli: &Cli,
) -> Result<()> {
    let limit = cli.limit.unwrap_or(usize::MAX);
    let mut shown = 0usize;

    while shown < limit {
        let Some(entry) = collection.next_entry().await? else {
            break;
        };
        print_entry(entry.as_ref(), cli.json)?;
        shown += 1;
    }

    if !cli.quiet {
        eprintln!(
            "{} of {} entries (page size {})",
            shown,
            collection.len(),
            collection.page_size()
        );
    }

    Ok(())
}

fn print_entry<T: Transport>(entry: &Entry<T>, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entry.data())?);
    } else {
        let name = entry
            .str_field("name")
            .map(|name| format!("  {name}"))
            .unwrap_or_default();
        println!("{}{}", entry.url(), name);
    }
    Ok(())
}
