use std::sync::Arc;

use clap::{Parser, Subcommand};
use scene::{AppAction, filter_collections, selected_extent, selection_label};
use streaming::{ByteSource, DiskFile, HttpFetcher, Locator, PaginationPolicy, SearchResult};
use tracing_subscriber::EnvFilter;
use url::Url;
use viewer::{ValueView, ViewerConfig, ViewerSession};

#[derive(Debug, Parser)]
#[command(name = "stac-viewer", about = "Browse STAC catalogs, collections and items")]
struct Args {
    /// Natural-language search service; overrides STAC_NATURAL_QUERY_API.
    #[arg(long)]
    search_api: Option<Url>,
    /// Upper bound on collection pages fetched; overrides STAC_MAX_PAGES.
    #[arg(long)]
    max_pages: Option<usize>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a value and describe it.
    Show { href: String },
    /// List a catalog's collections.
    Collections {
        href: String,
        #[arg(long)]
        filter: Option<String>,
        /// Collection ids to select; prints the combined extent.
        #[arg(long)]
        select: Vec<String>,
    },
    /// Ask the natural-language search service for matching collections.
    Search {
        query: String,
        #[arg(long)]
        catalog: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = real_main(Args::parse()).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn real_main(args: Args) -> Result<(), String> {
    let mut config = ViewerConfig::from_env();
    if let Some(url) = args.search_api {
        config.search_api = Some(url);
    }
    if let Some(max_pages) = args.max_pages {
        config.pagination = PaginationPolicy { max_pages };
    }
    let mut session = ViewerSession::new(Arc::new(HttpFetcher::new()), config);

    match args.command {
        Command::Show { href } => cmd_show(&mut session, &href).await,
        Command::Collections {
            href,
            filter,
            select,
        } => cmd_collections(&mut session, &href, filter.as_deref(), select).await,
        Command::Search { query, catalog } => cmd_search(&mut session, &query, &catalog).await,
    }
}

fn local_source(href: &str) -> Option<Box<dyn ByteSource>> {
    match Locator::parse(href) {
        Locator::Local { href } => Some(Box::new(DiskFile::new(href))),
        Locator::Remote { .. } => None,
    }
}

async fn open(session: &mut ViewerSession, href: &str) -> Result<(), String> {
    session.open(href, local_source(href)).await;
    match &session.load_status().error {
        Some(err) => Err(err.clone()),
        None => Ok(()),
    }
}

async fn cmd_show(session: &mut ViewerSession, href: &str) -> Result<(), String> {
    open(session, href).await?;
    let Some(view) = session.view() else {
        return Err(format!("nothing loaded from {href}"));
    };
    if let ValueView::Invalid { message } = &view {
        return Err(message.clone());
    }

    let status = session.load_status();
    let value = status.value.as_ref().ok_or("nothing loaded")?;
    println!("{}\t{}", view.heading(), value.id.as_deref().unwrap_or("-"));
    if let Some(title) = &value.title {
        println!("title\t{title}");
    }
    if let Some(description) = &value.description {
        println!("description\t{description}");
    }
    if let ValueView::ItemCollection {
        columnar_path: Some(path),
    } = &view
    {
        println!("columnar\t{path}");
    }
    for layer in session.map_layers() {
        println!("layer\t{}", layer.id);
    }
    if let Some(panels) = session.search_panels() {
        for link in &panels.item_search {
            println!(
                "item-search\t{}\t{}",
                link.method.as_deref().unwrap_or("GET"),
                link.href
            );
        }
        if let Some(catalog) = &panels.natural_language_catalog {
            println!("collection-search\t{catalog}");
        }
    }
    if !session.state().collections.is_empty() {
        println!("collections\t{}", session.state().collections.len());
    }
    Ok(())
}

async fn cmd_collections(
    session: &mut ViewerSession,
    href: &str,
    filter: Option<&str>,
    select: Vec<String>,
) -> Result<(), String> {
    open(session, href).await?;

    let collections = &session.state().collections;
    let shown = match filter {
        Some(query) => filter_collections(collections, query),
        None => collections.iter().collect(),
    };
    for collection in shown {
        print_collection(collection);
    }
    if let Some(err) = &session.collections_status().error {
        eprintln!("warning: {err}");
    }

    if !select.is_empty() {
        for id in select {
            session.dispatch(AppAction::SelectCollection(id));
        }
        let count = session.selected_collections().len();
        println!("{}", selection_label(count));
        if let Some(bbox) = selected_extent(session.state()) {
            let [w, s, e, n] = bbox.to_array();
            println!("extent\t{w}\t{s}\t{e}\t{n}");
        }
    }
    Ok(())
}

async fn cmd_search(
    session: &mut ViewerSession,
    query: &str,
    catalog: &str,
) -> Result<(), String> {
    session.search(query, catalog).await;
    let status = session.search_status();
    if let Some(err) = &status.error {
        return Err(err.clone());
    }
    for result in status.results.iter().flatten() {
        println!("{}", search_line(result));
    }
    Ok(())
}

fn search_line(result: &SearchResult) -> String {
    format!(
        "{}\t{}",
        result.collection_id.as_deref().unwrap_or("-"),
        result.explanation.as_deref().unwrap_or("")
    )
}

fn print_collection(collection: &catalog::Collection) {
    let bbox = collection
        .bbox()
        .map(|b| {
            let [w, s, e, n] = b.to_array();
            format!("{w},{s},{e},{n}")
        })
        .unwrap_or_else(|| "-".to_string());
    println!("{}\t{}\t{bbox}", collection.id, collection.display_name());
}
