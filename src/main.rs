//! Headless PokeAPI browser: loads the regional catalog, applies filters and
//! prints the revealed pages, a detail record, or a page of moves.

use std::collections::BTreeSet;
use std::io;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use pokedex_browse::api::ApiClient;
use pokedex_browse::catalog::{default_partitions, region_partition, CatalogEntry};
use pokedex_browse::config::{BrowseConfig, ClientConfig, API_BASE, DEFAULT_ENRICH_BATCH_SIZE};
use pokedex_browse::filter::FilterSpec;
use pokedex_browse::moves::{load_move_page, MoveQuery};
use pokedex_browse::profile::{display_name, gender_ratio, weaknesses};
use pokedex_browse::reveal::DEFAULT_PAGE_SIZE;
use pokedex_browse::session::Session;
use pokedex_browse::state::PokemonDetail;

#[derive(Parser, Debug)]
#[command(name = "pokedex-browse")]
#[command(about = "Browse the PokeAPI catalog from the command line")]
struct Args {
    /// Regions to load (default: all nine)
    #[arg(long = "region", value_delimiter = ',')]
    regions: Vec<String>,

    /// Case-insensitive name search
    #[arg(long, short, default_value = "")]
    search: String,

    /// Keep only regions in this list (filter, not load)
    #[arg(long = "only-region", value_delimiter = ',')]
    only_regions: Vec<String>,

    /// Keep Pokemon having any of these types
    #[arg(long = "type", value_delimiter = ',')]
    types: Vec<String>,

    /// Keep Pokemon living in any of these habitats
    #[arg(long = "habitat", value_delimiter = ',')]
    habitats: Vec<String>,

    /// Number of pages to reveal
    #[arg(long, default_value = "1")]
    pages: usize,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Entries enriched per batch when filtering by type or habitat
    #[arg(long, default_value_t = DEFAULT_ENRICH_BATCH_SIZE)]
    batch_size: usize,

    /// Show the full record for a name or id instead of the list
    #[arg(long)]
    detail: Option<String>,

    /// Show a page of moves instead of the list
    #[arg(long)]
    moves_page: Option<usize>,

    /// Restrict the move table to one type
    #[arg(long)]
    move_type: Option<String>,

    #[arg(long, default_value = API_BASE)]
    base_url: String,

    /// Response cache lifetime in seconds
    #[arg(long, default_value = "300")]
    cache_ttl: u64,

    /// Print the final state as JSON
    #[arg(long)]
    dump_state: bool,
}

impl Args {
    fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.base_url.clone(),
            cache_ttl: Duration::from_secs(self.cache_ttl),
        }
    }

    fn browse_config(&self) -> BrowseConfig {
        let partitions = if self.regions.is_empty() {
            default_partitions()
        } else {
            self.regions.iter().map(|name| region_partition(name)).collect()
        };
        BrowseConfig {
            partitions,
            page_size: self.page_size,
            enrich_batch_size: self.batch_size,
        }
    }

    fn filter(&self) -> FilterSpec {
        let set = |items: &[String]| -> BTreeSet<String> {
            items.iter().map(|item| item.trim().to_lowercase()).collect()
        };
        FilterSpec {
            search_term: self.search.clone(),
            partitions: set(&self.only_regions),
            types: set(&self.types),
            habitats: set(&self.habitats),
        }
    }
}

#[tokio::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let client = ApiClient::new(&args.client_config());

    if let Some(page) = args.moves_page {
        let query = MoveQuery {
            page,
            move_type: args.move_type.clone(),
        };
        let moves = load_move_page(&client, &query)
            .await
            .map_err(io::Error::other)?;
        println!(
            "Moves page {}/{} ({} total)",
            moves.page, moves.total_pages, moves.total
        );
        for detail in &moves.moves {
            println!(
                "#{:<4} {:<20} {:<10} {:<9} {}",
                detail.id,
                detail.localized_name("en"),
                detail.move_type.as_deref().unwrap_or("-"),
                detail.damage_class.as_deref().unwrap_or("-"),
                detail
                    .power
                    .map(|power| power.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            );
        }
        return Ok(());
    }

    let mut session = Session::new(client, args.browse_config());

    if let Some(name) = args.detail.as_deref() {
        match session.detail(name).await {
            Some(detail) => print_detail(&detail, &session),
            None => {
                let reason = session.state().message.clone().unwrap_or_default();
                return Err(io::Error::other(format!("no record for {name}: {reason}")));
            }
        }
    } else {
        let catalog = session.load_catalog().await;
        if let Some(error) = catalog.error {
            return Err(io::Error::other(error.to_string()));
        }
        let loaded = catalog.entries.len();
        let filtered = session.search(args.filter()).await.len();
        for _ in 1..args.pages {
            if !session.reveal_more().await {
                break;
            }
        }
        let view = session.reveal();
        println!("{filtered} of {loaded} entries match");
        for entry in view.visible {
            print_entry(entry);
        }
        if view.has_more {
            println!("... more available");
        }
    }

    if let Some(message) = session.state().message.as_deref() {
        tracing::warn!("{message}");
    }
    if args.dump_state {
        let json = serde_json::to_string_pretty(session.state()).map_err(io::Error::other)?;
        println!("{json}");
    }
    Ok(())
}

fn print_entry(entry: &CatalogEntry) {
    let id = entry
        .id()
        .map(|id| format!("#{id:04}"))
        .unwrap_or_else(|| "#????".to_string());
    let types = entry
        .types()
        .map(|types| types.join("/"))
        .unwrap_or_default();
    println!(
        "{id} {:<16} {:<8} {types}",
        display_name(&entry.name),
        entry.partition
    );
}

fn print_detail(detail: &PokemonDetail, session: &Session) {
    println!("#{:04} {}", detail.id, display_name(&detail.name));
    if let Some(genus) = &detail.genus {
        println!("  {genus}");
    }
    println!("  types:      {}", detail.types.join(" / "));
    println!("  weak to:    {}", weaknesses(&detail.types).join(", "));
    println!("  abilities:  {}", detail.abilities.join(", "));
    println!("  height:     {:.1} m", detail.height_m);
    println!("  weight:     {:.1} kg", detail.weight_kg);
    if let Some(habitat) = &detail.habitat {
        println!("  habitat:    {habitat}");
    }
    if let Some(rate) = detail.gender_rate {
        println!("  gender:     {}", gender_ratio(rate));
    }
    for (stat, value) in &detail.stats {
        println!("  {stat:<16}{value}");
    }
    if let Some(image) = detail.preferred_image() {
        println!("  image:      {image}");
    }
    if let Some(text) = &detail.flavor_text {
        println!("  {text}");
    }
    if let Some(chain) = session.state().current_evolution() {
        println!("  evolution:  {}", chain.stages.join(" -> "));
    }
}
