//! Paginated move table with an optional type filter.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};

use crate::api::{ApiClient, NamedResource};
use crate::error::ApiError;
use crate::state::MoveDetail;

pub const MOVES_PER_PAGE: usize = 20;
pub const MOVES_PER_PAGE_FILTERED: usize = 50;
const MOVE_DETAIL_CONCURRENCY: usize = 12;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveQuery {
    /// 1-based; zero is read as the first page.
    pub page: usize,
    pub move_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePage {
    pub page: usize,
    pub per_page: usize,
    pub total: usize,
    pub total_pages: usize,
    pub moves: Vec<MoveDetail>,
    /// Distinct move types on this page, sorted.
    pub types: Vec<String>,
}

/// Loads one page of moves with their details. Without a type filter only
/// the requested listing page is resolved; with one, every move is resolved
/// so the filtered total is exact. Moves whose detail fails are skipped.
pub async fn load_move_page(client: &ApiClient, query: &MoveQuery) -> Result<MovePage, ApiError> {
    let page = query.page.max(1);
    let move_type = query
        .move_type
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_lowercase);
    let per_page = if move_type.is_some() {
        MOVES_PER_PAGE_FILTERED
    } else {
        MOVES_PER_PAGE
    };
    // `None` when the page lies beyond any addressable offset.
    let offset = (page - 1).checked_mul(per_page);
    let count = client.get_resource_count("move").await?;

    let (total, moves) = match move_type {
        Some(move_type) => {
            let listing = client.get_list_page("move", count, 0).await?;
            let matching: Vec<MoveDetail> = fetch_move_details(client, &listing.results)
                .await
                .into_iter()
                .filter(|detail| detail.move_type.as_deref() == Some(move_type.as_str()))
                .collect();
            let total = matching.len();
            let moves = matching
                .into_iter()
                .skip(offset.unwrap_or(usize::MAX))
                .take(per_page)
                .collect();
            (total, moves)
        }
        None => match offset.and_then(|offset| u32::try_from(offset).ok()) {
            Some(offset) => {
                let listing = client
                    .get_list_page("move", per_page as u32, offset)
                    .await?;
                let moves = fetch_move_details(client, &listing.results).await;
                (listing.count as usize, moves)
            }
            None => (count as usize, Vec::new()),
        },
    };

    let mut types: Vec<String> = moves
        .iter()
        .filter_map(|detail: &MoveDetail| detail.move_type.clone())
        .collect();
    types.sort();
    types.dedup();

    Ok(MovePage {
        page,
        per_page,
        total,
        total_pages: total.div_ceil(per_page),
        moves,
        types,
    })
}

async fn fetch_move_details(client: &ApiClient, listing: &[NamedResource]) -> Vec<MoveDetail> {
    let results: Vec<Result<MoveDetail, ApiError>> = stream::iter(listing)
        .map(|item| client.get_move(&item.name))
        .buffered(MOVE_DETAIL_CONCURRENCY)
        .collect()
        .await;
    listing
        .iter()
        .zip(results)
        .filter_map(|(item, result)| match result {
            Ok(detail) => Some(detail),
            Err(err) => {
                tracing::warn!(name = %item.name, error = %err, "move detail failed");
                None
            }
        })
        .collect()
}
