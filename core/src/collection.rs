//! View model for the saved-movies grid.

use crate::resource::ResourceState;
use crate::types::WatchlistEntry;

/// Columns in the saved-movies grid.
pub const GRID_COLUMNS: usize = 3;

/// What the list screen should render.
#[derive(Debug, Clone, PartialEq)]
pub enum CollectionView {
    /// Nothing has arrived yet, whether or not a fetch is in flight.
    Loading,
    /// Fetch failed and there is no earlier data to fall back on.
    Failed(String),
    Empty,
    Grid(Vec<Vec<WatchlistEntry>>),
}

impl CollectionView {
    /// Derive the view from the list resource.
    ///
    /// Data already on screen wins over a spinner or an error: a refetch
    /// in flight or a failed refetch keeps the last good grid visible.
    pub fn from_resource(resource: &ResourceState<Vec<WatchlistEntry>>) -> Self {
        match resource.data() {
            Some(entries) if entries.is_empty() => CollectionView::Empty,
            Some(entries) => CollectionView::Grid(grid_rows(entries, GRID_COLUMNS)),
            None => match resource.error() {
                Some(err) => CollectionView::Failed(err.to_string()),
                // Empty is reserved for a confirmed empty list.
                None => CollectionView::Loading,
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            CollectionView::Grid(rows) => rows.iter().map(Vec::len).sum(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split entries into rows of `columns`, deduplicated by `movie_id`.
pub fn grid_rows(entries: &[WatchlistEntry], columns: usize) -> Vec<Vec<WatchlistEntry>> {
    let mut seen = std::collections::HashSet::new();
    let unique: Vec<WatchlistEntry> = entries
        .iter()
        .filter(|e| seen.insert(e.movie_id))
        .cloned()
        .collect();
    unique
        .chunks(columns.max(1))
        .map(<[WatchlistEntry]>::to_vec)
        .collect()
}
