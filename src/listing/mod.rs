//! Listing renderer: the place card row
//!
//! Owns the last loaded place collection, the amenity cache, the filter and
//! search state and the rendered cards. Loads are tagged with a generation
//! number; only the newest load may replace the collection.
//!
//! Loading is split in two so the network part can run on a background task:
//! [`ListingRenderer::begin_load`] issues a [`LoadRequest`], [`fetch_listing`]
//! performs the requests, and [`ListingRenderer::finish_load`] applies the
//! result. [`ListingRenderer::load_places`] runs all three inline.

pub mod amenities;
pub mod config;
pub mod filter;
pub mod normalize;
pub mod scroll;

pub use amenities::AmenityCache;
pub use config::{ImageStrategy, ListingConfig, RatingStrategy, CARD_WIDTH};
pub use filter::{next_price_step, ListingFilter, PRICE_STEPS};
pub use scroll::CardScroll;

use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};

use crate::cache::{CacheManager, PLACES_SNAPSHOT_KEY};
use crate::data::api::{ApiClient, ApiError};
use crate::data::{fallback_places, Amenity, DisplayPlace, Place, Rating, Review};

/// Snapshot freshness window in hours
const SNAPSHOT_TTL_HOURS: u64 = 24 * 7;

/// One rendered listing card
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub place: DisplayPlace,
    /// Whether the card passes the current filter and search
    pub visible: bool,
}

impl Card {
    pub fn place_id(&self) -> &str {
        &self.place.id
    }

    pub fn price(&self) -> f64 {
        self.place.price
    }

    pub fn rating(&self) -> Rating {
        self.place.rating
    }

    /// Navigation target for the card's detail view
    pub fn route(&self) -> String {
        format!("/place/{}", self.place.id)
    }

    /// Bottom-bar amenity summary, e.g. "3 amenities"
    pub fn amenity_summary(&self) -> String {
        let n = self.place.amenities.len();
        format!("{} amenit{}", n, if n == 1 { "y" } else { "ies" })
    }
}

/// Where the currently displayed collection came from
#[derive(Debug, Clone, PartialEq)]
pub enum ListingSource {
    /// Nothing loaded yet
    Empty,
    /// Fresh data from the API
    Api { loaded_at: DateTime<Local> },
    /// A load failed; the previous collection is still shown
    Previous,
    /// A load failed; showing the on-disk snapshot
    Snapshot {
        saved_at: DateTime<Utc>,
        /// Older than the snapshot time-to-live
        expired: bool,
    },
    /// A load failed and nothing else was available
    Fallback,
}

/// Parameters for one listing load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadRequest {
    pub generation: u64,
    /// Fetch `/api/v3/amenities/` before places
    pub fetch_amenities: bool,
    /// Fetch each place's reviews for the rating
    pub fetch_reviews: bool,
}

/// Raw result of a listing load
#[derive(Debug, Clone, Default)]
pub struct FetchedListing {
    /// Amenity listing, when requested and successfully fetched
    pub amenities: Option<Vec<Amenity>>,
    pub places: Vec<Place>,
    /// Review lists by place id; places whose reviews failed are absent
    pub reviews: HashMap<String, Vec<Review>>,
}

/// Performs the network part of a listing load
///
/// Amenities are fetched first and a failure there does not abort the load.
/// Review lists are fetched concurrently once places are known.
pub async fn fetch_listing(
    client: &ApiClient,
    request: &LoadRequest,
) -> Result<FetchedListing, ApiError> {
    let amenities = if request.fetch_amenities {
        match client.fetch_amenities().await {
            Ok(amenities) => Some(amenities),
            Err(e) => {
                tracing::warn!(error = %e, "amenity load failed; showing raw ids");
                None
            }
        }
    } else {
        None
    };

    let places = client.fetch_places().await?;

    let mut reviews = HashMap::new();
    if request.fetch_reviews {
        let futures = places.iter().map(|p| client.fetch_reviews(&p.id));
        let results = futures::future::join_all(futures).await;
        for (place, result) in places.iter().zip(results) {
            match result {
                Ok(list) => {
                    reviews.insert(place.id.clone(), list);
                }
                Err(e) => {
                    tracing::debug!(place = %place.id, error = %e, "review load failed");
                }
            }
        }
    }

    Ok(FetchedListing {
        amenities,
        places,
        reviews,
    })
}

/// The listing component state
#[derive(Debug)]
pub struct ListingRenderer {
    config: ListingConfig,
    amenities: AmenityCache,
    /// Current collection; cards are always a projection of it
    places: Vec<DisplayPlace>,
    cards: Vec<Card>,
    filter: ListingFilter,
    source: ListingSource,
    /// Last generation handed out by `begin_load`
    generation: u64,
    loading: bool,
    /// Index into the visible cards
    selected: usize,
    scroll: CardScroll,
    viewport_width: u16,
    snapshots: Option<CacheManager>,
}

impl ListingRenderer {
    pub fn new(config: ListingConfig) -> Self {
        let scroll = CardScroll::new(config.card_scroll_delta);
        Self {
            config,
            amenities: AmenityCache::new(),
            places: Vec::new(),
            cards: Vec::new(),
            filter: ListingFilter::default(),
            source: ListingSource::Empty,
            generation: 0,
            loading: false,
            selected: 0,
            scroll,
            viewport_width: 80,
            snapshots: None,
        }
    }

    /// Enables the on-disk snapshot used as a second-tier fallback
    pub fn with_snapshots(mut self, cache: CacheManager) -> Self {
        self.snapshots = Some(cache);
        self
    }

    /// Starts with a given filter already applied
    pub fn with_filter(mut self, filter: ListingFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &ListingConfig {
        &self.config
    }

    pub fn amenities(&self) -> &AmenityCache {
        &self.amenities
    }

    pub fn places(&self) -> &[DisplayPlace] {
        &self.places
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn filter(&self) -> &ListingFilter {
        &self.filter
    }

    pub fn source(&self) -> &ListingSource {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn scroll(&self) -> &CardScroll {
        &self.scroll
    }

    pub fn visible_cards(&self) -> impl Iterator<Item = &Card> {
        self.cards.iter().filter(|c| c.visible)
    }

    pub fn visible_count(&self) -> usize {
        self.visible_cards().count()
    }

    /// Place from the current collection by id
    pub fn place(&self, id: &str) -> Option<&DisplayPlace> {
        self.places.iter().find(|p| p.id == id)
    }

    /// Issues a new load generation
    pub fn begin_load(&mut self) -> LoadRequest {
        self.generation += 1;
        self.loading = true;
        LoadRequest {
            generation: self.generation,
            fetch_amenities: !self.amenities.is_populated(),
            fetch_reviews: self.config.rating_strategy.needs_reviews(),
        }
    }

    /// Applies the result of a load
    ///
    /// Returns `false` when the result belongs to a superseded generation and
    /// was discarded. Errors never propagate: the renderer degrades to the
    /// previous collection, the snapshot, or the fallback set.
    pub fn finish_load(
        &mut self,
        generation: u64,
        result: Result<FetchedListing, ApiError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "discarding stale listing load"
            );
            return false;
        }
        self.loading = false;

        match result {
            Ok(fetched) => {
                if let Some(amenities) = fetched.amenities {
                    self.amenities.populate(amenities);
                }
                let collection = self.normalize(&fetched.places, &fetched.reviews);
                self.save_snapshot(&fetched.places);
                tracing::info!(count = collection.len(), generation, "listing loaded");
                self.source = ListingSource::Api {
                    loaded_at: Local::now(),
                };
                self.render(collection);
            }
            Err(e) => {
                tracing::warn!(error = %e, generation, "listing load failed");
                self.degrade();
            }
        }
        true
    }

    /// Loads the listing inline: amenities, then places, then reviews
    pub async fn load_places(&mut self, client: &ApiClient) -> bool {
        let request = self.begin_load();
        let result = fetch_listing(client, &request).await;
        self.finish_load(request.generation, result)
    }

    /// Replaces every card with one card per entry, in collection order
    ///
    /// The collection becomes the current one. Rendering the same collection
    /// again yields identical cards.
    pub fn render(&mut self, collection: Vec<DisplayPlace>) {
        self.places = collection;
        self.cards = self
            .places
            .iter()
            .map(|place| Card {
                visible: self.filter.matches(place),
                place: place.clone(),
            })
            .collect();
        self.after_visibility_change();
    }

    /// Sets the price limit (0 = no limit) and recomputes visibility
    pub fn apply_filter(&mut self, max_price: u32) {
        self.filter.max_price = max_price;
        self.refresh_visibility();
    }

    /// Sets the search query and recomputes visibility
    pub fn apply_search(&mut self, query: &str) {
        self.filter.set_query(query);
        self.refresh_visibility();
    }

    /// Advances the price limit to the next preset
    pub fn cycle_price_filter(&mut self) {
        self.apply_filter(next_price_step(self.filter.max_price));
    }

    fn refresh_visibility(&mut self) {
        for card in &mut self.cards {
            card.visible = self.filter.matches(&card.place);
        }
        self.after_visibility_change();
    }

    fn after_visibility_change(&mut self) {
        let count = self.visible_count();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
        self.scroll.clamp(self.max_offset());
        self.follow_selection();
    }

    /// Currently selected visible card
    pub fn selected_card(&self) -> Option<&Card> {
        self.visible_cards().nth(self.selected)
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn select_next(&mut self) {
        let count = self.visible_count();
        if count == 0 {
            return;
        }
        self.selected = (self.selected + 1) % count;
        self.follow_selection();
    }

    pub fn select_previous(&mut self) {
        let count = self.visible_count();
        if count == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            count - 1
        } else {
            self.selected - 1
        };
        self.follow_selection();
    }

    /// Scrolls the row back by one step
    pub fn scroll_back(&mut self) {
        self.scroll.back();
        self.select_first_in_view();
    }

    /// Scrolls the row forward by one step
    pub fn scroll_forward(&mut self) {
        self.scroll.forward(self.max_offset());
        self.select_first_in_view();
    }

    /// Advances the eased scroll one frame
    pub fn tick(&mut self) -> bool {
        self.scroll.tick()
    }

    /// Records the width the card row is drawn in
    pub fn set_viewport_width(&mut self, width: u16) {
        self.viewport_width = width.max(1);
        self.follow_selection();
    }

    /// Largest scroll offset that still shows the last card
    fn max_offset(&self) -> u16 {
        let count = self.visible_count() as u16;
        count.saturating_sub(1).saturating_mul(CARD_WIDTH)
    }

    /// Keeps the selected card inside the viewport
    fn follow_selection(&mut self) {
        let left = (self.selected as u16).saturating_mul(CARD_WIDTH);
        let right = left.saturating_add(CARD_WIDTH);
        let target = self.scroll.target();
        if left < target {
            self.scroll.scroll_to(left, self.max_offset());
        } else if right > target.saturating_add(self.viewport_width) {
            let wanted = right.saturating_sub(self.viewport_width);
            self.scroll.scroll_to(wanted, self.max_offset());
        }
    }

    /// After a scroll step, moves the selection onto the first card in view
    fn select_first_in_view(&mut self) {
        let count = self.visible_count();
        if count == 0 {
            return;
        }
        let first = self.scroll.target().div_ceil(CARD_WIDTH) as usize;
        self.selected = first.min(count - 1);
    }

    /// Status line describing degraded data, if any
    pub fn status_note(&self) -> Option<String> {
        if self.loading && self.places.is_empty() {
            return Some("Loading places...".to_string());
        }
        match &self.source {
            ListingSource::Empty | ListingSource::Api { .. } => None,
            ListingSource::Previous => {
                Some("Could not refresh places; showing previous results".to_string())
            }
            ListingSource::Snapshot { saved_at, expired } => Some(format!(
                "Offline{}: showing places saved {}",
                if *expired { " (stale)" } else { "" },
                saved_at.with_timezone(&Local).format("%Y-%m-%d %H:%M")
            )),
            ListingSource::Fallback => Some("Offline: showing sample places".to_string()),
        }
    }

    fn normalize(
        &self,
        places: &[Place],
        reviews: &HashMap<String, Vec<Review>>,
    ) -> Vec<DisplayPlace> {
        places
            .iter()
            .map(|place| {
                normalize::to_display(
                    place,
                    &self.amenities,
                    reviews.get(&place.id).map(Vec::as_slice),
                    &self.config,
                )
            })
            .collect()
    }

    fn save_snapshot(&self, places: &[Place]) {
        if let Some(cache) = &self.snapshots {
            if let Err(e) = cache.write(PLACES_SNAPSHOT_KEY, &places, SNAPSHOT_TTL_HOURS) {
                tracing::debug!(error = %e, "could not write places snapshot");
            }
        }
    }

    /// Picks what to show after a failed load
    fn degrade(&mut self) {
        if !self.places.is_empty() && self.source != ListingSource::Fallback {
            self.source = ListingSource::Previous;
            return;
        }

        let snapshot = self
            .snapshots
            .as_ref()
            .and_then(|cache| cache.read::<Vec<Place>>(PLACES_SNAPSHOT_KEY))
            .filter(|cached| !cached.data.is_empty());

        let (places, source) = match snapshot {
            Some(cached) => (
                cached.data,
                ListingSource::Snapshot {
                    saved_at: cached.saved_at,
                    expired: cached.is_expired,
                },
            ),
            None => (fallback_places(), ListingSource::Fallback),
        };

        let collection = self.normalize(&places, &HashMap::new());
        self.source = source;
        self.render(collection);
    }
}
