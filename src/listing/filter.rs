//! Price filter and text search predicates
//!
//! Both predicates are kept as explicit state and always evaluated together,
//! so a card is visible iff it passes the price limit AND the search query,
//! whichever of the two was changed last.

use crate::data::DisplayPlace;

/// Price limits offered by the filter control; 0 means no limit
pub const PRICE_STEPS: [u32; 5] = [0, 50, 100, 200, 300];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingFilter {
    /// Maximum price per night; 0 disables the limit
    pub max_price: u32,
    /// Lowercased search query, matched as a plain substring; only the empty
    /// string matches everything
    query: String,
}

impl ListingFilter {
    pub fn new(max_price: u32, query: &str) -> Self {
        let mut filter = Self {
            max_price,
            query: String::new(),
        };
        filter.set_query(query);
        filter
    }

    pub fn set_query(&mut self, query: &str) {
        self.query = query.to_lowercase();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn price_ok(&self, price: f64) -> bool {
        self.max_price == 0 || price <= self.max_price as f64
    }

    pub fn search_ok(&self, place: &DisplayPlace) -> bool {
        self.query.is_empty()
            || place.title.to_lowercase().contains(&self.query)
            || place.description.to_lowercase().contains(&self.query)
    }

    pub fn matches(&self, place: &DisplayPlace) -> bool {
        self.price_ok(place.price) && self.search_ok(place)
    }

    pub fn is_active(&self) -> bool {
        self.max_price != 0 || !self.query.is_empty()
    }

    /// Label for the current price limit, e.g. "All prices" or "≤ 100 gold"
    pub fn price_label(&self) -> String {
        if self.max_price == 0 {
            "All prices".to_string()
        } else {
            format!("≤ {} gold", self.max_price)
        }
    }
}

/// Next entry of `PRICE_STEPS` after `current`, wrapping to "no limit"
pub fn next_price_step(current: u32) -> u32 {
    PRICE_STEPS
        .iter()
        .copied()
        .find(|step| *step > current)
        .unwrap_or(0)
}
