//! Amenity id to name lookup

use std::collections::HashMap;

use crate::data::Amenity;

/// Maps amenity ids to display names
///
/// Populated once per renderer lifetime. Ids with no entry resolve to
/// themselves, which also lets fallback records (that already carry names)
/// pass through unchanged.
#[derive(Debug, Clone, Default)]
pub struct AmenityCache {
    names: HashMap<String, String>,
    populated: bool,
}

impl AmenityCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fills the cache from an amenity listing and marks it populated
    pub fn populate(&mut self, amenities: Vec<Amenity>) {
        self.names
            .extend(amenities.into_iter().map(|a| (a.id, a.name)));
        self.populated = true;
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Display name for an id, or the id itself when unknown
    pub fn name_for<'a>(&'a self, id: &'a str) -> &'a str {
        self.names.get(id).map(String::as_str).unwrap_or(id)
    }

    /// Resolves a list of ids, keeping their order
    pub fn resolve(&self, ids: &[String]) -> Vec<String> {
        ids.iter().map(|id| self.name_for(id).to_string()).collect()
    }
}
