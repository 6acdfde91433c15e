//! Place detail screen state
//!
//! Holds one place with its reviews, host name and the review form. Each
//! piece arrives separately from a background task and is applied as it
//! comes in; a failure in one piece never blanks the others.

use crate::data::api::{ApiError, NewReview};
use crate::data::{average_rating, review_count_label, DisplayPlace, Place, PublicUser, Rating, Review, User};
use crate::forms::{FormMessage, ReviewForm, ValidationError};
use crate::listing::normalize::to_display;
use crate::listing::{AmenityCache, ListingConfig};

pub const UNKNOWN_HOST: &str = "Unknown Host";

#[derive(Debug, Clone, PartialEq)]
pub enum DetailStatus {
    Loading,
    Loaded(DisplayPlace),
    /// Place could not be loaded; message for the error panel
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReviewsStatus {
    Loading,
    Loaded(Vec<Review>),
    Failed,
}

/// Whether the current user may add a review
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAccess {
    /// Place not loaded, or an offline sample place
    Unavailable,
    LoginRequired,
    OwnPlace,
    AlreadyReviewed,
    Allowed,
}

impl ReviewAccess {
    /// Notice shown instead of the review form
    pub fn notice(&self) -> Option<&'static str> {
        match self {
            ReviewAccess::Unavailable => Some("Reviews are unavailable for this place."),
            ReviewAccess::LoginRequired => Some("Please log in to submit a review."),
            ReviewAccess::OwnPlace => Some("You cannot review your own place."),
            ReviewAccess::AlreadyReviewed => Some("You have already reviewed this place."),
            ReviewAccess::Allowed => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlaceDetail {
    pub place_id: String,
    pub status: DetailStatus,
    pub reviews: ReviewsStatus,
    /// `None` until the host lookup finishes
    host: Option<String>,
    pub form: ReviewForm,
    /// Sample place shown while the API is unreachable
    offline: bool,
}

impl PlaceDetail {
    /// Detail screen waiting for its API requests
    pub fn loading(place_id: &str) -> Self {
        Self {
            place_id: place_id.to_string(),
            status: DetailStatus::Loading,
            reviews: ReviewsStatus::Loading,
            host: None,
            form: ReviewForm::new(),
            offline: false,
        }
    }

    /// Detail screen for a place that only exists locally
    pub fn offline(place: DisplayPlace) -> Self {
        Self {
            place_id: place.id.clone(),
            status: DetailStatus::Loaded(place),
            reviews: ReviewsStatus::Loaded(Vec::new()),
            host: Some(UNKNOWN_HOST.to_string()),
            form: ReviewForm::new(),
            offline: true,
        }
    }

    pub fn is_for(&self, place_id: &str) -> bool {
        self.place_id == place_id
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    pub fn place(&self) -> Option<&DisplayPlace> {
        match &self.status {
            DetailStatus::Loaded(place) => Some(place),
            _ => None,
        }
    }

    /// Applies the place lookup
    ///
    /// Returns the owner id when the host name still has to be fetched.
    pub fn apply_place(
        &mut self,
        result: Result<Place, ApiError>,
        amenities: &AmenityCache,
        config: &ListingConfig,
    ) -> Option<String> {
        match result {
            Ok(place) => {
                let owner_id = place.owner_id.clone();
                self.status = DetailStatus::Loaded(to_display(&place, amenities, None, config));
                if owner_id.is_none() {
                    self.host = Some(UNKNOWN_HOST.to_string());
                }
                owner_id
            }
            Err(e) => {
                tracing::warn!(place_id = %self.place_id, error = %e, "failed to load place");
                self.status = DetailStatus::Failed(e.user_message("Failed to load place details."));
                None
            }
        }
    }

    pub fn apply_reviews(&mut self, result: Result<Vec<Review>, ApiError>) {
        self.reviews = match result {
            Ok(reviews) => ReviewsStatus::Loaded(reviews),
            Err(e) => {
                tracing::warn!(place_id = %self.place_id, error = %e, "failed to load reviews");
                ReviewsStatus::Failed
            }
        };
    }

    pub fn apply_host(&mut self, result: Result<PublicUser, ApiError>) {
        self.host = Some(match result {
            Ok(user) => format!("{} {}", user.first_name, user.last_name),
            Err(_) => UNKNOWN_HOST.to_string(),
        });
    }

    /// Host name, or `None` while the lookup is pending
    pub fn host_name(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn loaded_reviews(&self) -> &[Review] {
        match &self.reviews {
            ReviewsStatus::Loaded(reviews) => reviews,
            _ => &[],
        }
    }

    /// Average over the loaded reviews
    pub fn average_rating(&self) -> Rating {
        average_rating(self.loaded_reviews())
    }

    pub fn review_count_label(&self) -> String {
        review_count_label(self.loaded_reviews().len())
    }

    pub fn review_access(&self, user: Option<&User>) -> ReviewAccess {
        let Some(place) = self.place() else {
            return ReviewAccess::Unavailable;
        };
        if self.offline {
            return ReviewAccess::Unavailable;
        }
        let Some(user) = user else {
            return ReviewAccess::LoginRequired;
        };
        if place.owner_id.as_deref() == Some(user.id.as_str()) {
            return ReviewAccess::OwnPlace;
        }
        let reviewed = self
            .loaded_reviews()
            .iter()
            .any(|r| r.user_id.as_deref() == Some(user.id.as_str()));
        if reviewed {
            return ReviewAccess::AlreadyReviewed;
        }
        ReviewAccess::Allowed
    }

    /// Validates the review form for submission
    pub fn submit_review(&mut self, user: Option<&User>) -> Result<NewReview, ValidationError> {
        if self.review_access(user) == ReviewAccess::LoginRequired {
            self.form.message = Some(FormMessage::error(ValidationError::NotLoggedIn.to_string()));
            return Err(ValidationError::NotLoggedIn);
        }
        let place_id = self.place_id.clone();
        self.form.submit(&place_id, user)
    }

    /// Applies the submission result
    ///
    /// Returns true when the review list should be fetched again.
    pub fn apply_submit(&mut self, result: Result<Review, ApiError>) -> bool {
        match result {
            Ok(_) => {
                self.form.reset();
                self.form.message = Some(FormMessage::success("Review submitted successfully!"));
                true
            }
            Err(e) => {
                tracing::warn!(place_id = %self.place_id, error = %e, "review submission failed");
                self.form.submitting = false;
                self.form.message = Some(FormMessage::error(
                    e.user_message("Failed to submit review. Please try again."),
                ));
                false
            }
        }
    }
}
