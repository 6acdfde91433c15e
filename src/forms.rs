//! Review, login and registration forms
//!
//! Forms hold their field text and focus, validate on submit, and only hand
//! out an API payload when validation passes. Validation failures mark the
//! offending field and set an inline message; no request is produced.

use thiserror::Error;

use crate::data::api::{Credentials, NewReview, NewUser};
use crate::data::User;

/// Minimum review length after trimming
pub const REVIEW_MIN_CHARS: usize = 10;

/// Maximum review length after trimming
pub const REVIEW_MAX_CHARS: usize = 1000;

/// Minimum password length at registration
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Client-side validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please select a rating")]
    RatingMissing,

    #[error("Rating must be between 1 and 5, got {0}")]
    RatingOutOfRange(u8),

    #[error("Review must be at least 10 characters")]
    TextTooShort,

    #[error("Review must be at most 1000 characters")]
    TextTooLong,

    #[error("You must be logged in to submit a review.")]
    NotLoggedIn,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Password must be at least 6 characters long")]
    PasswordTooShort,

    #[error("{0} is required")]
    Required(&'static str),
}

/// Tone of an inline form message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Error,
}

/// Inline message shown under a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl FormMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Success,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

/// Colour band of the review character counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    Warning,
    Danger,
}

/// Checks a review's rating and text
///
/// Returns the rating and trimmed text on success.
pub fn validate_review(rating: Option<u8>, text: &str) -> Result<(u8, String), ValidationError> {
    let rating = rating.ok_or(ValidationError::RatingMissing)?;
    if !(1..=5).contains(&rating) {
        return Err(ValidationError::RatingOutOfRange(rating));
    }
    let text = text.trim();
    let len = text.chars().count();
    if len < REVIEW_MIN_CHARS {
        return Err(ValidationError::TextTooShort);
    }
    if len > REVIEW_MAX_CHARS {
        return Err(ValidationError::TextTooLong);
    }
    Ok((rating, text.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewField {
    #[default]
    Rating,
    Text,
}

/// The "add a review" form on the place detail screen
#[derive(Debug, Clone, Default)]
pub struct ReviewForm {
    pub rating: Option<u8>,
    pub text: String,
    pub focus: ReviewField,
    /// Fields that failed the last validation
    pub invalid: Vec<ReviewField>,
    pub message: Option<FormMessage>,
    /// A submission is in flight
    pub submitting: bool,
}

impl ReviewForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_rating(&mut self, rating: u8) {
        self.rating = Some(rating.clamp(1, 5));
        self.invalid.retain(|f| *f != ReviewField::Rating);
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ReviewField::Rating => ReviewField::Text,
            ReviewField::Text => ReviewField::Rating,
        };
    }

    pub fn push_char(&mut self, c: char) {
        if self.text.chars().count() < REVIEW_MAX_CHARS {
            self.text.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.text.pop();
    }

    /// Live counter text, e.g. "42/1000 characters"
    pub fn char_count_label(&self) -> String {
        format!("{}/{} characters", self.text.chars().count(), REVIEW_MAX_CHARS)
    }

    pub fn counter_level(&self) -> CounterLevel {
        match self.text.chars().count() {
            n if n > 900 => CounterLevel::Danger,
            n if n > 800 => CounterLevel::Warning,
            _ => CounterLevel::Normal,
        }
    }

    /// Validates the form and builds the review payload
    ///
    /// On failure the offending fields are marked and an inline error is set.
    pub fn submit(&mut self, place_id: &str, user: Option<&User>) -> Result<NewReview, ValidationError> {
        self.invalid.clear();
        let result = self.build(place_id, user);
        match &result {
            Ok(_) => {
                self.submitting = true;
                self.message = None;
            }
            Err(e) => {
                self.message = Some(FormMessage::error(e.to_string()));
            }
        }
        result
    }

    fn build(&mut self, place_id: &str, user: Option<&User>) -> Result<NewReview, ValidationError> {
        if self.rating.is_none() {
            self.invalid.push(ReviewField::Rating);
        }
        let trimmed = self.text.trim().chars().count();
        if !(REVIEW_MIN_CHARS..=REVIEW_MAX_CHARS).contains(&trimmed) {
            self.invalid.push(ReviewField::Text);
        }

        let (rating, text) = validate_review(self.rating, &self.text)?;
        let user = user.ok_or(ValidationError::NotLoggedIn)?;

        Ok(NewReview {
            place_id: place_id.to_string(),
            user_id: user.id.clone(),
            rating,
            text,
        })
    }

    /// Clears the fields after a successful submission
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Email,
    Password,
}

/// Email + password login form
#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    /// Success note carried over from registration
    pub notice: Option<String>,
    pub submitting: bool,
}

impl LoginForm {
    /// Login form opened right after registering
    pub fn after_registration(email: &str) -> Self {
        Self {
            email: email.to_string(),
            focus: LoginField::Password,
            notice: Some("Account created successfully!".to_string()),
            ..Default::default()
        }
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            LoginField::Email => LoginField::Password,
            LoginField::Password => LoginField::Email,
        };
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            LoginField::Email => &mut self.email,
            LoginField::Password => &mut self.password,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    pub fn submit(&mut self) -> Result<Credentials, ValidationError> {
        let result = if self.email.trim().is_empty() {
            Err(ValidationError::Required("Email"))
        } else if self.password.is_empty() {
            Err(ValidationError::Required("Password"))
        } else {
            Ok(Credentials {
                email: self.email.trim().to_string(),
                password: self.password.clone(),
            })
        };
        match &result {
            Ok(_) => {
                self.error = None;
                self.notice = None;
                self.submitting = true;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterField {
    #[default]
    FirstName,
    LastName,
    Email,
    Password,
    Confirm,
}

impl RegisterField {
    const ORDER: [RegisterField; 5] = [
        RegisterField::FirstName,
        RegisterField::LastName,
        RegisterField::Email,
        RegisterField::Password,
        RegisterField::Confirm,
    ];

    fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    fn previous(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

/// Account registration form
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub focus: RegisterField,
    pub message: Option<FormMessage>,
    pub submitting: bool,
}

impl RegisterForm {
    pub fn next_field(&mut self) {
        self.focus = self.focus.next();
    }

    pub fn previous_field(&mut self) {
        self.focus = self.focus.previous();
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            RegisterField::FirstName => &mut self.first_name,
            RegisterField::LastName => &mut self.last_name,
            RegisterField::Email => &mut self.email,
            RegisterField::Password => &mut self.password,
            RegisterField::Confirm => &mut self.confirm,
        }
    }

    pub fn push_char(&mut self, c: char) {
        self.focused_mut().push(c);
    }

    pub fn backspace(&mut self) {
        self.focused_mut().pop();
    }

    /// Live mismatch indicator for the confirmation field
    pub fn confirm_mismatch(&self) -> bool {
        !self.confirm.is_empty() && self.confirm != self.password
    }

    pub fn submit(&mut self) -> Result<NewUser, ValidationError> {
        let result = self.build();
        match &result {
            Ok(_) => {
                self.message = None;
                self.submitting = true;
            }
            Err(e) => self.message = Some(FormMessage::error(e.to_string())),
        }
        result
    }

    fn build(&self) -> Result<NewUser, ValidationError> {
        if self.first_name.trim().is_empty() {
            return Err(ValidationError::Required("First name"));
        }
        if self.last_name.trim().is_empty() {
            return Err(ValidationError::Required("Last name"));
        }
        if self.email.trim().is_empty() {
            return Err(ValidationError::Required("Email"));
        }
        if self.password != self.confirm {
            return Err(ValidationError::PasswordMismatch);
        }
        if self.password.chars().count() < PASSWORD_MIN_CHARS {
            return Err(ValidationError::PasswordTooShort);
        }
        Ok(NewUser {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        })
    }
}
