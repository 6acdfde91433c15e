//! Application state management for Placeboard
//!
//! This module contains the main application state, handling keyboard input,
//! applying background results, and state transitions between views. Input
//! and results never touch the network directly: they return `Command`s for
//! the event loop to run.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::cache::CacheManager;
use crate::cli::StartupConfig;
use crate::data::is_fallback_id;
use crate::detail::{PlaceDetail, ReviewAccess};
use crate::forms::{FormMessage, LoginForm, RegisterForm, ReviewField};
use crate::listing::{ListingConfig, ListingRenderer};
use crate::session::AuthStatus;
use crate::tasks::{Command, DetailKey, Message};

/// Application state enum representing the current view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppState {
    /// Waiting for the first listing load
    Loading,
    /// Card row with filter and search
    Listing,
    /// Detail view for one place
    PlaceDetail(String),
    Login,
    Register,
}

/// Main application struct managing state and data
pub struct App {
    /// Current application state/view
    pub state: AppState,
    pub listing: ListingRenderer,
    pub auth: AuthStatus,
    /// Detail screen data for the open place
    pub detail: Option<PlaceDetail>,
    pub login_form: LoginForm,
    pub register_form: RegisterForm,
    /// Typing goes to the search box
    pub search_editing: bool,
    /// Raw text of the search box
    pub search_input: String,
    /// Typing goes to the review form on the detail screen
    pub review_editing: bool,
    /// Scroll offset for the detail view
    pub detail_scroll_offset: u16,
    /// Counts detail screen openings; tags detail requests
    detail_visit: u64,
    /// Flag indicating the application should quit
    pub should_quit: bool,
    /// Flag to show help overlay
    pub show_help: bool,
}

impl App {
    /// Creates a new App with the default listing configuration
    pub fn new() -> Self {
        Self::with_listing(ListingRenderer::new(ListingConfig::default()))
    }

    /// Creates a new App instance with the given startup configuration.
    pub fn with_startup_config(config: &StartupConfig) -> Self {
        let mut listing = ListingRenderer::new(config.listing.clone()).with_filter(config.filter.clone());
        if config.use_snapshots {
            if let Some(cache) = CacheManager::new() {
                listing = listing.with_snapshots(cache);
            }
        }
        let mut app = Self::with_listing(listing);
        app.search_input = config.filter.query().to_string();
        app
    }

    pub fn with_listing(listing: ListingRenderer) -> Self {
        Self {
            state: AppState::Loading,
            listing,
            auth: AuthStatus::Unknown,
            detail: None,
            login_form: LoginForm::default(),
            register_form: RegisterForm::default(),
            search_editing: false,
            search_input: String::new(),
            review_editing: false,
            detail_scroll_offset: 0,
            detail_visit: 0,
            should_quit: false,
            show_help: false,
        }
    }

    /// Requests issued once at start-up
    pub fn initial_commands(&mut self) -> Vec<Command> {
        vec![
            Command::CheckSession,
            Command::LoadPlaces(self.listing.begin_load()),
        ]
    }

    /// Advances animations; called once per UI tick
    pub fn tick(&mut self) -> bool {
        self.listing.tick()
    }

    /// Handles keyboard input events
    ///
    /// Returns the background work the key asked for.
    ///
    /// # Key mappings (listing)
    /// - `h`/`Left`, `l`/`Right`: Move the selection
    /// - `[`/`]`: Scroll the card row back/forward
    /// - `Enter`: Open the selected place
    /// - `f`: Cycle the price filter
    /// - `/`: Edit the search query
    /// - `r`: Reload places
    /// - `L`/`R`: Login/register, `o`: Logout
    /// - `q` or `Esc`: Quit
    pub fn handle_key(&mut self, key_event: KeyEvent) -> Vec<Command> {
        if key_event.modifiers.contains(KeyModifiers::CONTROL)
            && key_event.code == KeyCode::Char('c')
        {
            self.should_quit = true;
            return Vec::new();
        }

        // Help overlay intercepts all keys when shown
        if self.show_help {
            if matches!(
                key_event.code,
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')
            ) {
                self.show_help = false;
            }
            return Vec::new();
        }

        match self.state.clone() {
            AppState::Loading => {
                if key_event.code == KeyCode::Char('q') {
                    self.should_quit = true;
                }
                Vec::new()
            }
            AppState::Listing if self.search_editing => {
                self.handle_search_key(key_event);
                Vec::new()
            }
            AppState::Listing => self.handle_listing_key(key_event),
            AppState::PlaceDetail(place_id) if self.review_editing => {
                self.handle_review_key(key_event, &place_id)
            }
            AppState::PlaceDetail(_) => self.handle_detail_key(key_event),
            AppState::Login => self.handle_login_key(key_event),
            AppState::Register => self.handle_register_key(key_event),
        }
    }

    fn handle_listing_key(&mut self, key_event: KeyEvent) -> Vec<Command> {
        match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Left | KeyCode::Char('h') => self.listing.select_previous(),
            KeyCode::Right | KeyCode::Char('l') => self.listing.select_next(),
            KeyCode::Char('[') => self.listing.scroll_back(),
            KeyCode::Char(']') => self.listing.scroll_forward(),
            KeyCode::Enter => {
                if let Some(card) = self.listing.selected_card() {
                    let place_id = card.place_id().to_string();
                    return self.open_detail(&place_id);
                }
            }
            KeyCode::Char('f') => self.listing.cycle_price_filter(),
            KeyCode::Char('/') => {
                self.search_editing = true;
            }
            KeyCode::Char('r') => return self.reload_places(),
            KeyCode::Char('L') if !self.auth.is_logged_in() => {
                self.login_form = LoginForm::default();
                self.state = AppState::Login;
            }
            KeyCode::Char('R') if !self.auth.is_logged_in() => {
                self.register_form = RegisterForm::default();
                self.state = AppState::Register;
            }
            KeyCode::Char('o') if self.auth.is_logged_in() => {
                return vec![Command::Logout];
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
        Vec::new()
    }

    /// Search box editing: every keystroke re-applies the query
    fn handle_search_key(&mut self, key_event: KeyEvent) {
        match key_event.code {
            KeyCode::Enter => {
                self.search_editing = false;
            }
            KeyCode::Esc => {
                self.search_editing = false;
                self.search_input.clear();
                self.listing.apply_search("");
            }
            KeyCode::Backspace => {
                self.search_input.pop();
                self.listing.apply_search(&self.search_input);
            }
            KeyCode::Char(c) => {
                self.search_input.push(c);
                self.listing.apply_search(&self.search_input);
            }
            _ => {}
        }
    }

    fn handle_detail_key(&mut self, key_event: KeyEvent) -> Vec<Command> {
        match key_event.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
            }
            KeyCode::Esc | KeyCode::Backspace => self.close_detail(),
            KeyCode::Char('j') | KeyCode::Down => {
                self.detail_scroll_offset = self.detail_scroll_offset.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.detail_scroll_offset = self.detail_scroll_offset.saturating_sub(1);
            }
            KeyCode::Char('g') => {
                self.detail_scroll_offset = 0;
            }
            KeyCode::Char('w') => {
                let user = self.auth.user();
                if let Some(detail) = &self.detail {
                    if detail.review_access(user) == ReviewAccess::Allowed {
                        self.review_editing = true;
                    }
                }
            }
            KeyCode::Char('r') => {
                if let AppState::PlaceDetail(place_id) = self.state.clone() {
                    return self.open_detail(&place_id);
                }
            }
            KeyCode::Char('L') if !self.auth.is_logged_in() => {
                self.login_form = LoginForm::default();
                self.state = AppState::Login;
            }
            KeyCode::Char('?') => {
                self.show_help = true;
            }
            _ => {}
        }
        Vec::new()
    }

    /// Review form editing on the detail screen
    ///
    /// `Tab` switches between rating and text, digits set the rating, `Enter`
    /// submits and `Esc` leaves the form.
    fn handle_review_key(&mut self, key_event: KeyEvent, place_id: &str) -> Vec<Command> {
        let user = self.auth.user().cloned();
        let Some(detail) = self.detail.as_mut().filter(|d| d.is_for(place_id)) else {
            self.review_editing = false;
            return Vec::new();
        };
        let form = &mut detail.form;
        match key_event.code {
            KeyCode::Esc => {
                self.review_editing = false;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_focus(),
            KeyCode::Enter => {
                if form.submitting {
                    return Vec::new();
                }
                if let Ok(review) = detail.submit_review(user.as_ref()) {
                    let key = DetailKey {
                        place_id: place_id.to_string(),
                        visit: self.detail_visit,
                    };
                    return vec![Command::SubmitReview { key, review }];
                }
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) if form.focus == ReviewField::Rating => {
                if let Some(rating) = c.to_digit(10).filter(|d| (1..=5).contains(d)) {
                    form.set_rating(rating as u8);
                }
            }
            KeyCode::Left if form.focus == ReviewField::Rating => {
                let rating = form.rating.unwrap_or(1).saturating_sub(1);
                form.set_rating(rating);
            }
            KeyCode::Right if form.focus == ReviewField::Rating => {
                let rating = form.rating.map_or(1, |r| r + 1);
                form.set_rating(rating);
            }
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
        Vec::new()
    }

    fn handle_login_key(&mut self, key_event: KeyEvent) -> Vec<Command> {
        let form = &mut self.login_form;
        match key_event.code {
            KeyCode::Esc => {
                self.state = AppState::Listing;
            }
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Down | KeyCode::Up => form.next_field(),
            KeyCode::Enter => {
                if form.submitting {
                    return Vec::new();
                }
                if let Ok(credentials) = form.submit() {
                    return vec![Command::Login(credentials)];
                }
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
        Vec::new()
    }

    fn handle_register_key(&mut self, key_event: KeyEvent) -> Vec<Command> {
        let form = &mut self.register_form;
        match key_event.code {
            KeyCode::Esc => {
                self.state = AppState::Listing;
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Enter => {
                if form.submitting {
                    return Vec::new();
                }
                if let Ok(user) = form.submit() {
                    return vec![Command::Register(user)];
                }
            }
            KeyCode::Backspace => form.backspace(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        }
        Vec::new()
    }

    /// Applies a background result
    ///
    /// Results for a detail screen that is no longer open are dropped.
    pub fn handle_message(&mut self, message: Message) -> Vec<Command> {
        match message {
            Message::PlacesLoaded { generation, result } => {
                if self.listing.finish_load(generation, result) && self.state == AppState::Loading {
                    self.state = AppState::Listing;
                }
                Vec::new()
            }
            Message::SessionChecked(result) => {
                self.auth = match result {
                    Ok(Some(user)) => AuthStatus::LoggedIn(user),
                    Ok(None) => AuthStatus::LoggedOut,
                    Err(e) => {
                        tracing::warn!(error = %e, "session check failed");
                        AuthStatus::LoggedOut
                    }
                };
                Vec::new()
            }
            Message::LoggedIn(result) => {
                self.login_form.submitting = false;
                match result {
                    Ok(Some(user)) => {
                        tracing::info!(user_id = %user.id, "logged in");
                        self.auth = AuthStatus::LoggedIn(user);
                        self.login_form = LoginForm::default();
                        if self.state == AppState::Login {
                            self.state = AppState::Listing;
                        }
                        self.reload_places()
                    }
                    Ok(None) => {
                        self.login_form.error = Some("Login failed".to_string());
                        Vec::new()
                    }
                    Err(e) => {
                        self.login_form.error = Some(e.user_message("Login failed"));
                        Vec::new()
                    }
                }
            }
            Message::LoggedOut(result) => {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "logout request failed");
                }
                self.auth = AuthStatus::LoggedOut;
                self.review_editing = false;
                self.reload_places()
            }
            Message::Registered(result) => {
                self.register_form.submitting = false;
                match result {
                    Ok(user) => {
                        tracing::info!(user_id = %user.id, "account created");
                        let email = if user.email.is_empty() {
                            self.register_form.email.trim().to_string()
                        } else {
                            user.email
                        };
                        self.register_form = RegisterForm::default();
                        self.login_form = LoginForm::after_registration(&email);
                        self.state = AppState::Login;
                    }
                    Err(e) => {
                        self.register_form.message = Some(FormMessage::error(
                            e.user_message("Registration failed. Please try again."),
                        ));
                    }
                }
                Vec::new()
            }
            Message::DetailLoaded { key, result } => {
                if !self.is_showing(&key) {
                    return Vec::new();
                }
                let Some(detail) = self.detail.as_mut() else {
                    return Vec::new();
                };
                match detail.apply_place(result, self.listing.amenities(), self.listing.config()) {
                    Some(owner_id) => vec![Command::LoadHost { key, owner_id }],
                    None => Vec::new(),
                }
            }
            Message::HostLoaded { key, result } => {
                if self.is_showing(&key) {
                    if let Some(detail) = self.detail.as_mut() {
                        detail.apply_host(result);
                    }
                }
                Vec::new()
            }
            Message::ReviewsLoaded { key, result } => {
                if self.is_showing(&key) {
                    if let Some(detail) = self.detail.as_mut() {
                        detail.apply_reviews(result);
                    }
                }
                Vec::new()
            }
            Message::ReviewSubmitted { key, result } => {
                if !self.is_showing(&key) {
                    return Vec::new();
                }
                let refetch = self
                    .detail
                    .as_mut()
                    .is_some_and(|detail| detail.apply_submit(result));
                if refetch {
                    self.review_editing = false;
                    vec![Command::LoadReviews(key)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Key of the detail screen currently open, if any
    pub fn detail_key(&self) -> Option<DetailKey> {
        match &self.state {
            AppState::PlaceDetail(place_id) if self.detail.is_some() => Some(DetailKey {
                place_id: place_id.clone(),
                visit: self.detail_visit,
            }),
            _ => None,
        }
    }

    /// Whether `key` names the detail screen that is open right now
    fn is_showing(&self, key: &DetailKey) -> bool {
        key.visit == self.detail_visit
            && matches!(&self.state, AppState::PlaceDetail(id) if *id == key.place_id)
            && self.detail.as_ref().is_some_and(|d| d.is_for(&key.place_id))
    }

    /// Switches to the detail view and requests its data
    ///
    /// Sample places from the offline set open without any request.
    pub fn open_detail(&mut self, place_id: &str) -> Vec<Command> {
        self.state = AppState::PlaceDetail(place_id.to_string());
        self.detail_scroll_offset = 0;
        self.review_editing = false;
        self.detail_visit += 1;

        if is_fallback_id(place_id) {
            if let Some(place) = self.listing.place(place_id) {
                self.detail = Some(PlaceDetail::offline(place.clone()));
                return Vec::new();
            }
        }

        self.detail = Some(PlaceDetail::loading(place_id));
        let key = DetailKey {
            place_id: place_id.to_string(),
            visit: self.detail_visit,
        };
        vec![
            Command::LoadDetail(key.clone()),
            Command::LoadReviews(key),
            Command::CheckSession,
        ]
    }

    fn close_detail(&mut self) {
        self.state = AppState::Listing;
        self.detail = None;
        self.review_editing = false;
        self.detail_scroll_offset = 0;
    }

    /// Starts a new listing load generation
    pub fn reload_places(&mut self) -> Vec<Command> {
        vec![Command::LoadPlaces(self.listing.begin_load())]
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::api::ApiError;
    use crate::data::{Place, PublicUser, Review, User};
    use crate::detail::{DetailStatus, ReviewsStatus};
    use crate::listing::{FetchedListing, RatingStrategy};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    /// Helper to create a KeyEvent for testing
    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key_event(KeyCode::Char(c)));
        }
    }

    fn place(id: &str, title: &str, price: f64, owner: &str) -> Place {
        Place {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            price,
            amenities: Vec::new(),
            owner_id: Some(owner.to_string()),
            latitude: 0.0,
            longitude: 0.0,
            image: None,
        }
    }

    fn user(id: &str) -> User {
        User {
            id: id.to_string(),
            first_name: "Aragorn".to_string(),
            last_name: "Ranger".to_string(),
            email: "a@r.me".to_string(),
            is_admin: false,
        }
    }

    fn unreachable() -> ApiError {
        ApiError::Status {
            status: 503,
            message: None,
        }
    }

    /// App with a loaded listing of three places
    fn loaded_app() -> App {
        let config = ListingConfig {
            rating_strategy: RatingStrategy::Fixed,
            ..ListingConfig::default()
        };
        let mut app = App::with_listing(ListingRenderer::new(config));
        let commands = app.initial_commands();
        let Command::LoadPlaces(request) = &commands[1] else {
            panic!("expected a listing load");
        };
        app.handle_message(Message::PlacesLoaded {
            generation: request.generation,
            result: Ok(FetchedListing {
                places: vec![
                    place("p1", "Dragon's Rest Tavern", 75.0, "o1"),
                    place("p2", "Cozy Woodland Cabin", 100.0, "o2"),
                    place("p3", "Royal Castle Quarters", 300.0, "o3"),
                ],
                ..FetchedListing::default()
            }),
        });
        app
    }

    fn open_first(app: &mut App) -> Vec<Command> {
        app.handle_key(key_event(KeyCode::Enter))
    }

    #[test]
    fn test_initial_state_is_loading() {
        let app = App::new();
        assert_eq!(app.state, AppState::Loading);
        assert_eq!(app.auth, AuthStatus::Unknown);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_initial_commands_check_session_and_load() {
        let mut app = App::new();
        let commands = app.initial_commands();
        assert!(matches!(commands[0], Command::CheckSession));
        assert!(matches!(commands[1], Command::LoadPlaces(_)));
        assert!(app.listing.is_loading());
    }

    #[test]
    fn test_first_load_moves_to_listing() {
        let app = loaded_app();
        assert_eq!(app.state, AppState::Listing);
        assert_eq!(app.listing.visible_count(), 3);
    }

    #[test]
    fn test_failed_first_load_still_shows_listing() {
        let mut app = App::new();
        let commands = app.initial_commands();
        let Command::LoadPlaces(request) = &commands[1] else {
            panic!("expected a listing load");
        };
        app.handle_message(Message::PlacesLoaded {
            generation: request.generation,
            result: Err(unreachable()),
        });
        assert_eq!(app.state, AppState::Listing);
        assert!(app.listing.visible_count() > 0);
    }

    #[test]
    fn test_keys_ignored_during_loading() {
        let mut app = App::new();
        let commands = app.handle_key(key_event(KeyCode::Enter));
        assert!(commands.is_empty());
        assert_eq!(app.state, AppState::Loading);

        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_q_quits_from_listing() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let mut app = loaded_app();
        app.state = AppState::Login;
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_navigation_wraps() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Left));
        assert_eq!(app.listing.selected_card().unwrap().place_id(), "p3");
        app.handle_key(key_event(KeyCode::Char('l')));
        assert_eq!(app.listing.selected_card().unwrap().place_id(), "p1");
    }

    #[test]
    fn test_f_cycles_price_filter() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('f')));
        assert_eq!(app.listing.filter().max_price, 50);
        assert_eq!(app.listing.visible_count(), 0);
        app.handle_key(key_event(KeyCode::Char('f')));
        assert_eq!(app.listing.visible_count(), 2);
    }

    #[test]
    fn test_search_applies_live() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('/')));
        assert!(app.search_editing);

        type_text(&mut app, "cab");
        assert_eq!(app.listing.visible_count(), 1);
        assert!(!app.should_quit, "typing q-like keys must not quit while editing");

        app.handle_key(key_event(KeyCode::Backspace));
        app.handle_key(key_event(KeyCode::Backspace));
        app.handle_key(key_event(KeyCode::Backspace));
        assert_eq!(app.listing.visible_count(), 3);
    }

    #[test]
    fn test_search_esc_clears_query() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('/')));
        type_text(&mut app, "castle");
        app.handle_key(key_event(KeyCode::Esc));
        assert!(!app.search_editing);
        assert_eq!(app.listing.filter().query(), "");
        assert_eq!(app.listing.visible_count(), 3);
    }

    #[test]
    fn test_search_and_filter_compose() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('/')));
        type_text(&mut app, "r");
        app.handle_key(key_event(KeyCode::Enter));
        app.handle_key(key_event(KeyCode::Char('f')));
        app.handle_key(key_event(KeyCode::Char('f')));
        let visible: Vec<_> = app.listing.visible_cards().map(|c| c.place_id().to_string()).collect();
        assert_eq!(visible, vec!["p1".to_string()]);
    }

    #[test]
    fn test_r_reloads_with_new_generation() {
        let mut app = loaded_app();
        let before = app.listing.generation();
        let commands = app.handle_key(key_event(KeyCode::Char('r')));
        match &commands[..] {
            [Command::LoadPlaces(request)] => assert_eq!(request.generation, before + 1),
            other => panic!("unexpected commands: {:?}", other),
        }
    }

    #[test]
    fn test_enter_opens_detail_and_requests_data() {
        let mut app = loaded_app();
        let commands = open_first(&mut app);
        assert_eq!(app.state, AppState::PlaceDetail("p1".to_string()));
        assert_eq!(commands.len(), 3);
        assert!(matches!(&commands[0], Command::LoadDetail(key) if key.place_id == "p1"));
        assert!(matches!(&commands[1], Command::LoadReviews(key) if key.place_id == "p1"));
    }

    #[test]
    fn test_detail_place_load_requests_host() {
        let mut app = loaded_app();
        open_first(&mut app);
        let commands = app.handle_message(Message::DetailLoaded {
            key: app.detail_key().unwrap(),
            result: Ok(place("p1", "Dragon's Rest Tavern", 75.0, "o1")),
        });
        assert!(matches!(
            &commands[..],
            [Command::LoadHost { owner_id, .. }] if owner_id == "o1"
        ));

        app.handle_message(Message::HostLoaded {
            key: app.detail_key().unwrap(),
            result: Ok(PublicUser {
                first_name: "Bilbo".to_string(),
                last_name: "Baggins".to_string(),
            }),
        });
        assert_eq!(app.detail.as_ref().unwrap().host_name(), Some("Bilbo Baggins"));
    }

    #[test]
    fn test_detail_results_for_closed_place_are_dropped() {
        let mut app = loaded_app();
        open_first(&mut app);
        let key = app.detail_key().unwrap();
        app.handle_key(key_event(KeyCode::Esc));
        assert_eq!(app.state, AppState::Listing);
        assert!(app.detail_key().is_none());

        let commands = app.handle_message(Message::DetailLoaded {
            key,
            result: Ok(place("p1", "Dragon's Rest Tavern", 75.0, "o1")),
        });
        assert!(commands.is_empty());
        assert!(app.detail.is_none());
    }

    #[test]
    fn test_reopened_detail_ignores_earlier_visit() {
        let mut app = loaded_app();
        open_first(&mut app);
        let first = app.detail_key().unwrap();

        let commands = app.handle_key(key_event(KeyCode::Char('r')));
        let second = app.detail_key().unwrap();
        assert_eq!(first.place_id, second.place_id);
        assert_ne!(first.visit, second.visit);
        assert!(matches!(&commands[0], Command::LoadDetail(key) if *key == second));

        let commands = app.handle_message(Message::DetailLoaded {
            key: first.clone(),
            result: Err(unreachable()),
        });
        assert!(commands.is_empty());
        app.handle_message(Message::ReviewsLoaded {
            key: first,
            result: Err(unreachable()),
        });
        let detail = app.detail.as_ref().unwrap();
        assert_eq!(detail.status, DetailStatus::Loading);
        assert_eq!(detail.reviews, ReviewsStatus::Loading);

        let commands = app.handle_message(Message::DetailLoaded {
            key: second,
            result: Ok(place("p1", "Dragon's Rest Tavern", 75.0, "o1")),
        });
        assert!(matches!(&commands[..], [Command::LoadHost { owner_id, .. }] if owner_id == "o1"));
    }

    #[test]
    fn test_detail_failure_shows_error_panel() {
        let mut app = loaded_app();
        open_first(&mut app);
        app.handle_message(Message::DetailLoaded {
            key: app.detail_key().unwrap(),
            result: Err(ApiError::Status {
                status: 404,
                message: Some("Place not found".to_string()),
            }),
        });
        assert_eq!(
            app.detail.as_ref().unwrap().status,
            DetailStatus::Failed("Place not found".to_string())
        );
    }

    #[test]
    fn test_fallback_place_opens_without_requests() {
        let mut app = App::new();
        let commands = app.initial_commands();
        let Command::LoadPlaces(request) = &commands[1] else {
            panic!("expected a listing load");
        };
        app.handle_message(Message::PlacesLoaded {
            generation: request.generation,
            result: Err(unreachable()),
        });

        let commands = open_first(&mut app);

        assert!(commands.is_empty());
        let detail = app.detail.as_ref().unwrap();
        assert!(detail.is_offline());
        assert!(detail.place().is_some());
    }

    fn logged_in_detail_app() -> App {
        let mut app = loaded_app();
        app.handle_message(Message::SessionChecked(Ok(Some(user("u1")))));
        open_first(&mut app);
        app.handle_message(Message::DetailLoaded {
            key: app.detail_key().unwrap(),
            result: Ok(place("p1", "Dragon's Rest Tavern", 75.0, "o1")),
        });
        app.handle_message(Message::ReviewsLoaded {
            key: app.detail_key().unwrap(),
            result: Ok(Vec::new()),
        });
        app
    }

    #[test]
    fn test_review_flow_submits_and_refetches() {
        let mut app = logged_in_detail_app();
        app.handle_key(key_event(KeyCode::Char('w')));
        assert!(app.review_editing);

        app.handle_key(key_event(KeyCode::Char('4')));
        app.handle_key(key_event(KeyCode::Tab));
        type_text(&mut app, "Lovely fire and quiet rooms");
        let commands = app.handle_key(key_event(KeyCode::Enter));

        let review = match &commands[..] {
            [Command::SubmitReview { review, .. }] => review.clone(),
            other => panic!("unexpected commands: {:?}", other),
        };
        assert_eq!(review.rating, 4);
        assert_eq!(review.user_id, "u1");

        let commands = app.handle_message(Message::ReviewSubmitted {
            key: app.detail_key().unwrap(),
            result: Ok(Review {
                id: "r1".to_string(),
                text: review.text.clone(),
                rating: 4,
                user_id: Some("u1".to_string()),
                place_id: Some("p1".to_string()),
                user: None,
            }),
        });
        assert!(matches!(&commands[..], [Command::LoadReviews(key)] if key.place_id == "p1"));
        assert!(!app.review_editing);
    }

    #[test]
    fn test_invalid_review_makes_no_request() {
        let mut app = logged_in_detail_app();
        app.handle_key(key_event(KeyCode::Char('w')));
        app.handle_key(key_event(KeyCode::Tab));
        type_text(&mut app, "short");
        let commands = app.handle_key(key_event(KeyCode::Enter));
        assert!(commands.is_empty());
        assert!(app.detail.as_ref().unwrap().form.message.is_some());
    }

    #[test]
    fn test_review_form_locked_when_logged_out() {
        let mut app = loaded_app();
        app.handle_message(Message::SessionChecked(Ok(None)));
        open_first(&mut app);
        app.handle_message(Message::DetailLoaded {
            key: app.detail_key().unwrap(),
            result: Ok(place("p1", "Dragon's Rest Tavern", 75.0, "o1")),
        });
        app.handle_key(key_event(KeyCode::Char('w')));
        assert!(!app.review_editing);
    }

    #[test]
    fn test_login_flow() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('L')));
        assert_eq!(app.state, AppState::Login);

        type_text(&mut app, "a@r.me");
        app.handle_key(key_event(KeyCode::Tab));
        type_text(&mut app, "secret");
        let commands = app.handle_key(key_event(KeyCode::Enter));
        assert!(matches!(&commands[..], [Command::Login(c)] if c.email == "a@r.me"));

        let commands = app.handle_message(Message::LoggedIn(Ok(Some(user("u1")))));
        assert_eq!(app.state, AppState::Listing);
        assert_eq!(app.auth.welcome().as_deref(), Some("Welcome, Aragorn!"));
        assert!(matches!(&commands[..], [Command::LoadPlaces(_)]));
    }

    #[test]
    fn test_login_failure_shows_server_error() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('L')));
        app.handle_message(Message::LoggedIn(Err(ApiError::Status {
            status: 401,
            message: Some("Invalid credentials".to_string()),
        })));
        assert_eq!(app.state, AppState::Login);
        assert_eq!(app.login_form.error.as_deref(), Some("Invalid credentials"));
    }

    #[test]
    fn test_logout_clears_user_and_reloads() {
        let mut app = loaded_app();
        app.handle_message(Message::SessionChecked(Ok(Some(user("u1")))));
        let commands = app.handle_key(key_event(KeyCode::Char('o')));
        assert!(matches!(&commands[..], [Command::Logout]));

        let commands = app.handle_message(Message::LoggedOut(Ok(())));
        assert_eq!(app.auth, AuthStatus::LoggedOut);
        assert!(matches!(&commands[..], [Command::LoadPlaces(_)]));
    }

    #[test]
    fn test_register_success_switches_to_login() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('R')));
        assert_eq!(app.state, AppState::Register);

        let mut new_user = user("u7");
        new_user.email = "frodo@shire.me".to_string();
        app.handle_message(Message::Registered(Ok(new_user)));

        assert_eq!(app.state, AppState::Login);
        assert_eq!(app.login_form.email, "frodo@shire.me");
        assert_eq!(
            app.login_form.notice.as_deref(),
            Some("Account created successfully!")
        );
    }

    #[test]
    fn test_register_mismatch_makes_no_request() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('R')));
        type_text(&mut app, "Frodo");
        app.handle_key(key_event(KeyCode::Tab));
        type_text(&mut app, "Baggins");
        app.handle_key(key_event(KeyCode::Tab));
        type_text(&mut app, "f@s.me");
        app.handle_key(key_event(KeyCode::Tab));
        type_text(&mut app, "ring123");
        app.handle_key(key_event(KeyCode::Tab));
        type_text(&mut app, "ring124");

        assert!(app.register_form.confirm_mismatch());
        let commands = app.handle_key(key_event(KeyCode::Enter));
        assert!(commands.is_empty());
    }

    #[test]
    fn test_help_toggle() {
        let mut app = loaded_app();
        app.handle_key(key_event(KeyCode::Char('?')));
        assert!(app.show_help);
        app.handle_key(key_event(KeyCode::Char('q')));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_reviews_failure_on_detail() {
        let mut app = loaded_app();
        open_first(&mut app);
        app.handle_message(Message::ReviewsLoaded {
            key: app.detail_key().unwrap(),
            result: Err(unreachable()),
        });
        assert_eq!(app.detail.as_ref().unwrap().reviews, ReviewsStatus::Failed);
    }
}
