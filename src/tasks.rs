//! Background API requests
//!
//! The UI never awaits the network. Key handlers return `Command`s, the event
//! loop hands them to a `TaskRunner` which runs each one on a tokio task, and
//! results come back as `Message`s drained from a channel once per tick.

use tokio::sync::mpsc;

use crate::data::api::{ApiClient, ApiError, Credentials, NewReview, NewUser};
use crate::data::{Place, PublicUser, Review, User};
use crate::listing::{fetch_listing, FetchedListing, LoadRequest};

/// One opening of a place's detail screen
///
/// Detail commands and their results carry it so a reopened screen ignores
/// responses meant for an earlier visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailKey {
    pub place_id: String,
    pub visit: u64,
}

/// Work requested by the application
#[derive(Debug, Clone)]
pub enum Command {
    LoadPlaces(LoadRequest),
    CheckSession,
    Login(Credentials),
    Logout,
    Register(NewUser),
    LoadDetail(DetailKey),
    /// Public profile of a place's owner
    LoadHost { key: DetailKey, owner_id: String },
    LoadReviews(DetailKey),
    SubmitReview { key: DetailKey, review: NewReview },
}

impl Command {
    /// Short name for logs; payloads may carry passwords
    pub fn name(&self) -> &'static str {
        match self {
            Command::LoadPlaces(_) => "load_places",
            Command::CheckSession => "check_session",
            Command::Login(_) => "login",
            Command::Logout => "logout",
            Command::Register(_) => "register",
            Command::LoadDetail(_) => "load_detail",
            Command::LoadHost { .. } => "load_host",
            Command::LoadReviews(_) => "load_reviews",
            Command::SubmitReview { .. } => "submit_review",
        }
    }
}

/// Results sent from background tasks to the main loop
#[derive(Debug)]
pub enum Message {
    PlacesLoaded {
        generation: u64,
        result: Result<FetchedListing, ApiError>,
    },
    SessionChecked(Result<Option<User>, ApiError>),
    /// Login request finished; on success carries the fresh session check
    LoggedIn(Result<Option<User>, ApiError>),
    LoggedOut(Result<(), ApiError>),
    Registered(Result<User, ApiError>),
    DetailLoaded {
        key: DetailKey,
        result: Result<Place, ApiError>,
    },
    HostLoaded {
        key: DetailKey,
        result: Result<PublicUser, ApiError>,
    },
    ReviewsLoaded {
        key: DetailKey,
        result: Result<Vec<Review>, ApiError>,
    },
    ReviewSubmitted {
        key: DetailKey,
        result: Result<Review, ApiError>,
    },
}

/// Runs commands against the API and reports back over a channel
pub struct TaskRunner {
    client: ApiClient,
    tx: mpsc::UnboundedSender<Message>,
    rx: mpsc::UnboundedReceiver<Message>,
}

impl TaskRunner {
    pub fn new(client: ApiClient) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { client, tx, rx }
    }

    /// Starts `command` on its own task
    pub fn spawn(&self, command: Command) {
        let client = self.client.clone();
        let tx = self.tx.clone();
        tracing::debug!(command = command.name(), "spawning task");
        tokio::spawn(async move {
            let message = run(&client, command).await;
            // Receiver gone means the app is shutting down
            let _ = tx.send(message);
        });
    }

    pub fn spawn_all(&self, commands: impl IntoIterator<Item = Command>) {
        for command in commands {
            self.spawn(command);
        }
    }

    /// Next pending message, if any, without blocking
    pub fn try_recv(&mut self) -> Option<Message> {
        self.rx.try_recv().ok()
    }

    /// Waits for the next message
    pub async fn recv(&mut self) -> Option<Message> {
        self.rx.recv().await
    }
}

async fn run(client: &ApiClient, command: Command) -> Message {
    match command {
        Command::LoadPlaces(request) => Message::PlacesLoaded {
            generation: request.generation,
            result: fetch_listing(client, &request).await,
        },
        Command::CheckSession => Message::SessionChecked(client.check_session().await),
        Command::Login(credentials) => {
            let result = match client.login(&credentials).await {
                Ok(()) => client.check_session().await,
                Err(e) => Err(e),
            };
            Message::LoggedIn(result)
        }
        Command::Logout => Message::LoggedOut(client.logout().await),
        Command::Register(user) => Message::Registered(client.register(&user).await),
        Command::LoadDetail(key) => {
            let result = client.fetch_place(&key.place_id).await;
            Message::DetailLoaded { key, result }
        }
        Command::LoadHost { key, owner_id } => {
            let result = client.fetch_public_user(&owner_id).await;
            Message::HostLoaded { key, result }
        }
        Command::LoadReviews(key) => {
            let result = client.fetch_reviews(&key.place_id).await;
            Message::ReviewsLoaded { key, result }
        }
        Command::SubmitReview { key, review } => {
            let result = client.submit_review(&review).await;
            Message::ReviewSubmitted { key, result }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{StubRoute, StubServer};

    fn key(place_id: &str, visit: u64) -> DetailKey {
        DetailKey {
            place_id: place_id.to_string(),
            visit,
        }
    }

    fn runner(server: &StubServer) -> TaskRunner {
        TaskRunner::new(ApiClient::new(server.base_url.clone()).unwrap())
    }

    #[tokio::test]
    async fn test_try_recv_empty_when_idle() {
        let server = StubServer::start(vec![]).await;
        let mut runner = runner(&server);
        assert!(runner.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_load_reviews_reports_detail_key() {
        let server = StubServer::start(vec![StubRoute::get(
            "/api/v3/reviews/places/p1/reviews",
            200,
            r#"[{"id":"r1","text":"Great stay","rating":5}]"#,
        )])
        .await;
        let mut runner = runner(&server);

        runner.spawn(Command::LoadReviews(key("p1", 3)));

        match runner.recv().await {
            Some(Message::ReviewsLoaded { key: reported, result }) => {
                assert_eq!(reported, key("p1", 3));
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_follows_up_with_session_check() {
        let server = StubServer::start(vec![
            StubRoute::post("/api/v3/auth/login", 200, r#"{"message":"ok"}"#),
            StubRoute::get(
                "/api/v3/auth/protected",
                200,
                r#"{"id":"u1","first_name":"Aragorn"}"#,
            ),
        ])
        .await;
        let mut runner = runner(&server);

        runner.spawn(Command::Login(Credentials {
            email: "a@r.me".to_string(),
            password: "secret".to_string(),
        }));

        match runner.recv().await {
            Some(Message::LoggedIn(Ok(Some(user)))) => assert_eq!(user.first_name, "Aragorn"),
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(server.hits("/api/v3/auth/protected"), 1);
    }

    #[tokio::test]
    async fn test_failed_login_skips_session_check() {
        let server = StubServer::start(vec![StubRoute::post(
            "/api/v3/auth/login",
            401,
            r#"{"error":"Invalid credentials"}"#,
        )])
        .await;
        let mut runner = runner(&server);

        runner.spawn(Command::Login(Credentials {
            email: "a@r.me".to_string(),
            password: "wrong".to_string(),
        }));

        match runner.recv().await {
            Some(Message::LoggedIn(Err(e))) => {
                assert_eq!(e.user_message("Login failed"), "Invalid credentials")
            }
            other => panic!("unexpected message: {:?}", other),
        }
        assert_eq!(server.hits("/api/v3/auth/protected"), 0);
    }

    #[tokio::test]
    async fn test_load_host_message() {
        let server = StubServer::start(vec![StubRoute::get(
            "/api/v3/users/u9/public",
            200,
            r#"{"first_name":"Bilbo","last_name":"Baggins"}"#,
        )])
        .await;
        let mut runner = runner(&server);

        runner.spawn(Command::LoadHost {
            key: key("p1", 1),
            owner_id: "u9".to_string(),
        });

        match runner.recv().await {
            Some(Message::HostLoaded { key: reported, result }) => {
                assert_eq!(reported.place_id, "p1");
                assert_eq!(result.unwrap().first_name, "Bilbo");
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }
}
