use std::net::TcpListener;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::{Client, Response};
use serde_json::{json, Value};
use uuid::Uuid;

use medimate_backend::config::settings::{get_config, get_jwt_settings};
use medimate_backend::db::MemoryStore;
use medimate_backend::models::appointment::Doctor;
use medimate_backend::models::llm::{ChatMessage, LlmError};
use medimate_backend::services::LlmClient;
use medimate_backend::telemetry::{get_subscriber, init_subscriber};
use medimate_backend::{run, AppServices, Repositories};

// Ensure that the `tracing` stack is only initialised once using `once_cell`
static TRACING: Lazy<()> = Lazy::new(|| {
    let default_filter_level = "info".to_string();
    let subscriber_name = "test".to_string();

    if std::env::var("TEST_LOG").is_ok() {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::stdout);
        init_subscriber(subscriber);
    } else {
        let subscriber = get_subscriber(subscriber_name, default_filter_level, std::io::sink);
        init_subscriber(subscriber);
    }
});

/// Completion client that replays a fixed reply and counts calls.
pub struct FakeLlm {
    reply: Mutex<Result<String, String>>,
    calls: AtomicUsize,
    last_messages: Mutex<Vec<ChatMessage>>,
}

impl FakeLlm {
    pub fn replying(reply: impl Into<String>) -> Self {
        Self {
            reply: Mutex::new(Ok(reply.into())),
            calls: AtomicUsize::new(0),
            last_messages: Mutex::new(Vec::new()),
        }
    }

    pub fn set_reply(&self, reply: impl Into<String>) {
        *self.reply.lock().unwrap() = Ok(reply.into());
    }

    /// Every subsequent call fails as if the provider were down.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.reply.lock().unwrap() = Err(message.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_messages(&self) -> Vec<ChatMessage> {
        self.last_messages.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for FakeLlm {
    fn model_name(&self) -> &str {
        "fake-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_messages.lock().unwrap() = messages.to_vec();
        match &*self.reply.lock().unwrap() {
            Ok(reply) => Ok(reply.clone()),
            Err(message) => Err(LlmError::ServiceUnavailable(message.clone())),
        }
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<MemoryStore>,
    pub llm: Arc<FakeLlm>,
    pub doctors: Vec<Doctor>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }
}

pub fn seed_doctors() -> Vec<Doctor> {
    vec![
        Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Ada Lovelace".to_string(),
            specialty: "Cardiology".to_string(),
            phone: Some("+1-555-0100".to_string()),
            email: Some("ada@clinic.example".to_string()),
            address: None,
            rating: Some(4.8),
            experience_years: Some(12),
        },
        Doctor {
            id: Uuid::new_v4(),
            name: "Dr. Grace Hopper".to_string(),
            specialty: "General Practice".to_string(),
            phone: None,
            email: None,
            address: Some("1 Main St".to_string()),
            rating: None,
            experience_years: Some(20),
        },
    ]
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with_llm(FakeLlm::replying("Stay hydrated and keep moving.")).await
}

pub async fn spawn_app_with_llm(llm: FakeLlm) -> TestApp {
    // The first time `initialize` is invoked the code in `TRACING` is executed.
    // All other invocations will instead skip execution.
    Lazy::force(&TRACING);

    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    // Get port assigned by the OS
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let mut configuration = get_config().expect("Failed to read configuration.");
    // Keep bcrypt cheap in tests
    configuration.application.password_cost = 4;
    configuration.llm.timeout_seconds = 5;

    let doctors = seed_doctors();
    let store = Arc::new(MemoryStore::with_doctors(doctors.clone()));
    let llm = Arc::new(llm);
    let services = AppServices::new(
        Repositories::in_memory(store.clone()),
        llm.clone(),
        Arc::new(get_jwt_settings(&configuration)),
        &configuration,
    )
    .expect("Failed to build services");

    let server = run(listener, services, vec![]).expect("Failed to bind address");
    // Launch the server as a background task
    let _ = tokio::spawn(server);

    TestApp { address, store, llm, doctors }
}

pub async fn register_user(app: &TestApp, username: &str, email: &str, password: &str) -> Response {
    Client::new()
        .post(app.url("/api/auth/register"))
        .json(&json!({
            "username": username,
            "email": email,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to execute registration request.")
}

pub async fn login(app: &TestApp, username: &str, password: &str) -> Response {
    Client::new()
        .post(app.url("/api/auth/login"))
        .json(&json!({
            "username": username,
            "password": password
        }))
        .send()
        .await
        .expect("Failed to execute login request.")
}

/// Registers a fresh user and returns `(username, token)`.
pub async fn create_test_user_and_login(app: &TestApp) -> (String, String) {
    let username = format!("user{}", &Uuid::new_v4().simple().to_string()[..12]);
    let password = "password123";
    let email = format!("{}@example.com", username);

    let register_response = register_user(app, &username, &email, password).await;
    assert_eq!(201, register_response.status().as_u16(), "Registration should succeed");

    let login_response = login(app, &username, password).await;
    let body: Value = login_response.json().await.expect("Failed to parse login response");
    let token = body["token"].as_str().expect("No token in response");

    (username, token.to_string())
}

pub async fn create_record(app: &TestApp, token: &str, body: Value) -> Response {
    Client::new()
        .post(app.url("/api/health-data"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .expect("Failed to create health record.")
}
