use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use auth::Authenticator;
use auth::JwtHandler;
use auth::TokenSettings;
use chrono::Utc;
use identity_service::config::ServerConfig;
use identity_service::domain::user::models::EmailAddress;
use identity_service::domain::user::models::NewUser;
use identity_service::domain::user::models::User;
use identity_service::domain::user::models::UserCredentials;
use identity_service::domain::user::models::UserId;
use identity_service::domain::user::ports::UserRepository;
use identity_service::domain::user::service::UserService;
use identity_service::inbound::http::router::create_router;
use identity_service::user::errors::UserError;
use reqwest::header::COOKIE;
use reqwest::header::SET_COOKIE;

pub const ACCESS_SECRET: &str = "test-access-secret-for-jwt-signing-32-bytes";
pub const REFRESH_SECRET: &str = "test-refresh-secret-for-jwt-signing-32-bytes";
pub const ACCESS_EXPIRATION_SECONDS: i64 = 900;
pub const REFRESH_EXPIRATION_SECONDS: i64 = 604800;

/// Test application that spawns a real server over an in-memory store
pub struct TestApp {
    pub address: String,
    pub prefix: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub api_client: reqwest::Client,
}

/// Session tokens lifted from a sign-in response's `Set-Cookie` headers
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
}

impl TestApp {
    /// Spawn the application under the `/api` prefix
    pub async fn spawn() -> Self {
        Self::spawn_with_prefix("/api").await
    }

    /// Spawn the application in a background task and return TestApp
    pub async fn spawn_with_prefix(prefix: &str) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let repository = Arc::new(InMemoryUserRepository::default());
        let user_service = Arc::new(UserService::new(Arc::clone(&repository)));

        let authenticator = Arc::new(Authenticator::new(
            &TokenSettings {
                secret: ACCESS_SECRET.to_string(),
                expiration_seconds: ACCESS_EXPIRATION_SECONDS,
            },
            &TokenSettings {
                secret: REFRESH_SECRET.to_string(),
                expiration_seconds: REFRESH_EXPIRATION_SECONDS,
            },
        ));

        let server = ServerConfig {
            http_port: port,
            api_prefix: prefix.to_string(),
            cors_origin: None,
        };

        let router = create_router(user_service, authenticator, &server);

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            prefix: prefix.trim_end_matches('/').to_string(),
            repository,
            api_client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}{}", self.address, self.prefix, path)
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(self.url(path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(self.url(path))
    }

    /// Helper to make GET request carrying the given cookie
    pub fn get_with_cookie(&self, path: &str, name: &str, value: &str) -> reqwest::RequestBuilder {
        self.get(path).header(COOKIE, format!("{}={}", name, value))
    }

    /// Helper to make POST request carrying the given cookie
    pub fn post_with_cookie(&self, path: &str, name: &str, value: &str) -> reqwest::RequestBuilder {
        self.post(path).header(COOKIE, format!("{}={}", name, value))
    }

    pub async fn register(&self, email: &str, name: &str, password: &str) -> reqwest::Response {
        self.post("/auth/register")
            .json(&serde_json::json!({
                "email": email,
                "name": name,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/sign-in")
            .json(&serde_json::json!({
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register a user and sign them in, returning the session cookies
    pub async fn signed_in_user(&self, email: &str, password: &str) -> Session {
        let response = self.register(email, "Test User", password).await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);

        self.session(email, password).await
    }

    /// Sign in an existing user, returning the session cookies
    pub async fn session(&self, email: &str, password: &str) -> Session {
        let response = self.sign_in(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);

        let cookies = set_cookies(&response);
        Session {
            access_token: cookie_value(&cookies, "Authentication")
                .expect("Missing Authentication cookie"),
            refresh_token: cookie_value(&cookies, "Refresh").expect("Missing Refresh cookie"),
        }
    }
}

/// All `Set-Cookie` header values of a response
pub fn set_cookies(response: &reqwest::Response) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| value.to_str().unwrap().to_string())
        .collect()
}

/// The `Set-Cookie` header for the cookie called `name`
pub fn find_cookie<'a>(cookies: &'a [String], name: &str) -> Option<&'a String> {
    let prefix = format!("{}=", name);
    cookies.iter().find(|cookie| cookie.starts_with(&prefix))
}

/// The value of the cookie called `name`
pub fn cookie_value(cookies: &[String], name: &str) -> Option<String> {
    let cookie = find_cookie(cookies, name)?;
    let pair = cookie.split(';').next()?;
    pair.split_once('=').map(|(_, value)| value.to_string())
}

/// Handler keyed like the server's access tokens, with a custom lifetime
pub fn access_token_handler(expiration_seconds: i64) -> JwtHandler {
    JwtHandler::new(ACCESS_SECRET.as_bytes(), expiration_seconds)
}

struct StoredUser {
    user: User,
    password_hash: String,
    refresh_token_hash: Option<String>,
}

/// `UserRepository` over a vector, with the same uniqueness rule as the users table
pub struct InMemoryUserRepository {
    users: Mutex<Vec<StoredUser>>,
    healthy: AtomicBool,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self {
            users: Mutex::new(Vec::new()),
            healthy: AtomicBool::new(true),
        }
    }
}

impl InMemoryUserRepository {
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Stored refresh-token hash of the user with `email`
    pub fn refresh_token_hash(&self, email: &str) -> Option<String> {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|stored| stored.user.email.as_str() == email)
            .and_then(|stored| stored.refresh_token_hash.clone())
    }

    /// Stored password hash of the user with `email`
    pub fn password_hash(&self, email: &str) -> Option<String> {
        let users = self.users.lock().unwrap();
        users
            .iter()
            .find(|stored| stored.user.email.as_str() == email)
            .map(|stored| stored.password_hash.clone())
    }

    fn credentials(stored: &StoredUser) -> UserCredentials {
        UserCredentials {
            user_id: stored.user.id,
            password_hash: Some(stored.password_hash.clone()),
            refresh_token_hash: stored.refresh_token_hash.clone(),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, UserError> {
        let mut users = self.users.lock().unwrap();

        if users.iter().any(|stored| stored.user.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: UserId(users.len() as i64 + 1),
            uuid: user.uuid,
            email: user.email,
            name: user.name,
            time_zone: user.time_zone,
            created_at: now,
            updated_at: now,
        };

        users.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash,
            refresh_token_hash: None,
        });

        Ok(created)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|stored| stored.user.id == *id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|stored| stored.user.email == *email)
            .map(|stored| stored.user.clone()))
    }

    async fn find_credentials_by_id(
        &self,
        id: &UserId,
    ) -> Result<Option<UserCredentials>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|stored| stored.user.id == *id)
            .map(Self::credentials))
    }

    async fn find_credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserCredentials>, UserError> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|stored| stored.user.email == *email)
            .map(Self::credentials))
    }

    async fn update_password_hash(
        &self,
        id: &UserId,
        password_hash: &str,
    ) -> Result<u64, UserError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|stored| stored.user.id == *id) {
            Some(stored) => {
                stored.password_hash = password_hash.to_string();
                stored.user.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn update_refresh_token_hash(
        &self,
        id: &UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<u64, UserError> {
        let mut users = self.users.lock().unwrap();
        match users.iter_mut().find(|stored| stored.user.id == *id) {
            Some(stored) => {
                stored.refresh_token_hash = refresh_token_hash;
                stored.user.updated_at = Utc::now();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn ping(&self) -> Result<(), UserError> {
        if self.healthy.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(UserError::DatabaseError("connection refused".to_string()))
        }
    }
}
