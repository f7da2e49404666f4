//! Authentication seam and the mock provider the demo ships with.
//!
//! There is no real security here: passwords are compared in memory and
//! tokens are opaque counters.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::User => f.write_str("user"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u32,
    pub email: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: User,
}

pub trait AuthProvider {
    fn login(&self, credentials: &Credentials) -> Option<Session>;

    fn current_user(&self, token: &str) -> Option<User>;

    fn logout(&self, token: &str);
}

/// Two fixed accounts, matched case-insensitively on email.
pub struct MockAuthProvider {
    accounts: Vec<(User, String)>,
    sessions: RwLock<HashMap<String, u32>>,
    next_token: AtomicU64,
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAuthProvider {
    pub fn new() -> Self {
        let accounts = vec![
            (
                User {
                    id: 1,
                    email: "admin@example.com".into(),
                    name: "Admin User".into(),
                    role: Role::Admin,
                },
                "admin123".to_string(),
            ),
            (
                User {
                    id: 2,
                    email: "john.doe@example.com".into(),
                    name: "John Doe".into(),
                    role: Role::User,
                },
                "password123".to_string(),
            ),
        ];
        Self {
            accounts,
            sessions: RwLock::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    pub fn users(&self) -> impl Iterator<Item = &User> {
        self.accounts.iter().map(|(user, _)| user)
    }
}

impl AuthProvider for MockAuthProvider {
    fn login(&self, credentials: &Credentials) -> Option<Session> {
        let email = credentials.email.trim();
        let Some((user, _)) = self.accounts.iter().find(|(user, password)| {
            user.email.eq_ignore_ascii_case(email) && *password == credentials.password
        }) else {
            debug!(email, "login rejected");
            return None;
        };
        let serial = self.next_token.fetch_add(1, Ordering::Relaxed);
        let token = format!("mock-token-{}-{serial}", user.id);
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(token.clone(), user.id);
        }
        info!(user = %user.email, role = %user.role, "logged in");
        Some(Session {
            token,
            user: user.clone(),
        })
    }

    fn current_user(&self, token: &str) -> Option<User> {
        let user_id = *self.sessions.read().ok()?.get(token)?;
        self.users().find(|user| user.id == user_id).cloned()
    }

    fn logout(&self, token: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(token);
        }
    }
}
