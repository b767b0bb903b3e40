//! Admin sessions.
//!
//! The browser holds a single cookie, `habitare_session`, whose value is
//! `<session id>.<hex HMAC-SHA256 of the id>`. The signature is checked
//! before the store is consulted, so forged ids never reach it. Session
//! state itself lives server-side behind [`SessionStore`].
//!
//! Sessions expire after the configured TTL of inactivity: every
//! authenticated request pushes `expires_at` forward. Expired sessions are
//! swept from the store on each login, so it holds at most the sessions
//! started within one TTL.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, Duration, Utc};
use cookie::{Cookie, SameSite};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::debug;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

pub const SESSION_COOKIE: &str = "habitare_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionData {
    pub id: String,
    pub authenticated: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionData {
    fn new(ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            authenticated: false,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Server-side session storage.
pub trait SessionStore: Send + Sync {
    /// The live session with this id. Expired sessions are never returned.
    fn load(&self, id: &str) -> Option<SessionData>;

    fn save(&self, session: SessionData);

    fn delete(&self, id: &str);

    /// Drop expired sessions and return how many were removed.
    fn cleanup(&self) -> usize;
}

/// Process-local store. Sessions do not survive a restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<String, SessionData>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn load(&self, id: &str) -> Option<SessionData> {
        let session = self.sessions.read().ok()?.get(id).cloned()?;
        if session.is_expired() {
            self.delete(id);
            return None;
        }
        Some(session)
    }

    fn save(&self, session: SessionData) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(session.id.clone(), session);
        }
    }

    fn delete(&self, id: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(id);
        }
    }

    fn cleanup(&self) -> usize {
        let Ok(mut sessions) = self.sessions.write() else {
            return 0;
        };
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired());
        before - sessions.len()
    }
}

/// Signs session cookies and resolves them against a [`SessionStore`].
#[derive(Clone)]
pub struct Sessions {
    store: Arc<dyn SessionStore>,
    secret: Arc<[u8]>,
    ttl: Duration,
}

impl Sessions {
    pub fn new(store: Arc<dyn SessionStore>, secret: &str, ttl_hours: u64) -> Self {
        Self {
            store,
            secret: Arc::from(secret.as_bytes()),
            ttl: Duration::hours(i64::try_from(ttl_hours).unwrap_or(24)),
        }
    }

    /// In-memory sessions, the default for a running server.
    pub fn in_memory(secret: &str, ttl_hours: u64) -> Self {
        Self::new(Arc::new(MemorySessionStore::new()), secret, ttl_hours)
    }

    pub fn store(&self) -> &dyn SessionStore {
        self.store.as_ref()
    }

    /// Whether the request carries a valid, authenticated session. Extends
    /// the session's expiry when it does.
    pub fn is_authenticated(&self, headers: &HeaderMap) -> bool {
        let Some(mut session) = self.from_headers(headers) else {
            return false;
        };
        if !session.authenticated {
            return false;
        }
        session.expires_at = Utc::now() + self.ttl;
        self.store.save(session);
        true
    }

    /// Create an authenticated session and return its `Set-Cookie` value.
    pub fn login(&self) -> String {
        let swept = self.store.cleanup();
        if swept > 0 {
            debug!(swept, "expired sessions removed");
        }
        let mut session = SessionData::new(self.ttl);
        session.authenticated = true;
        let cookie = self.cookie(&session.id);
        debug!(session = %session.id, "session started");
        self.store.save(session);
        cookie
    }

    /// Destroy the request's session (if any) and return a `Set-Cookie`
    /// value that clears it in the browser.
    pub fn logout(&self, headers: &HeaderMap) -> String {
        if let Some(id) = self.session_id(headers) {
            self.store.delete(&id);
            debug!(session = %id, "session ended");
        }
        let mut cookie = Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build();
        cookie.make_removal();
        cookie.to_string()
    }

    fn from_headers(&self, headers: &HeaderMap) -> Option<SessionData> {
        self.store.load(&self.session_id(headers)?)
    }

    /// The verified session id from the request cookie.
    fn session_id(&self, headers: &HeaderMap) -> Option<String> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(Cookie::split_parse)
            .filter_map(Result::ok)
            .find(|c| c.name() == SESSION_COOKIE)
            .and_then(|c| self.verify(c.value()))
    }

    fn cookie(&self, id: &str) -> String {
        Cookie::build((SESSION_COOKIE, format!("{id}.{}", self.sign(id))))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .build()
            .to_string()
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.secret).expect("HMAC accepts keys of any length")
    }

    fn sign(&self, id: &str) -> String {
        let mut mac = self.mac();
        mac.update(id.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Split `<id>.<signature>` and check the signature in constant time.
    fn verify(&self, value: &str) -> Option<String> {
        let (id, signature) = value.rsplit_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let mut mac = self.mac();
        mac.update(id.as_bytes());
        mac.verify_slice(&signature).ok()?;
        Some(id.to_string())
    }
}
