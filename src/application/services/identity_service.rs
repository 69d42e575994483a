//! Minting of pseudonymous user identities.

use chrono::{Duration, Utc};
use rand::Rng;

use crate::domain::entities::User;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Mints random identity ids and decides how long they live.
///
/// Identities are not authenticated; the id is only an opaque cookie value.
#[derive(Debug, Clone)]
pub struct IdentityService {
    id_length: usize,
    ttl: Duration,
}

impl IdentityService {
    /// Creates a service minting ids of `id_length` characters that live for
    /// `ttl_days` days.
    pub fn new(id_length: usize, ttl_days: i64) -> Self {
        Self {
            id_length,
            ttl: Duration::days(ttl_days),
        }
    }

    /// How long a freshly minted or refreshed identity lives.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mints a new identity starting now.
    pub fn mint(&self) -> User {
        let now = Utc::now();
        User::new(self.generate_id(), now, now + self.ttl)
    }

    fn generate_id(&self) -> String {
        let mut rng = rand::rng();
        (0..self.id_length)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect()
    }
}
