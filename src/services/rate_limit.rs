//! Sliding-window request counter keyed by client address.
//!
//! Each address keeps the instants of its requests inside the window. The
//! table holds at most `max_clients` addresses: when a new address arrives
//! and the table is full, addresses with no request inside the window are
//! dropped first, then the least recently seen one.

use std::collections::{HashMap, VecDeque};
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::server::ServerConfig;

#[derive(Debug, Default)]
struct ClientWindow {
    hits: VecDeque<Instant>,
    last_seen: Option<Instant>,
}

impl ClientWindow {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }
}

#[derive(Clone)]
pub struct RateLimiter {
    window: Duration,
    max_requests: usize,
    max_clients: usize,
    clients: Arc<Mutex<HashMap<IpAddr, ClientWindow>>>,
}

impl RateLimiter {
    pub fn new(window: Duration, max_requests: usize, max_clients: usize) -> Self {
        Self {
            window,
            max_requests,
            max_clients: max_clients.max(1),
            clients: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn from_config(config: &ServerConfig) -> Self {
        Self::new(
            Duration::from_secs(config.rate_limit_window_secs),
            config.rate_limit_max_requests,
            config.rate_limit_max_clients,
        )
    }

    /// Record a request from `ip`; returns `false` when it exceeds the limit.
    pub fn check(&self, ip: IpAddr) -> bool {
        self.check_at(ip, Instant::now())
    }

    /// Same as [`check`](Self::check) with an explicit clock.
    pub fn check_at(&self, ip: IpAddr, now: Instant) -> bool {
        let mut clients = self.clients.lock();

        if !clients.contains_key(&ip) && clients.len() >= self.max_clients {
            self.evict(&mut clients, now);
        }

        let entry = clients.entry(ip).or_default();
        entry.prune(now, self.window);
        entry.last_seen = Some(now);

        if entry.hits.len() >= self.max_requests {
            return false;
        }

        entry.hits.push_back(now);
        true
    }

    fn evict(&self, clients: &mut HashMap<IpAddr, ClientWindow>, now: Instant) {
        let window = self.window;
        clients.retain(|_, client| {
            client.prune(now, window);
            !client.hits.is_empty()
        });

        if clients.len() >= self.max_clients {
            if let Some(oldest) = clients
                .iter()
                .min_by_key(|(_, client)| client.last_seen)
                .map(|(ip, _)| *ip)
            {
                clients.remove(&oldest);
            }
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().len()
    }
}
