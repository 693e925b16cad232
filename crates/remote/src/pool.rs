//! Round-robin pool of clients, one per local outbound address.

use std::fs;
use std::net::IpAddr;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};
use warmind_core::config::RemoteConfig;

use crate::client::{Client, ReqwestTransport, ThrottlePolicy};
use crate::error::ClientError;

pub struct ClientPool {
    clients: Vec<Client>,
    next: AtomicUsize,
}

impl ClientPool {
    /// Builds one client per configured address plus one per line of the
    /// address file. Addresses that cannot be bound are skipped; with none left
    /// a single unbound client is used.
    pub fn from_config(config: &RemoteConfig) -> Result<Self, ClientError> {
        let policy = ThrottlePolicy::from_config(config);
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let mut addresses = config.local_addresses.clone();
        addresses.extend(read_address_file(&config.local_addresses_file));

        let mut clients = Vec::with_capacity(addresses.len().max(1));
        for address in addresses {
            match bind_client(&address, timeout) {
                Ok(transport) => {
                    clients.push(Client::new(Arc::new(transport), config.base_url.clone(), policy, address));
                }
                Err(bind_error) => error!(
                    event_name = "remote.pool.bind_failed",
                    address = %address,
                    error = %bind_error,
                    "skipping local address"
                ),
            }
        }

        if clients.is_empty() {
            let transport = ReqwestTransport::new(None, timeout)?;
            clients.push(Client::new(Arc::new(transport), config.base_url.clone(), policy, "default"));
        }

        info!(event_name = "remote.pool.ready", clients = clients.len(), "client pool ready");
        Ok(Self::with_clients(clients))
    }

    pub fn with_clients(clients: Vec<Client>) -> Self {
        Self { clients, next: AtomicUsize::new(0) }
    }

    /// Next client in rotation. Safe to call from concurrent requests.
    pub fn get(&self) -> Option<&Client> {
        if self.clients.is_empty() {
            return None;
        }
        let index = self.next.fetch_add(1, Ordering::Relaxed) % self.clients.len();
        self.clients.get(index)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}

fn bind_client(address: &str, timeout: Duration) -> Result<ReqwestTransport, ClientError> {
    let ip = address.trim().parse::<IpAddr>().map_err(|_| ClientError::InvalidAddress(address.to_string()))?;
    ReqwestTransport::new(Some(ip), timeout)
}

fn read_address_file(path: &Path) -> Vec<String> {
    match fs::read_to_string(path) {
        Ok(raw) => raw.lines().map(str::trim).filter(|line| !line.is_empty()).map(str::to_string).collect(),
        Err(_) => {
            warn!(path = %path.display(), "local address list not found, using configured addresses only");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::fs;
    use std::sync::Arc;

    use tempfile::TempDir;
    use warmind_core::config::AppConfig;

    use super::{read_address_file, ClientPool};
    use crate::client::{Client, ThrottlePolicy};
    use crate::fixtures::ScriptedTransport;

    fn pool_of(labels: &[&str]) -> ClientPool {
        ClientPool::with_clients(
            labels
                .iter()
                .map(|label| {
                    Client::new(Arc::new(ScriptedTransport::default()), "https://example.test", ThrottlePolicy::default(), *label)
                })
                .collect(),
        )
    }

    #[test]
    fn get_rotates_through_every_client_in_order() {
        let pool = pool_of(&["a", "b", "c"]);

        let picked: Vec<String> =
            (0..7).filter_map(|_| pool.get().map(|client| client.label().to_string())).collect();

        assert_eq!(picked, ["a", "b", "c", "a", "b", "c", "a"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_callers_spread_evenly() {
        let pool = Arc::new(pool_of(&["a", "b", "c", "d"]));
        let mut handles = Vec::new();
        for _ in 0..8 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                (0..50).filter_map(|_| pool.get().map(|client| client.label().to_string())).collect::<Vec<_>>()
            }));
        }

        let mut counts = std::collections::HashMap::new();
        for handle in handles {
            for label in handle.await.expect("task") {
                *counts.entry(label).or_insert(0) += 1;
            }
        }

        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|count| *count == 100), "counts: {counts:?}");
    }

    #[test]
    fn address_file_lines_are_trimmed_and_blank_lines_skipped() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("local_clients.txt");
        fs::write(&path, "2001:db8::1\n\n  2001:db8::2  \n").expect("write");

        assert_eq!(read_address_file(&path), ["2001:db8::1", "2001:db8::2"]);
        assert!(read_address_file(&dir.path().join("missing.txt")).is_empty());
    }

    #[test]
    fn unusable_addresses_fall_back_to_one_default_client() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("local_clients.txt");
        fs::write(&path, "not-an-address\n").expect("write");

        let mut config = AppConfig::default().remote;
        config.local_addresses_file = path;

        let pool = ClientPool::from_config(&config).expect("pool");

        assert_eq!(pool.len(), 1);
        let labels: HashSet<&str> = pool.get().map(|client| client.label()).into_iter().collect();
        assert!(labels.contains("default"));
    }
}
