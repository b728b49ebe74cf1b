//! Peer store seam
//!
//! The gateway never owns peer state; it forwards CRUD intents to a
//! `PeerStore` collaborator and relays the results. Key-pair generation
//! and tunnel interface reconciliation live behind this trait and are out
//! of scope here.
//!
//! `MemoryPeerStore` is the in-process implementation used by the default
//! binary and the test-suite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use qrcode::{render::svg, QrCode};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

/// A VPN tunnel client record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Peer {
    pub id: Uuid,
    pub name: String,
    pub address: String,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum PeerStoreError {
    #[error("client not found: {0}")]
    NotFound(Uuid),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Conflict(String),
    #[error("peer store backend error: {0}")]
    Backend(String),
}

pub type PeerStoreResult<T> = Result<T, PeerStoreError>;

/// External peer-management collaborator. The gateway consumes this
/// contract; it assumes the implementation serializes conflicting
/// mutations internally.
#[async_trait]
pub trait PeerStore: Send + Sync {
    async fn list(&self) -> PeerStoreResult<Vec<Peer>>;
    async fn get(&self, id: Uuid) -> PeerStoreResult<Peer>;
    /// Render the client's tunnel configuration file.
    async fn configuration(&self, id: Uuid) -> PeerStoreResult<String>;
    /// Render the client's configuration as a scannable SVG.
    async fn qr_code_svg(&self, id: Uuid) -> PeerStoreResult<String>;
    async fn create(&self, name: &str) -> PeerStoreResult<Peer>;
    async fn delete(&self, id: Uuid) -> PeerStoreResult<()>;
    async fn enable(&self, id: Uuid) -> PeerStoreResult<Peer>;
    async fn disable(&self, id: Uuid) -> PeerStoreResult<Peer>;
    async fn update_name(&self, id: Uuid, name: &str) -> PeerStoreResult<Peer>;
    async fn update_address(&self, id: Uuid, address: &str) -> PeerStoreResult<Peer>;
}

/// In-memory peer store. Allocates addresses sequentially in 10.8.0.0/24
/// and renders configuration artifacts from stored fields. It does not
/// generate key material or touch a tunnel interface.
#[derive(Default)]
pub struct MemoryPeerStore {
    peers: RwLock<HashMap<Uuid, Peer>>,
}

impl MemoryPeerStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_address(peers: &HashMap<Uuid, Peer>) -> PeerStoreResult<String> {
        let used: Vec<&str> = peers.values().map(|p| p.address.as_str()).collect();
        for last in 2..=254u8 {
            let candidate = Ipv4Addr::new(10, 8, 0, last).to_string();
            if !used.contains(&candidate.as_str()) {
                return Ok(candidate);
            }
        }
        Err(PeerStoreError::Conflict(
            "No available addresses in 10.8.0.0/24".to_string(),
        ))
    }

    fn render_configuration(peer: &Peer) -> String {
        format!(
            "# {name}\n[Interface]\nAddress = {address}/24\n\n[Peer]\nAllowedIPs = 0.0.0.0/0, ::/0\nPersistentKeepalive = 25\n",
            name = peer.name,
            address = peer.address,
        )
    }

    fn update<F>(&self, id: Uuid, apply: F) -> PeerStoreResult<Peer>
    where
        F: FnOnce(&mut Peer),
    {
        let mut peers = self.peers.write();
        let peer = peers.get_mut(&id).ok_or(PeerStoreError::NotFound(id))?;
        apply(peer);
        peer.updated_at = Utc::now();
        Ok(peer.clone())
    }
}

#[async_trait]
impl PeerStore for MemoryPeerStore {
    async fn list(&self) -> PeerStoreResult<Vec<Peer>> {
        let mut peers: Vec<Peer> = self.peers.read().values().cloned().collect();
        peers.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(peers)
    }

    async fn get(&self, id: Uuid) -> PeerStoreResult<Peer> {
        self.peers
            .read()
            .get(&id)
            .cloned()
            .ok_or(PeerStoreError::NotFound(id))
    }

    async fn configuration(&self, id: Uuid) -> PeerStoreResult<String> {
        let peer = self.get(id).await?;
        Ok(Self::render_configuration(&peer))
    }

    async fn qr_code_svg(&self, id: Uuid) -> PeerStoreResult<String> {
        let configuration = self.configuration(id).await?;
        let code = QrCode::new(configuration.as_bytes())
            .map_err(|e| PeerStoreError::Backend(e.to_string()))?;
        Ok(code
            .render::<svg::Color>()
            .min_dimensions(256, 256)
            .build())
    }

    async fn create(&self, name: &str) -> PeerStoreResult<Peer> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PeerStoreError::InvalidArgument("Missing: Name".to_string()));
        }

        let mut peers = self.peers.write();
        let address = Self::allocate_address(&peers)?;
        let now = Utc::now();
        let peer = Peer {
            id: Uuid::new_v4(),
            name: name.to_string(),
            address,
            enabled: true,
            created_at: now,
            updated_at: now,
        };
        peers.insert(peer.id, peer.clone());
        info!("Created client {} ({})", peer.name, peer.id);
        Ok(peer)
    }

    async fn delete(&self, id: Uuid) -> PeerStoreResult<()> {
        let removed = self.peers.write().remove(&id);
        match removed {
            Some(peer) => {
                info!("Deleted client {} ({})", peer.name, peer.id);
                Ok(())
            }
            None => Err(PeerStoreError::NotFound(id)),
        }
    }

    async fn enable(&self, id: Uuid) -> PeerStoreResult<Peer> {
        self.update(id, |peer| peer.enabled = true)
    }

    async fn disable(&self, id: Uuid) -> PeerStoreResult<Peer> {
        self.update(id, |peer| peer.enabled = false)
    }

    async fn update_name(&self, id: Uuid, name: &str) -> PeerStoreResult<Peer> {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(PeerStoreError::InvalidArgument("Missing: Name".to_string()));
        }
        self.update(id, |peer| peer.name = name)
    }

    async fn update_address(&self, id: Uuid, address: &str) -> PeerStoreResult<Peer> {
        let address = address.trim().to_string();
        if address.parse::<Ipv4Addr>().is_err() {
            return Err(PeerStoreError::InvalidArgument(
                "Invalid: Address".to_string(),
            ));
        }
        self.update(id, |peer| peer.address = address)
    }
}
