//! HTTP handlers for the gateway
//!
//! Session lifecycle handlers and the peer-admin facade over the
//! `PeerStore` collaborator.

pub mod peers;
pub mod session;

pub use peers::{
    create_peer, delete_peer, disable_peer, enable_peer, list_peers, peer_configuration,
    peer_qrcode, readdress_peer, rename_peer,
};
pub use session::{create_session, delete_session, get_release, get_session};
