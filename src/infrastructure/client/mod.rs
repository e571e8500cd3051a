//! Clients for remote Teams APIs

mod http_client;

pub use http_client::HttpTeamsClient;
