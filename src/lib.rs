pub mod api;
pub mod bucket;
pub mod config;
pub mod data_backends;
pub mod error;
pub mod lnd_client;
pub mod runner;
pub mod shutdown;
pub mod tls;
pub mod uploader;
