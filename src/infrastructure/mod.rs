// Infrastructure layer - configuration and the HTTP adapter
pub mod config;
pub mod http_client;
