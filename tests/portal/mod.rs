mod auth;
mod error_disclosure;
mod server;
