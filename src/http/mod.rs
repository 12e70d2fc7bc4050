pub mod client;
pub mod jwt;
pub mod types;

pub use client::HttpClient;
