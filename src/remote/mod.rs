// ABOUTME: Remote mastering service protocol
// ABOUTME: Wire types, browser headers, response decoding and the HTTP client

pub mod client;
pub mod codec;
pub mod headers;
pub mod models;
pub mod preset;

pub use client::MasteringClient;
pub use models::{JobHandle, Registration, StatusSnapshot, UploadCredentials};
