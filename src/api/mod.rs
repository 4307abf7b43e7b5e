//! Backend API contract: wire types and the `ChatApi` trait.
//!
//! This module is split into:
//! - `mod.rs` - Types, errors, and the collaborator trait
//! - `client.rs` - HTTP implementation over reqwest

mod client;

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiserror::Error;

pub use client::HttpApi;

/// Opaque customer identifier assigned by the backend.
pub type UserId = i64;

/// Lifecycle status of a conversation thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThreadStatus {
    Pending,
    Resolved,
}

/// A customer conversation with aggregate status and preview.
#[derive(Debug, Clone, Deserialize)]
pub struct Thread {
    pub user_id: UserId,
    pub name: String,
    pub phone_number: String,
    pub status: ThreadStatus,
    /// Server-rendered, localized status text (e.g. "Pendiente").
    #[serde(default)]
    pub status_label: String,
    #[serde(default)]
    pub last_message: Option<String>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub remaining_seconds: i64,
    #[serde(default)]
    pub window_expired: bool,
    #[serde(default)]
    pub window_label: String,
}

/// Who authored a message. The backend sends "user" for customers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderRole {
    #[serde(rename = "user", alias = "customer")]
    Customer,
    Bot,
    Agent,
}

/// A single message within a thread. Immutable once created; the backend
/// assigns ordering (oldest first).
#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    pub sender_role: SenderRole,
    pub created_at: DateTime<Utc>,
}

/// Full thread snapshot as served by the backend.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThreadSnapshot {
    #[serde(default)]
    pub pending: Vec<Thread>,
    #[serde(default)]
    pub archived: Vec<Thread>,
}

/// Errors from the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the request and provided a reason. The text is
    /// shown to the user verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected response from server")]
    InvalidResponse,
}

/// The collaborator contract consumed by the sync engine.
///
/// Futures are `Send` so a generic actor over this trait can be spawned on
/// the multi-threaded runtime.
pub trait ChatApi: Send + 'static {
    /// `GET threads-snapshot`.
    fn fetch_threads(&self) -> impl Future<Output = Result<ThreadSnapshot, ApiError>> + Send;

    /// `GET messages(threadId)`, oldest first.
    fn fetch_messages(
        &self,
        user_id: UserId,
    ) -> impl Future<Output = Result<Vec<Message>, ApiError>> + Send;

    /// `POST send-message(threadId, text)`.
    fn send_message(
        &self,
        user_id: UserId,
        text: String,
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST resolve(threadId)`.
    fn resolve(&self, user_id: UserId) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST reopen(threadId)`.
    fn reopen(&self, user_id: UserId) -> impl Future<Output = Result<(), ApiError>> + Send;
}
