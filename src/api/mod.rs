//! HTTP bridge to the discourse backend.

mod client;

pub use client::{
    failure_discourse, ApiClient, ApiError, DiscourseDraft, JoinRequest, StatusEnvelope,
};
