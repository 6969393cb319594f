//! HTTP clients for the external services the reconciler talks to.

pub mod daily;
pub mod notification;
pub mod storage;
pub mod transcription;
