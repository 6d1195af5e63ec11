#![forbid(unsafe_code)]

//! Core: canonical input events and the cancellation primitive.

pub mod cancel;
pub mod event;
