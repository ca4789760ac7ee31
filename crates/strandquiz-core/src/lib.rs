//! strandquiz-core: Quiz session engine, data model, and collaborator traits.
//!
//! This crate holds the strand grouping, answer capture, and the submission
//! state machine that the rest of strandquiz builds on. It performs no I/O
//! of its own beyond question bank files; network access sits behind the
//! traits in [`traits`].

pub mod answers;
pub mod bank;
pub mod catalog;
pub mod controller;
pub mod error;
pub mod grouping;
pub mod model;
pub mod report;
pub mod session;
pub mod traits;
