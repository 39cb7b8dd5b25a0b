//! # draftmill-entity
//!
//! Domain entity models for Draftmill: background jobs, typed job payloads,
//! and the article pipeline entity. Also defines the async store contracts
//! ([`job::store::JobStore`], [`article::store::ArticleStore`]) implemented
//! by the database crate and by in-memory fakes in tests.

pub mod article;
pub mod job;
