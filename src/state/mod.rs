//! State module for tracking crawl progress
//!
//! `CrawlPhase` is the coordinator's traversal state machine. Durable progress lives
//! in the output table (see `storage`); this module only tracks the in-process phase.

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
