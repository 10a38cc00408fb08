// Question extraction: layout-derived document text → structured, deduplicated questions.
// Pipeline: classifier → accumulator → normalize → dedup → stats.
// The core (classifier through stats) is pure and synchronous; I/O lives in cache,
// document and handlers.

pub mod accumulator;
pub mod cache;
pub mod classifier;
pub mod dedup;
pub mod document;
pub mod handlers;
pub mod merge;
pub mod normalize;
pub mod pipeline;
pub mod stats;
