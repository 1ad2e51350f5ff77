//! Integration tests: full pipeline runs over in-memory snapshots.

mod fixtures;
mod pipeline;
