//! Spatial indexing for neighbour queries

pub mod sparse_hash;

pub use sparse_hash::SpatialGridIndex;
