//! Vector-tile post-processing: an iterative linestring unionizer and a
//! spatial adminizer, built on the collaborator seams in [`collab`].

pub mod adminizer;
pub mod candidate;
pub mod collab;
pub mod config;
pub mod curve;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod scorer;
pub mod spatial;
pub mod unionizer;
