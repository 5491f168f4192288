//! Cloudbuster - low-cloud scene selection for satellite mosaics
//!
//! Given an area of interest and a catalog of candidate scenes, each with
//! a footprint polygon and a cloud-cover percentage, this library picks an
//! ordered set of scenes that covers the area with as little cloud as
//! possible. The selection feeds an external pipeline that downloads the
//! scenes and builds cloud-reduced mosaics.
//!
//! # Modules
//!
//! - [`geometry`]: polygon area, intersection and difference over `geo`
//! - [`catalog`]: input decoding and pre-selection filters
//! - [`selection`]: the greedy multi-layer and backstop selectors
//! - [`output`]: report writing with the error-artifact policy
//! - [`config`]: selection settings and the INI configuration file
//! - [`logging`]: `tracing` subscriber setup

pub mod catalog;
pub mod config;
pub mod geometry;
pub mod logging;
pub mod output;
pub mod selection;

pub use catalog::{SceneFilter, SceneQueryResponse};
pub use config::SelectionConfig;
pub use selection::{select_from_scenes, select_scenes, SelectionError, SelectionOutcome};
