//! Critical Infrastructure Vitals Index: scoring engine and facet query layer.
//!
//! [`vitals`] turns indicator snapshots into pillar, industry, and country
//! scores and assembles historical series; [`case_studies`] filters and pages
//! the tagged case-study collection. [`config`], [`telemetry`], and [`error`]
//! carry the service plumbing shared with the API binary.

pub mod case_studies;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod vitals;
