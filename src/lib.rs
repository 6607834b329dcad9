//! Founder metrics: financial health, cash projection, pipeline
//! aggregation, weighted revenue forecast and deal scoring.
//!
//! Every calculator is a pure function of its inputs. Malformed numbers
//! read as `0`, zero denominators surface as [`models::Bounded::Unbounded`],
//! and the only clock is the `now` argument callers pass to the scorer.

pub mod config;
pub mod financials;
pub mod forecast;
pub mod import;
pub mod models;
pub mod parse;
pub mod pipeline;
pub mod report;
pub mod score;
