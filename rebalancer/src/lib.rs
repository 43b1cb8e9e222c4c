//! weightbook-rebalancer: command-line front end for the weightbook engine.
//!
//! Reads a rebalance request and a portfolio snapshot from JSON files,
//! computes suggested trades, prints the plan with an estimated cost, and
//! appends every run to a JSONL audit trail.

pub mod audit;
pub mod commands;
pub mod config;
pub mod error;
pub mod plan;
pub mod reconcile;
pub mod snapshot_file;
