//! biotools-utils — analysis and maintenance utilities for the bio.tools
//! registry of bioinformatics software.
//!
//! Each subcommand of the binary is an independent batch job; they share
//! only file-based handoffs (JSON tool dumps, CSV tables, JSON reference
//! indexes).

pub mod api;
pub mod cluster;
pub mod config;
pub mod encode;
pub mod extract;
pub mod licenses;
pub mod report;
pub mod table;
pub mod types;
