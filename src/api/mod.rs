pub mod client;

pub use client::{delete_report_line, BiotoolsClient, DeleteOutcome};
