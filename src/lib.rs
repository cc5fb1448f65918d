//! # ateco-extractor
//!
//! Export Italian company records by ATECO code and province from the
//! OpenAPI Company API to an XLSX workbook.
//!
//! ## Design Philosophy
//!
//! The crate is a straight-line extract-transform-load pipeline:
//! - **Single-pass** - records flow from the paginated API through the
//!   flattener into the workbook exactly once, with one request in flight
//!   at any time
//! - **Permissive flattening** - a missing field degrades to an empty cell,
//!   never to a failed record
//! - **Terminal errors** - platform and validation failures propagate
//!   immediately, there is no retry or partial recovery
//!
//! ## Quick Start
//!
//! ```no_run
//! use ateco_extractor::{CompanyClient, SearchParams, export_to_xlsx, flatten_record};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CompanyClient::new("my-token", false)?;
//!     let params = SearchParams::new("VR", "10.71")?;
//!
//!     let mut cursor = client.search(params, Some(500))?;
//!     let mut rows = Vec::new();
//!     while let Some(record) = cursor.try_next().await? {
//!         rows.push(flatten_record(&record));
//!     }
//!
//!     let written = export_to_xlsx(&rows, "companies.xlsx")?;
//!     println!("{written} rows written");
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// OpenAPI Company endpoint client
pub mod client;
/// Error types
pub mod error;
/// XLSX workbook output
pub mod export;
/// Payload flattening into tabular rows
pub mod flatten;
/// Paginated record cursor
pub mod pagination;
/// Search parameters and ATECO code handling
pub mod types;

// Re-export commonly used types
pub use client::{CompanyClient, PRODUCTION_BASE_URL, SANDBOX_BASE_URL};
pub use error::{Error, Result};
pub use export::{SHEET_NAME, export_to_xlsx};
pub use flatten::{FlatRecord, field_names, flatten_record};
pub use pagination::RecordCursor;
pub use types::{MAX_PAGE_SIZE, SearchParams, sanitize_ateco_code};
