//! Result accumulation, display and export.
//!
//! A [`Reconciler`] owns the results of a batch: rows are appended as each
//! trip completes and are never changed afterwards. Front ends read
//! snapshots of it, either as truncated [`PreviewRow`]s for display or as
//! a full CSV export.

mod export;
mod preview;
mod reconciler;

pub use export::{COL_DISTANCE, COL_DURATION, COL_STATUS, ExportError, default_export_name};
pub use preview::{PREVIEW_MAX_CHARS, PreviewRow, TODAY_LABEL, truncate_for_display};
pub use reconciler::{Reconciler, ResultRow, Summary};
