//! Mate-pair reconciliation, ambiguity filtering and quality trimming for
//! FASTQ streams.
//!
//! - Plain and `.gz` input (auto-detect) and output (by extension).
//! - Inputs are pulled in fixed-size line batches; batch sizes are whole
//!   multiples of four lines so records never straddle a batch.
//! - `pair` re-synchronizes two independently ordered mate files through an
//!   in-memory index of the second file; `join` merges each matched pair into
//!   one record with an `N` gap.
//! - Every streaming pass checks a [`CancellationToken`] between batches.
//! - Optional `mmap` for plain files; `zlib` feature for system-zlib parity.
//! - Optional async reader behind the `async` feature.

pub mod batch;
pub mod cancel;
pub mod error;
pub mod filter;
pub mod index;
pub mod policy;
pub mod reader;
pub mod reconcile;
pub mod record;
pub mod suffix;
pub mod trim;
pub mod writer;
mod util;

#[cfg(feature = "async")]
pub mod async_reader;

pub use crate::batch::{LineBatch, RecordBatch};
pub use crate::cancel::CancellationToken;
pub use crate::error::{FastqError, FormatError, IoContext, Mate};
pub use crate::filter::{AmbiguityFilter, FilterSummary, filter_pairs, filter_records};
pub use crate::index::MateIndex;
pub use crate::policy::{
    DuplicatePolicy, ErrorPolicy, FilterOptions, MateOptions, QualityEncoding, ReaderOptions,
    ShortReadPolicy, TrimMode, TrimOptions, UnmatchedPolicy, WriterOptions,
};
pub use crate::reader::{FastqReader, Source};
pub use crate::reconcile::{MateReconciler, Phase, ReconcileSummary, join_mates};
pub use crate::record::{FastqRecord, reverse_complement};
pub use crate::suffix::MateSuffix;
pub use crate::trim::{QualityTrimmer, TrimSummary, trim_point, trim_records};
pub use crate::writer::{FastqWriter, RecordSink};

#[cfg(feature = "async")]
pub use crate::async_reader::{AsyncFastqReader, AsyncSource};
