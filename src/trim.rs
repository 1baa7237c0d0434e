//! 3' quality trimming.
//!
//! Every quality character scores `q = c - offset`. Walking in from the 3'
//! end, the trimmer accumulates `threshold - q` and cuts where that running
//! deficit peaks, so the removed tail is the one whose quality falls furthest
//! below the threshold in aggregate. Reads are never cut below `min_length`.

use crate::cancel::CancellationToken;
use crate::error::FastqError;
use crate::policy::{QualityEncoding, ShortReadPolicy, TrimMode, TrimOptions};
use crate::reader::FastqReader;
use crate::record::FastqRecord;
use crate::writer::RecordSink;

/// Number of leading bases to keep.
///
/// The result `end` lies in `floor..=qual.len()`, where `floor` is
/// `min_length` but never below 1, and maximizes
/// `sum(threshold - q[i] for i in end..len)`. Ties keep the longer read.
/// A read can therefore be cut to exactly `min_length` bases; stated as a
/// last-kept index `x`, the search covers `min_length - 1..len`. Reads no
/// longer than `floor` are returned whole, and a non-empty read is never
/// trimmed to nothing, so trimmed output always parses again.
pub fn trim_point(
    qual: &[u8],
    threshold: u8,
    min_length: usize,
    encoding: QualityEncoding,
    mode: TrimMode,
) -> usize {
    let len = qual.len();
    let offset = i64::from(encoding.offset());
    let threshold = i64::from(threshold);

    let mut sum = 0i64;
    let mut best = 0i64;
    let mut end = len;
    for i in (min_length.max(1)..len).rev() {
        sum += threshold - (i64::from(qual[i]) - offset);
        if sum < 0 && mode == TrimMode::EarlyExit {
            break;
        }
        if sum > best {
            best = sum;
            end = i;
        }
    }
    end
}

/// Trim a Sanger-encoded record with an exact scan.
pub fn trim(record: &FastqRecord, quality_threshold: u8, min_length: usize) -> FastqRecord {
    let end = trim_point(
        &record.qual,
        quality_threshold,
        min_length,
        QualityEncoding::Sanger,
        TrimMode::Exact,
    );
    record.truncated(end)
}

#[derive(Debug, Clone)]
pub struct QualityTrimmer {
    opts: TrimOptions,
}

impl QualityTrimmer {
    pub fn new(opts: TrimOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &TrimOptions {
        &self.opts
    }

    pub fn cut_point(&self, record: &FastqRecord) -> usize {
        trim_point(
            &record.qual,
            self.opts.quality_threshold,
            self.opts.min_length,
            self.opts.encoding,
            self.opts.mode,
        )
    }

    /// Trim `record` in place. `None` when the read was already shorter
    /// than `min_length` and the policy discards such reads.
    pub fn trim(&self, mut record: FastqRecord) -> Option<FastqRecord> {
        if record.len() < self.opts.min_length {
            return match self.opts.short_reads {
                ShortReadPolicy::Discard => None,
                ShortReadPolicy::KeepUntrimmed => Some(record),
            };
        }
        let end = self.cut_point(&record);
        record.seq.truncate(end);
        record.qual.truncate(end);
        Some(record)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrimSummary {
    pub records_in: u64,
    pub records_out: u64,
    pub trimmed_records: u64,
    pub trimmed_bases: u64,
    pub discarded: u64,
}

/// Trim every record of `reader` and emit the survivors to `sink`.
pub fn trim_records<S: RecordSink>(
    reader: &mut FastqReader,
    sink: &mut S,
    trimmer: &QualityTrimmer,
    cancel: &CancellationToken,
) -> Result<TrimSummary, FastqError> {
    let mut summary = TrimSummary::default();
    loop {
        cancel.check()?;
        let Some(batch) = reader.next_batch()? else {
            break;
        };
        for rec in batch.records {
            summary.records_in += 1;
            let before = rec.len();
            match trimmer.trim(rec) {
                Some(out) => {
                    if out.len() < before {
                        summary.trimmed_records += 1;
                        summary.trimmed_bases += (before - out.len()) as u64;
                    }
                    sink.write_record(&out)?;
                    summary.records_out += 1;
                }
                None => summary.discarded += 1,
            }
        }
    }
    log::info!(
        "trim: {} records in, {} trimmed ({} bases), {} discarded as too short",
        summary.records_in,
        summary.trimmed_records,
        summary.trimmed_bases,
        summary.discarded
    );
    Ok(summary)
}
