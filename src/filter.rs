//! Ambiguous-base filtering for single and paired streams.

use crate::cancel::CancellationToken;
use crate::error::{FastqError, Mate};
use crate::policy::{ErrorPolicy, FilterOptions};
use crate::reader::FastqReader;
use crate::record::FastqRecord;
use crate::writer::RecordSink;

/// True when `record` carries at most `max_ambiguous` `N` calls.
pub fn passes(record: &FastqRecord, max_ambiguous: usize) -> bool {
    record.ambiguous_count() <= max_ambiguous
}

/// Both mates must pass on their own.
pub fn passes_pair(r1: &FastqRecord, r2: &FastqRecord, max_ambiguous: usize) -> bool {
    passes(r1, max_ambiguous) && passes(r2, max_ambiguous)
}

#[derive(Debug, Clone)]
pub struct AmbiguityFilter {
    max_ambiguous: usize,
}

impl AmbiguityFilter {
    pub fn new(opts: &FilterOptions) -> Self {
        Self {
            max_ambiguous: opts.max_ambiguous,
        }
    }

    pub fn max_ambiguous(&self) -> usize {
        self.max_ambiguous
    }

    #[inline]
    pub fn passes(&self, record: &FastqRecord) -> bool {
        passes(record, self.max_ambiguous)
    }

    #[inline]
    pub fn passes_pair(&self, r1: &FastqRecord, r2: &FastqRecord) -> bool {
        passes_pair(r1, r2, self.max_ambiguous)
    }
}

/// Counts from one filtering pass. In paired mode a unit is a pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterSummary {
    pub records_in: u64,
    pub records_out: u64,
    pub rejected: u64,
}

/// Copy the records of `reader` that pass `filter` into `sink`.
pub fn filter_records<S: RecordSink>(
    reader: &mut FastqReader,
    sink: &mut S,
    filter: &AmbiguityFilter,
    cancel: &CancellationToken,
) -> Result<FilterSummary, FastqError> {
    let mut summary = FilterSummary::default();
    loop {
        cancel.check()?;
        let Some(batch) = reader.next_batch()? else {
            break;
        };
        for rec in &batch.records {
            summary.records_in += 1;
            if filter.passes(rec) {
                sink.write_record(rec)?;
                summary.records_out += 1;
            } else {
                summary.rejected += 1;
            }
        }
    }
    log::info!(
        "filter: {} of {} records kept (max {} N)",
        summary.records_out,
        summary.records_in,
        filter.max_ambiguous
    );
    Ok(summary)
}

/// Filter two mate streams in lockstep; a pair is kept only if both mates
/// pass. The streams must hold the same number of records, and neither may
/// skip malformed records: a dropped record would shift every later pair.
pub fn filter_pairs<S1: RecordSink, S2: RecordSink>(
    mate1: &mut FastqReader,
    mate2: &mut FastqReader,
    out1: &mut S1,
    out2: &mut S2,
    filter: &AmbiguityFilter,
    cancel: &CancellationToken,
) -> Result<FilterSummary, FastqError> {
    for (mate, reader) in [(Mate::First, &*mate1), (Mate::Second, &*mate2)] {
        if reader.options().error_policy == ErrorPolicy::Skip {
            return Err(FastqError::Config(format!(
                "{mate} reader skips malformed records, which would misalign pairs"
            )));
        }
    }
    let mut summary = FilterSummary::default();
    loop {
        cancel.check()?;
        let Some(batch) = mate1.next_batch()? else {
            break;
        };
        for r1 in &batch.records {
            let r2 = match mate2.next() {
                Some(r) => r?,
                None => {
                    return Err(FastqError::UnequalStreams {
                        exhausted: Mate::Second,
                        records: summary.records_in,
                    });
                }
            };
            summary.records_in += 1;
            if filter.passes_pair(r1, &r2) {
                out1.write_record(r1)?;
                out2.write_record(&r2)?;
                summary.records_out += 1;
            } else {
                summary.rejected += 1;
            }
        }
    }
    if let Some(extra) = mate2.next() {
        extra?;
        return Err(FastqError::UnequalStreams {
            exhausted: Mate::First,
            records: summary.records_in,
        });
    }
    log::info!(
        "filter: {} of {} pairs kept (max {} N per mate)",
        summary.records_out,
        summary.records_in,
        filter.max_ambiguous
    );
    Ok(summary)
}
