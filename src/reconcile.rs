//! Mate reconciliation: re-pair two independently ordered mate files, or
//! join each matched pair into a single record.
//!
//! A run indexes the whole second file first, then streams the first file
//! against that index. The index is dropped when the run returns.

use crate::cancel::CancellationToken;
use crate::error::{FastqError, Mate};
use crate::index::MateIndex;
use crate::policy::{MateOptions, QualityEncoding, UnmatchedPolicy};
use crate::reader::FastqReader;
use crate::record::{AMBIGUOUS_BASE, FastqRecord, reverse_complement};
use crate::writer::RecordSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BuildIndex,
    Reconcile,
    Done,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Records held in the mate-2 index.
    pub indexed: u64,
    /// Records streamed from mate 1.
    pub mate1_records: u64,
    pub matched: u64,
    pub unmatched: u64,
}

/// Join two mates into one record:
/// `seq1 + N*gap + revcomp(seq2)` with `qual1 + filler*gap + reverse(qual2)`.
pub fn join_mates(
    id: String,
    mate1: &FastqRecord,
    mate2: &FastqRecord,
    gap_size: usize,
    encoding: QualityEncoding,
) -> FastqRecord {
    let total = mate1.len() + gap_size + mate2.len();

    let mut seq = Vec::with_capacity(total);
    seq.extend_from_slice(&mate1.seq);
    seq.resize(mate1.len() + gap_size, AMBIGUOUS_BASE);
    seq.extend_from_slice(&reverse_complement(&mate2.seq));

    let mut qual = Vec::with_capacity(total);
    qual.extend_from_slice(&mate1.qual);
    qual.resize(mate1.len() + gap_size, encoding.filler());
    qual.extend(mate2.qual.iter().rev());

    FastqRecord {
        id,
        desc: None,
        seq,
        qual,
    }
}

/// Drives one pair or join run through BuildIndex -> Reconcile -> Done.
#[derive(Debug)]
pub struct MateReconciler {
    opts: MateOptions,
    cancel: CancellationToken,
    phase: Phase,
}

impl MateReconciler {
    pub fn new(opts: MateOptions) -> Self {
        Self {
            opts,
            cancel: CancellationToken::new(),
            phase: Phase::BuildIndex,
        }
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn options(&self) -> &MateOptions {
        &self.opts
    }

    /// Write matched mates to `out1`/`out2` in mate-1 order, re-suffixed
    /// `/1` and `/2` (per the configured suffix rule).
    pub fn pair<S1: RecordSink, S2: RecordSink>(
        &mut self,
        mate1: &mut FastqReader,
        mate2: &mut FastqReader,
        out1: &mut S1,
        out2: &mut S2,
    ) -> Result<ReconcileSummary, FastqError> {
        if self.opts.unmatched == UnmatchedPolicy::PassThrough {
            return Err(FastqError::Config(
                "unmatched pass-through would desynchronize paired outputs".into(),
            ));
        }
        let index = self.build_index(mate2)?;
        let suffix = index.suffix();
        let summary = self.reconcile(mate1, &index, |key, r1, r2| {
            if let Some(r2) = r2 {
                out1.write_record(&r1.clone().with_id(suffix.apply(key, Mate::First)))?;
                out2.write_record(&r2.clone().with_id(suffix.apply(key, Mate::Second)))?;
            }
            Ok(())
        })?;
        log::info!(
            "pair: {} of {} mate-1 reads paired ({} indexed mate-2 reads)",
            summary.matched,
            summary.mate1_records,
            summary.indexed
        );
        Ok(summary)
    }

    /// Write one joined record per matched pair to `out`.
    pub fn join<S: RecordSink>(
        &mut self,
        mate1: &mut FastqReader,
        mate2: &mut FastqReader,
        out: &mut S,
    ) -> Result<ReconcileSummary, FastqError> {
        let index = self.build_index(mate2)?;
        let gap_size = self.opts.gap_size;
        let encoding = self.opts.encoding;
        let summary = self.reconcile(mate1, &index, |key, r1, r2| match r2 {
            Some(r2) => out.write_record(&join_mates(key.to_string(), r1, r2, gap_size, encoding)),
            // only reached under PassThrough
            None => out.write_record(r1),
        })?;
        log::info!(
            "join: {} of {} mate-1 reads joined (gap {gap_size})",
            summary.matched,
            summary.mate1_records
        );
        Ok(summary)
    }

    fn build_index(&mut self, mate2: &mut FastqReader) -> Result<MateIndex, FastqError> {
        if self.phase != Phase::BuildIndex {
            return Err(FastqError::Config(
                "a reconciler runs once; create a new one to start over".into(),
            ));
        }
        MateIndex::build_from_reader(mate2, self.opts.suffix, self.opts.duplicates, &self.cancel)
    }

    /// Stream mate 1 against `index`. `emit` gets the stripped key, the
    /// mate-1 record and its mate (`None` for pass-through of unmatched reads).
    fn reconcile<F>(
        &mut self,
        mate1: &mut FastqReader,
        index: &MateIndex,
        mut emit: F,
    ) -> Result<ReconcileSummary, FastqError>
    where
        F: FnMut(&str, &FastqRecord, Option<&FastqRecord>) -> Result<(), FastqError>,
    {
        self.phase = Phase::Reconcile;
        let mut summary = ReconcileSummary {
            indexed: index.len() as u64,
            ..ReconcileSummary::default()
        };
        let suffix = index.suffix();

        loop {
            self.cancel.check()?;
            let Some(batch) = mate1.next_batch()? else {
                break;
            };
            for r1 in &batch.records {
                summary.mate1_records += 1;
                let key = suffix.strip(&r1.id);
                match index.lookup(key) {
                    Some(r2) => {
                        emit(key, r1, Some(r2))?;
                        summary.matched += 1;
                    }
                    None => {
                        summary.unmatched += 1;
                        match self.opts.unmatched {
                            UnmatchedPolicy::Drop => {}
                            UnmatchedPolicy::Error => {
                                return Err(FastqError::UnmatchedMate { id: r1.id.clone() });
                            }
                            UnmatchedPolicy::PassThrough => emit(key, r1, None)?,
                        }
                    }
                }
            }
        }

        self.phase = Phase::Done;
        Ok(summary)
    }
}
