//! Fixed-capacity line batches and their conversion into records.
//!
//! Batch capacity is always a multiple of 4, so line `i` of any batch plays
//! role `i % 4` in its record (header, sequence, separator, quality) and no
//! record straddles two batches. Only the final batch of a stream can end
//! inside a record; that remainder is reported as `UnexpectedEof`.

use crate::error::{FastqError, FormatError, IoContext};
use crate::policy::{ErrorPolicy, ReaderOptions};
use crate::record::FastqRecord;

/// Raw lines from one read cycle, newline-stripped.
#[derive(Debug, Default)]
pub struct LineBatch {
    pub lines: Vec<String>,
    /// Position of each line in its stream.
    pub(crate) starts: Vec<IoContext>,
    /// Set when the stream ran out before the batch was full.
    pub is_final: bool,
}

impl LineBatch {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: Vec::with_capacity(capacity),
            starts: Vec::with_capacity(capacity),
            is_final: false,
        }
    }

    pub(crate) fn push(&mut self, line: String, ctx: IoContext) {
        self.lines.push(line);
        self.starts.push(ctx);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.lines.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Group lines four at a time into records. Malformed groups are handled
    /// per `opts.error_policy`.
    pub fn into_records(self, opts: &ReaderOptions) -> Result<RecordBatch, FastqError> {
        let LineBatch {
            lines,
            starts,
            is_final,
        } = self;
        let mut records = Vec::with_capacity(lines.len() / 4);
        let mut lines = lines.into_iter();
        let mut pos = 0usize;

        loop {
            let group: Vec<String> = lines.by_ref().take(4).collect();
            if group.is_empty() {
                break;
            }
            let ctx = starts[pos];
            pos += group.len();

            // stray blank lines at the end of a file
            if group.len() < 4 && group.iter().all(|l| l.is_empty()) {
                continue;
            }

            match parse_group(group, opts) {
                Ok(rec) => records.push(rec),
                Err(source) => {
                    let err = FastqError::fmt_err(source, ctx);
                    match opts.error_policy {
                        ErrorPolicy::Skip => log::warn!("skipping malformed record: {err}"),
                        ErrorPolicy::Return => return Err(err),
                    }
                }
            }
        }

        Ok(RecordBatch { records, is_final })
    }
}

/// Records extracted from one [`LineBatch`].
#[derive(Debug, Default)]
pub struct RecordBatch {
    pub records: Vec<FastqRecord>,
    pub is_final: bool,
}

/// Round a requested batch size up to the next multiple of 4.
pub(crate) fn aligned_capacity(requested: usize) -> Result<usize, FastqError> {
    if requested == 0 {
        return Err(FastqError::Config("batch size must be positive".into()));
    }
    let aligned = requested.div_ceil(4) * 4;
    if aligned != requested {
        log::debug!("batch size {requested} rounded up to {aligned} lines");
    }
    Ok(aligned)
}

fn parse_group(group: Vec<String>, opts: &ReaderOptions) -> Result<FastqRecord, FormatError> {
    let Ok([header, seq, plus, qual]) = <[String; 4]>::try_from(group) else {
        return Err(FormatError::UnexpectedEof);
    };

    let Some(name) = header.strip_prefix('@') else {
        if opts.fastq_only && header.starts_with('>') {
            return Err(FormatError::FastaHeaderDetected);
        }
        return Err(FormatError::MissingHeader);
    };
    let mut parts = name.splitn(2, char::is_whitespace);
    let id = parts.next().unwrap_or("").to_string();
    let desc = parts.next().map(|s| s.trim().to_string());

    if seq.is_empty() {
        return Err(FormatError::EmptySequence);
    }
    if !plus.starts_with('+') {
        return Err(FormatError::MissingPlus);
    }

    FastqRecord::new(id, desc, seq.into_bytes(), qual.into_bytes())
}
