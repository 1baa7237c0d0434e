use std::io;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IoContext {
    pub byte_pos: u64,
    pub line_num: u64,
}

impl IoContext {
    pub(crate) const START: IoContext = IoContext {
        byte_pos: 0,
        line_num: 0,
    };
}

/// Which input of a paired run ran dry first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mate {
    First,
    Second,
}

impl std::fmt::Display for Mate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mate::First => f.write_str("mate 1"),
            Mate::Second => f.write_str("mate 2"),
        }
    }
}

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("expected header '@' at start of record")]
    MissingHeader,
    #[error("found FASTA header '>' where FASTQ '@' expected")]
    FastaHeaderDetected,
    #[error("missing '+' separator line")]
    MissingPlus,
    #[error("unexpected EOF inside record")]
    UnexpectedEof,
    #[error("quality length ({qual}) does not match sequence length ({seq})")]
    LengthMismatch { seq: usize, qual: usize },
    #[error("empty sequence")]
    EmptySequence,
}

#[derive(Debug, Error)]
pub enum FastqError {
    #[error("I/O error at {ctx:?}: {source}")]
    Io {
        #[source]
        source: io::Error,
        ctx: IoContext,
    },
    /// A malformed record; `ctx` points at its header line.
    #[error("format error at {ctx:?}: {source}")]
    Format {
        #[source]
        source: FormatError,
        ctx: IoContext,
    },
    #[error("paired inputs out of sync: {exhausted} ended after {records} records")]
    UnequalStreams { exhausted: Mate, records: u64 },
    #[error("duplicate read identifier '{id}' in mate index")]
    DuplicateId { id: String },
    #[error("no mate found for read '{id}'")]
    UnmatchedMate { id: String },
    #[error("operation cancelled")]
    Cancelled,
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl FastqError {
    pub(crate) fn io_err(source: io::Error, ctx: IoContext) -> Self {
        Self::Io { source, ctx }
    }
    pub(crate) fn fmt_err(source: FormatError, ctx: IoContext) -> Self {
        Self::Format { source, ctx }
    }
}
