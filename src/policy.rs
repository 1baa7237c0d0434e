use crate::suffix::MateSuffix;

/// What to do with a record that does not fit the 4-line layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPolicy {
    /// Log and drop the malformed record, keep reading.
    Skip,
    /// Return the first error to the caller and abort the run.
    Return,
}

/// Phred offset scale of the quality line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QualityEncoding {
    /// Phred+33.
    #[default]
    Sanger,
    /// Phred+64.
    Illumina,
}

impl QualityEncoding {
    #[inline]
    pub fn offset(self) -> u8 {
        match self {
            QualityEncoding::Sanger => 33,
            QualityEncoding::Illumina => 64,
        }
    }

    /// Quality character for a score of zero; pads join gaps.
    #[inline]
    pub fn filler(self) -> u8 {
        self.offset()
    }
}

/// How the trimmer searches for its cut point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimMode {
    /// Scan every candidate down to `min_length`.
    #[default]
    Exact,
    /// Stop at the first negative running sum (BWA behavior).
    EarlyExit,
}

/// Reads that are already shorter than `min_length` before trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortReadPolicy {
    #[default]
    Discard,
    KeepUntrimmed,
}

/// Two records in the indexed mate file share an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    #[default]
    Reject,
    Overwrite,
    KeepFirst,
}

/// A mate-1 record whose identifier is absent from the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedPolicy {
    #[default]
    Drop,
    Error,
    /// Join mode only: emit the mate-1 record on its own.
    PassThrough,
}

#[derive(Debug, Clone)]
pub struct ReaderOptions {
    pub error_policy: ErrorPolicy,
    pub fastq_only: bool,
    /// Lines pulled per batch; rounded up to a multiple of 4.
    pub batch_lines: usize,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            error_policy: ErrorPolicy::Return,
            fastq_only: true,
            batch_lines: 2000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct WriterOptions {
    /// gzip level used when the output path ends in `.gz`.
    pub compression_level: u32,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            compression_level: 6,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterOptions {
    pub max_ambiguous: usize,
}

#[derive(Debug, Clone)]
pub struct TrimOptions {
    pub quality_threshold: u8,
    pub min_length: usize,
    pub encoding: QualityEncoding,
    pub mode: TrimMode,
    pub short_reads: ShortReadPolicy,
}

impl Default for TrimOptions {
    fn default() -> Self {
        Self {
            quality_threshold: 13,
            min_length: 25,
            encoding: QualityEncoding::Sanger,
            mode: TrimMode::Exact,
            short_reads: ShortReadPolicy::Discard,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MateOptions {
    pub suffix: MateSuffix,
    pub duplicates: DuplicatePolicy,
    pub unmatched: UnmatchedPolicy,
    /// Number of `N` bases placed between joined mates.
    pub gap_size: usize,
    pub encoding: QualityEncoding,
}
