use crate::error::FormatError;

/// Placeholder base for an uncalled position.
pub const AMBIGUOUS_BASE: u8 = b'N';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FastqRecord {
    pub id: String,
    pub desc: Option<String>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
}

impl FastqRecord {
    /// Build a record, rejecting sequence/quality length mismatches.
    pub fn new(
        id: impl Into<String>,
        desc: Option<String>,
        seq: Vec<u8>,
        qual: Vec<u8>,
    ) -> Result<Self, FormatError> {
        if seq.len() != qual.len() {
            return Err(FormatError::LengthMismatch {
                seq: seq.len(),
                qual: qual.len(),
            });
        }
        Ok(Self {
            id: id.into(),
            desc,
            seq,
            qual,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.seq.len()
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Number of `N` calls in the sequence.
    pub fn ambiguous_count(&self) -> usize {
        self.seq.iter().filter(|&&b| b == AMBIGUOUS_BASE).count()
    }

    /// Copy of this record cut down to its first `len` bases.
    pub fn truncated(&self, len: usize) -> Self {
        let len = len.min(self.seq.len());
        Self {
            id: self.id.clone(),
            desc: self.desc.clone(),
            seq: self.seq[..len].to_vec(),
            qual: self.qual[..len].to_vec(),
        }
    }

    /// Same record under a different identifier.
    pub fn with_id(mut self, id: String) -> Self {
        self.id = id;
        self
    }
}

#[inline]
fn complement(b: u8) -> u8 {
    match b {
        b'A' => b'T',
        b'T' => b'A',
        b'C' => b'G',
        b'G' => b'C',
        other => other,
    }
}

/// Reverse complement; anything but uppercase A/C/G/T (lowercase included)
/// passes through unchanged.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}
