//! In-memory index of one mate file, keyed by suffix-stripped identifier.

use ahash::AHashMap;
use std::collections::hash_map::Entry;

use crate::cancel::CancellationToken;
use crate::error::FastqError;
use crate::policy::DuplicatePolicy;
use crate::reader::FastqReader;
use crate::record::FastqRecord;
use crate::suffix::MateSuffix;

/// Owns every record of the indexed file; memory grows with that file.
#[derive(Debug, Clone)]
pub struct MateIndex {
    entries: AHashMap<String, FastqRecord>,
    suffix: MateSuffix,
    duplicates: DuplicatePolicy,
}

impl MateIndex {
    pub fn new(suffix: MateSuffix, duplicates: DuplicatePolicy) -> Self {
        Self {
            entries: AHashMap::new(),
            suffix,
            duplicates,
        }
    }

    /// Index a sequence of records in one forward pass.
    pub fn build<I>(
        records: I,
        suffix: MateSuffix,
        duplicates: DuplicatePolicy,
    ) -> Result<Self, FastqError>
    where
        I: IntoIterator<Item = FastqRecord>,
    {
        let mut index = Self::new(suffix, duplicates);
        for rec in records {
            index.insert(rec)?;
        }
        Ok(index)
    }

    /// Index every record of `reader`, checking `cancel` between batches.
    pub fn build_from_reader(
        reader: &mut FastqReader,
        suffix: MateSuffix,
        duplicates: DuplicatePolicy,
        cancel: &CancellationToken,
    ) -> Result<Self, FastqError> {
        let mut index = Self::new(suffix, duplicates);
        loop {
            cancel.check()?;
            let Some(batch) = reader.next_batch()? else {
                break;
            };
            for rec in batch.records {
                index.insert(rec)?;
            }
        }
        log::debug!("mate index holds {} records", index.len());
        Ok(index)
    }

    /// Add one record under its stripped identifier.
    pub fn insert(&mut self, record: FastqRecord) -> Result<(), FastqError> {
        let key = self.suffix.strip(&record.id).to_string();
        match self.entries.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => match self.duplicates {
                DuplicatePolicy::Reject => {
                    return Err(FastqError::DuplicateId {
                        id: slot.key().clone(),
                    });
                }
                DuplicatePolicy::Overwrite => {
                    log::warn!("duplicate read '{}': keeping the later record", slot.key());
                    slot.insert(record);
                }
                DuplicatePolicy::KeepFirst => {
                    log::warn!("duplicate read '{}': keeping the earlier record", slot.key());
                }
            },
        }
        Ok(())
    }

    /// Look up by an already-stripped identifier.
    pub fn lookup(&self, key: &str) -> Option<&FastqRecord> {
        self.entries.get(key)
    }

    /// Look up the mate of `record`, stripping its identifier first.
    pub fn mate_of(&self, record: &FastqRecord) -> Option<&FastqRecord> {
        self.lookup(self.suffix.strip(&record.id))
    }

    pub fn suffix(&self) -> MateSuffix {
        self.suffix
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
