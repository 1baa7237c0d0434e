use crate::batch::{LineBatch, RecordBatch, aligned_capacity};
use crate::error::{FastqError, IoContext};
use crate::policy::ReaderOptions;
use crate::record::FastqRecord;
use crate::util::{looks_like_gzip, open_file, wants_gzip};

#[cfg(feature = "gzip")]
use flate2::read::MultiGzDecoder;
use std::collections::VecDeque;
#[cfg(feature = "mmap")]
use std::io::Cursor;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum Source {
    Path(PathBuf),
    Reader,
}

/// Sync FASTQ reader (plain/.gz) that pulls fixed-size line batches.
pub struct FastqReader {
    src: Source,
    rdr: Box<dyn BufRead + Send>,
    opts: ReaderOptions,
    capacity: usize,
    line_num: u64,
    byte_pos: u64,
    exhausted: bool,
    // records of the current batch not yet handed out by `next`
    pending: VecDeque<FastqRecord>,
}

impl FastqReader {
    /// Open from a file path. Auto-detect `.gz` by extension or magic bytes.
    pub fn from_path<P: AsRef<Path>>(path: P, opts: ReaderOptions) -> Result<Self, FastqError> {
        let path = path.as_ref();
        let capacity = aligned_capacity(opts.batch_lines)?;
        let f = open_file(path).map_err(|e| FastqError::io_err(e, IoContext::START))?;

        let is_gz = wants_gzip(path) || looks_like_gzip(&f).unwrap_or(false);

        let rdr: Box<dyn BufRead + Send> = if is_gz {
            #[cfg(feature = "gzip")]
            {
                let dec = MultiGzDecoder::new(f);
                Box::new(BufReader::with_capacity(256 * 1024, dec))
            }
            #[cfg(not(feature = "gzip"))]
            {
                return Err(FastqError::Config(format!(
                    "{} is gzip-compressed but the `gzip` feature is disabled",
                    path.display()
                )));
            }
        } else {
            #[cfg(feature = "mmap")]
            {
                use memmap2::Mmap;
                // Own the Mmap inside Cursor to avoid self-ref problems
                let mmap = unsafe { Mmap::map(&f) }
                    .map_err(|e| FastqError::io_err(e, IoContext::START))?;
                Box::new(BufReader::with_capacity(512 * 1024, Cursor::new(mmap)))
            }
            #[cfg(not(feature = "mmap"))]
            {
                Box::new(BufReader::with_capacity(256 * 1024, f))
            }
        };

        log::debug!("opened {} (gzip: {is_gz})", path.display());
        Ok(Self::build(Source::Path(path.to_path_buf()), rdr, opts, capacity))
    }

    /// Wrap an arbitrary `BufRead` (stdin, in-memory data, ...).
    pub fn from_bufread<R: BufRead + Send + 'static>(
        reader: R,
        opts: ReaderOptions,
    ) -> Result<Self, FastqError> {
        let capacity = aligned_capacity(opts.batch_lines)?;
        Ok(Self::build(Source::Reader, Box::new(reader), opts, capacity))
    }

    fn build(
        src: Source,
        rdr: Box<dyn BufRead + Send>,
        opts: ReaderOptions,
        capacity: usize,
    ) -> Self {
        Self {
            src,
            rdr,
            opts,
            capacity,
            line_num: 0,
            byte_pos: 0,
            exhausted: false,
            pending: VecDeque::new(),
        }
    }

    pub fn source(&self) -> &Source {
        &self.src
    }

    pub fn options(&self) -> &ReaderOptions {
        &self.opts
    }

    /// Lines per batch after alignment to whole records.
    pub fn batch_capacity(&self) -> usize {
        self.capacity
    }

    /// Read up to `batch_capacity()` raw lines. A short batch is flagged
    /// `is_final`; every later call returns an empty final batch.
    pub fn read_batch(&mut self) -> Result<LineBatch, FastqError> {
        let mut batch = LineBatch::with_capacity(self.capacity);
        if self.exhausted {
            batch.is_final = true;
            return Ok(batch);
        }
        while batch.len() < self.capacity {
            let ctx = self.ctx();
            let mut line = String::with_capacity(256);
            let n = self
                .read_line(&mut line)
                .map_err(|e| FastqError::io_err(e, ctx))?;
            if n == 0 {
                self.exhausted = true;
                batch.is_final = true;
                break;
            }
            batch.push(line, ctx);
        }
        Ok(batch)
    }

    /// Read one batch and group it into records. `None` once the stream is
    /// drained.
    pub fn next_batch(&mut self) -> Result<Option<RecordBatch>, FastqError> {
        if !self.pending.is_empty() {
            return Ok(Some(RecordBatch {
                records: self.pending.drain(..).collect(),
                is_final: self.exhausted,
            }));
        }
        if self.exhausted {
            return Ok(None);
        }
        let lines = self.read_batch()?;
        if lines.is_empty() {
            return Ok(None);
        }
        let batch = lines.into_records(&self.opts)?;
        log::debug!(
            "batch of {} records ending at line {}",
            batch.records.len(),
            self.line_num
        );
        Ok(Some(batch))
    }

    /// Iterator-style `next` record.
    pub fn next(&mut self) -> Option<Result<FastqRecord, FastqError>> {
        loop {
            if let Some(rec) = self.pending.pop_front() {
                return Some(Ok(rec));
            }
            match self.next_batch() {
                Ok(Some(batch)) => self.pending.extend(batch.records),
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf)?;
        if n > 0 {
            self.line_num += 1;
            self.byte_pos += n as u64;
            if buf.ends_with('\n') {
                buf.pop();
            }
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(n)
    }

    #[inline]
    fn ctx(&self) -> IoContext {
        IoContext {
            byte_pos: self.byte_pos,
            line_num: self.line_num + 1,
        }
    }
}

impl Iterator for FastqReader {
    type Item = Result<FastqRecord, FastqError>;
    fn next(&mut self) -> Option<Self::Item> {
        FastqReader::next(self)
    }
}
