#![cfg(feature = "async")]

use crate::batch::{LineBatch, RecordBatch, aligned_capacity};
use crate::error::{FastqError, IoContext};
use crate::policy::ReaderOptions;
use crate::record::FastqRecord;
use crate::util::wants_gzip;

use async_compression::tokio::bufread::GzipDecoder;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::io::{AsyncReadExt, AsyncSeekExt, SeekFrom};

#[derive(Debug)]
pub enum AsyncSource {
    Path(PathBuf),
    Reader,
}

/// Async FASTQ reader (plain/.gz) with the same batch contract as
/// [`FastqReader`](crate::FastqReader).
pub struct AsyncFastqReader {
    src: AsyncSource,
    rdr: BufReader<Box<dyn AsyncBufRead + Unpin + Send>>,
    opts: ReaderOptions,
    capacity: usize,
    line_num: u64,
    byte_pos: u64,
    exhausted: bool,
    pending: VecDeque<FastqRecord>,
}

impl AsyncFastqReader {
    /// Open async from path; `.gz` auto-detect by extension or magic bytes.
    pub async fn from_path<P: AsRef<Path>>(
        path: P,
        opts: ReaderOptions,
    ) -> Result<Self, FastqError> {
        let path = path.as_ref().to_path_buf();
        let capacity = aligned_capacity(opts.batch_lines)?;
        let mut f = File::open(&path)
            .await
            .map_err(|e| FastqError::io_err(e, IoContext::START))?;

        let is_gz = wants_gzip(&path) || looks_like_gzip_async(&mut f).await.unwrap_or(false);

        let inner: Box<dyn AsyncBufRead + Unpin + Send> = if is_gz {
            let mut gz = GzipDecoder::new(BufReader::with_capacity(256 * 1024, f));
            gz.multiple_members(true);
            Box::new(BufReader::with_capacity(256 * 1024, gz))
        } else {
            Box::new(BufReader::with_capacity(256 * 1024, f))
        };

        Ok(Self::build(AsyncSource::Path(path), inner, opts, capacity))
    }

    /// Wrap any async `AsyncBufRead`.
    pub fn from_async_bufread<R>(reader: R, opts: ReaderOptions) -> Result<Self, FastqError>
    where
        R: AsyncBufRead + Unpin + Send + 'static,
    {
        let capacity = aligned_capacity(opts.batch_lines)?;
        Ok(Self::build(AsyncSource::Reader, Box::new(reader), opts, capacity))
    }

    fn build(
        src: AsyncSource,
        inner: Box<dyn AsyncBufRead + Unpin + Send>,
        opts: ReaderOptions,
        capacity: usize,
    ) -> Self {
        Self {
            src,
            rdr: BufReader::with_capacity(256 * 1024, inner),
            opts,
            capacity,
            line_num: 0,
            byte_pos: 0,
            exhausted: false,
            pending: VecDeque::new(),
        }
    }

    pub fn source(&self) -> &AsyncSource {
        &self.src
    }

    /// Read up to the batch capacity of raw lines; short batch => final.
    pub async fn read_batch(&mut self) -> Result<LineBatch, FastqError> {
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
                .await
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

    pub async fn next_batch(&mut self) -> Result<Option<RecordBatch>, FastqError> {
        if !self.pending.is_empty() {
            return Ok(Some(RecordBatch {
                records: self.pending.drain(..).collect(),
                is_final: self.exhausted,
            }));
        }
        if self.exhausted {
            return Ok(None);
        }
        let lines = self.read_batch().await?;
        if lines.is_empty() {
            return Ok(None);
        }
        lines.into_records(&self.opts).map(Some)
    }

    /// Fetch next record (async).
    pub async fn next_record(&mut self) -> Option<Result<FastqRecord, FastqError>> {
        loop {
            if let Some(rec) = self.pending.pop_front() {
                return Some(Ok(rec));
            }
            match self.next_batch().await {
                Ok(Some(batch)) => self.pending.extend(batch.records),
                Ok(None) => return None,
                Err(err) => return Some(Err(err)),
            }
        }
    }

    async fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        buf.clear();
        let n = self.rdr.read_line(buf).await?;
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

async fn looks_like_gzip_async(f: &mut File) -> io::Result<bool> {
    let pos = f.stream_position().await?;
    let mut magic = [0u8; 2];
    let n = f.read(&mut magic).await?;
    f.seek(SeekFrom::Start(pos)).await?;
    Ok(n >= 2 && magic == [0x1F, 0x8B])
}
