use crate::error::{FastqError, IoContext};
use crate::policy::WriterOptions;
use crate::record::FastqRecord;
use crate::util::{create_file, wants_gzip};

#[cfg(feature = "gzip")]
use flate2::{Compression, write::GzEncoder};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Anything that accepts emitted records.
pub trait RecordSink {
    fn write_record(&mut self, rec: &FastqRecord) -> Result<(), FastqError>;
}

impl RecordSink for Vec<FastqRecord> {
    fn write_record(&mut self, rec: &FastqRecord) -> Result<(), FastqError> {
        self.push(rec.clone());
        Ok(())
    }
}

impl<S: RecordSink + ?Sized> RecordSink for &mut S {
    fn write_record(&mut self, rec: &FastqRecord) -> Result<(), FastqError> {
        (**self).write_record(rec)
    }
}

/// Output file that swallows every later write once discarded, so dropping
/// an encoder on top of it cannot push a trailer to disk.
struct OutFile {
    file: File,
    discard: bool,
}

impl Write for OutFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.discard {
            return Ok(buf.len());
        }
        self.file.write(buf)
    }
    fn flush(&mut self) -> io::Result<()> {
        if self.discard {
            return Ok(());
        }
        self.file.flush()
    }
}

enum Inner {
    Plain(Box<dyn Write + Send>),
    File(OutFile),
    #[cfg(feature = "gzip")]
    Gz(GzEncoder<OutFile>),
    Closed,
}

impl Write for Inner {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Inner::Plain(w) => w.write(buf),
            Inner::File(w) => w.write(buf),
            #[cfg(feature = "gzip")]
            Inner::Gz(w) => w.write(buf),
            Inner::Closed => Ok(buf.len()),
        }
    }
    fn flush(&mut self) -> io::Result<()> {
        match self {
            Inner::Plain(w) => w.flush(),
            Inner::File(w) => w.flush(),
            #[cfg(feature = "gzip")]
            Inner::Gz(w) => w.flush(),
            Inner::Closed => Ok(()),
        }
    }
}

/// Append-only FASTQ writer (plain/.gz).
///
/// Output is only committed by [`finish`](FastqWriter::finish). A writer that
/// is abandoned or dropped before that discards its buffered records, and a
/// file it created is removed.
pub struct FastqWriter {
    out: BufWriter<Inner>,
    path: Option<PathBuf>,
    line_num: u64,
    byte_pos: u64,
}

impl FastqWriter {
    /// Create `path`; gzip-compressed when it ends in `.gz`.
    pub fn to_path<P: AsRef<Path>>(path: P, opts: WriterOptions) -> Result<Self, FastqError> {
        let path = path.as_ref();
        if wants_gzip(path) && cfg!(not(feature = "gzip")) {
            return Err(FastqError::Config(format!(
                "cannot write {}: the `gzip` feature is disabled",
                path.display()
            )));
        }
        let file = OutFile {
            file: create_file(path).map_err(|e| FastqError::io_err(e, IoContext::START))?,
            discard: false,
        };
        #[cfg(feature = "gzip")]
        let inner = if wants_gzip(path) {
            Inner::Gz(GzEncoder::new(file, Compression::new(opts.compression_level)))
        } else {
            Inner::File(file)
        };
        #[cfg(not(feature = "gzip"))]
        let inner = {
            let _ = opts;
            Inner::File(file)
        };
        Ok(Self::build(inner, Some(path.to_path_buf())))
    }

    /// Wrap an arbitrary writer (stdout, a `Vec<u8>`, ...). No compression.
    pub fn from_writer<W: Write + Send + 'static>(writer: W) -> Self {
        Self::build(Inner::Plain(Box::new(writer)), None)
    }

    fn build(inner: Inner, path: Option<PathBuf>) -> Self {
        Self {
            out: BufWriter::with_capacity(256 * 1024, inner),
            path,
            line_num: 0,
            byte_pos: 0,
        }
    }

    /// Records written so far.
    pub fn records_written(&self) -> u64 {
        self.line_num / 4
    }

    /// Flush everything and close the gzip stream if there is one.
    pub fn finish(mut self) -> Result<(), FastqError> {
        let ctx = self.ctx();
        self.path = None;
        let inner = self
            .close()
            .into_inner()
            .map_err(|e| FastqError::io_err(e.into_error(), ctx))?;
        let closed = match inner {
            Inner::Plain(mut w) => w.flush(),
            Inner::File(mut f) => f.flush(),
            #[cfg(feature = "gzip")]
            Inner::Gz(enc) => enc.finish().and_then(|mut f| f.flush()),
            Inner::Closed => Ok(()),
        };
        closed.map_err(|e| FastqError::io_err(e, ctx))
    }

    /// Close without committing anything: buffered records are dropped, a
    /// gzip stream is left unterminated and a file created by
    /// [`to_path`](FastqWriter::to_path) is removed.
    pub fn abandon(mut self) {
        self.discard();
    }

    fn close(&mut self) -> BufWriter<Inner> {
        std::mem::replace(&mut self.out, BufWriter::new(Inner::Closed))
    }

    fn discard(&mut self) {
        let out = self.close();
        let pending = out.buffer().len();
        let (mut inner, _) = out.into_parts();
        match &mut inner {
            Inner::File(f) => f.discard = true,
            #[cfg(feature = "gzip")]
            Inner::Gz(enc) => enc.get_mut().discard = true,
            Inner::Plain(_) | Inner::Closed => {}
        }
        drop(inner);
        if let Some(path) = self.path.take() {
            if let Err(e) = std::fs::remove_file(&path) {
                log::warn!("could not remove abandoned output {}: {e}", path.display());
            }
        }
        log::debug!(
            "abandoned writer after {} records ({pending} buffered bytes dropped)",
            self.records_written()
        );
    }

    fn put(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.out.write_all(bytes)?;
        self.byte_pos += bytes.len() as u64;
        Ok(())
    }

    fn put_record(&mut self, rec: &FastqRecord) -> io::Result<()> {
        self.put(b"@")?;
        self.put(rec.id.as_bytes())?;
        if let Some(desc) = &rec.desc {
            self.put(b" ")?;
            self.put(desc.as_bytes())?;
        }
        self.put(b"\n")?;
        self.put(&rec.seq)?;
        self.put(b"\n+\n")?;
        self.put(&rec.qual)?;
        self.put(b"\n")?;
        self.line_num += 4;
        Ok(())
    }

    #[inline]
    fn ctx(&self) -> IoContext {
        IoContext {
            byte_pos: self.byte_pos,
            line_num: self.line_num,
        }
    }
}

impl Drop for FastqWriter {
    fn drop(&mut self) {
        if !matches!(self.out.get_ref(), Inner::Closed) {
            self.discard();
        }
    }
}

impl RecordSink for FastqWriter {
    fn write_record(&mut self, rec: &FastqRecord) -> Result<(), FastqError> {
        let ctx = self.ctx();
        self.put_record(rec).map_err(|e| FastqError::io_err(e, ctx))
    }
}
