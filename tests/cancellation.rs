use ngs_mate_tools::{
    AmbiguityFilter, CancellationToken, FastqError, FastqReader, FastqRecord, FastqWriter,
    FilterOptions, MateOptions, MateReconciler, QualityTrimmer, ReaderOptions, RecordSink,
    TrimOptions, filter_pairs, trim_records,
};
use std::io::Write;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

/// Writer that trips `cancel` once it has taken `after` records, the way an
/// interrupt would land in the middle of a run.
struct TripWire {
    out: FastqWriter,
    cancel: CancellationToken,
    after: u64,
}

impl RecordSink for TripWire {
    fn write_record(&mut self, rec: &FastqRecord) -> Result<(), FastqError> {
        self.out.write_record(rec)?;
        if self.out.records_written() >= self.after {
            self.cancel.cancel();
        }
        Ok(())
    }
}

fn trip_wire(path: &Path, cancel: &CancellationToken) -> TripWire {
    TripWire {
        out: FastqWriter::to_path(path, Default::default()).unwrap(),
        cancel: cancel.clone(),
        after: 1,
    }
}

/// One record per batch.
fn reader(data: String) -> FastqReader {
    FastqReader::from_bufread(
        std::io::Cursor::new(data),
        ReaderOptions {
            batch_lines: 4,
            ..ReaderOptions::default()
        },
    )
    .unwrap()
}

fn mates(n: usize, mate: u8) -> String {
    (0..n)
        .map(|i| format!("@r{i}/{mate}\n{}\n+\n{}\n", "ACGT".repeat(8), "I".repeat(32)))
        .collect()
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn trim_stops_at_next_batch_and_leaves_no_output() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trimmed.fq");
    let cancel = CancellationToken::new();
    let mut sink = trip_wire(&path, &cancel);

    let err = trim_records(
        &mut reader(mates(5, 1)),
        &mut sink,
        &QualityTrimmer::new(TrimOptions::default()),
        &cancel,
    )
    .unwrap_err();

    assert!(matches!(err, FastqError::Cancelled));
    assert_eq!(sink.out.records_written(), 1);
    drop(sink);
    assert!(!path.exists());
}

#[test]
fn paired_filter_stops_mid_run_without_output() {
    let dir = tempdir().unwrap();
    let (p1, p2) = (dir.path().join("o1.fq"), dir.path().join("o2.fq"));
    let cancel = CancellationToken::new();
    let mut o1 = trip_wire(&p1, &cancel);
    let mut o2 = FastqWriter::to_path(&p2, Default::default()).unwrap();

    let err = filter_pairs(
        &mut reader(mates(5, 1)),
        &mut reader(mates(5, 2)),
        &mut o1,
        &mut o2,
        &AmbiguityFilter::new(&FilterOptions::default()),
        &cancel,
    )
    .unwrap_err();

    assert!(matches!(err, FastqError::Cancelled));
    assert_eq!(o1.out.records_written(), 1);
    assert_eq!(o2.records_written(), 1);
    drop(o1);
    drop(o2);
    assert!(!p1.exists());
    assert!(!p2.exists());
}

#[test]
fn pair_stops_mid_run_without_output() {
    let dir = tempdir().unwrap();
    let (p1, p2) = (dir.path().join("o1.fq"), dir.path().join("o2.fq"));
    let cancel = CancellationToken::new();
    let mut o1 = trip_wire(&p1, &cancel);
    let mut o2 = FastqWriter::to_path(&p2, Default::default()).unwrap();

    let mut rc = MateReconciler::new(MateOptions::default()).with_cancellation(cancel);
    let err = rc
        .pair(&mut reader(mates(5, 1)), &mut reader(mates(5, 2)), &mut o1, &mut o2)
        .unwrap_err();

    assert!(matches!(err, FastqError::Cancelled));
    assert_eq!(o2.records_written(), 1);
    drop((o1, o2));
    assert!(!p1.exists());
    assert!(!p2.exists());
}

#[cfg(feature = "gzip")]
#[test]
fn abandoned_gz_output_is_removed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("big.fq.gz");
    let mut w = FastqWriter::to_path(&path, Default::default()).unwrap();
    let rec = FastqRecord::new("r", None, vec![b'A'; 1000], vec![b'I'; 1000]).unwrap();
    for _ in 0..600 {
        w.write_record(&rec).unwrap();
    }
    w.abandon();
    assert!(!path.exists());
}

#[test]
fn finished_output_survives_drop() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kept.fq");
    let mut w = FastqWriter::to_path(&path, Default::default()).unwrap();
    w.write_record(&FastqRecord::new("k", None, b"AC".to_vec(), b"II".to_vec()).unwrap())
        .unwrap();
    w.finish().unwrap();
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "@k\nAC\n+\nII\n");
}

#[test]
fn dropped_stream_writer_discards_buffered_records() {
    let buf = SharedBuf::default();
    let mut w = FastqWriter::from_writer(buf.clone());
    w.write_record(&FastqRecord::new("k", None, b"AC".to_vec(), b"II".to_vec()).unwrap())
        .unwrap();
    drop(w);
    assert!(buf.0.lock().unwrap().is_empty());
}
