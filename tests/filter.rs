use ngs_mate_tools::filter::{passes, passes_pair};
use ngs_mate_tools::{
    AmbiguityFilter, CancellationToken, ErrorPolicy, FastqError, FastqReader, FastqRecord,
    FilterOptions, Mate, ReaderOptions, filter_pairs, filter_records,
};
use proptest::prelude::*;

fn rec(id: &str, seq: &str) -> FastqRecord {
    FastqRecord::new(id, None, seq.as_bytes().to_vec(), vec![b'I'; seq.len()]).unwrap()
}

fn reader(data: &'static str) -> FastqReader {
    FastqReader::from_bufread(
        data.as_bytes(),
        ReaderOptions {
            batch_lines: 4,
            ..ReaderOptions::default()
        },
    )
    .unwrap()
}

proptest! {
    #[test]
    fn threshold_against_n_count(seq in "[ACGTN]{1,80}", threshold in 0usize..20) {
        let r = rec("r", &seq);
        let n = seq.bytes().filter(|&b| b == b'N').count();
        prop_assert_eq!(passes(&r, threshold), threshold >= n);
    }
}

#[test]
fn pair_requires_both_mates() {
    let r1 = rec("p/1", "ACNGT");
    let r2 = rec("p/2", "NNNAC");
    assert!(passes(&r1, 2));
    assert!(!passes_pair(&r1, &r2, 2));
    assert!(passes_pair(&r1, &r2, 3));
}

#[test]
fn single_stream_keeps_clean_reads() {
    let mut fq = reader("@a\nACGT\n+\nIIII\n@b\nANNT\n+\nIIII\n@c\nACNT\n+\nIIII\n");
    let mut out: Vec<FastqRecord> = Vec::new();
    let filter = AmbiguityFilter::new(&FilterOptions { max_ambiguous: 1 });

    let summary = filter_records(&mut fq, &mut out, &filter, &CancellationToken::new()).unwrap();
    assert_eq!(summary.records_in, 3);
    assert_eq!(summary.rejected, 1);
    let ids: Vec<&str> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

#[test]
fn paired_streams_drop_pairs_together() {
    let mut m1 = reader("@a/1\nACGT\n+\nIIII\n@b/1\nANGT\n+\nIIII\n");
    let mut m2 = reader("@a/2\nNNNT\n+\nIIII\n@b/2\nACGT\n+\nIIII\n");
    let (mut o1, mut o2): (Vec<FastqRecord>, Vec<FastqRecord>) = (Vec::new(), Vec::new());
    let filter = AmbiguityFilter::new(&FilterOptions { max_ambiguous: 2 });

    let summary =
        filter_pairs(&mut m1, &mut m2, &mut o1, &mut o2, &filter, &CancellationToken::new())
            .unwrap();
    assert_eq!(summary.records_out, 1);
    assert_eq!(o1[0].id, "b/1");
    assert_eq!(o2[0].id, "b/2");
}

#[test]
fn paired_streams_must_be_equinumerous() {
    let mut m1 = reader("@a/1\nACGT\n+\nIIII\n@b/1\nACGT\n+\nIIII\n");
    let mut m2 = reader("@a/2\nACGT\n+\nIIII\n");
    let (mut o1, mut o2): (Vec<FastqRecord>, Vec<FastqRecord>) = (Vec::new(), Vec::new());
    let filter = AmbiguityFilter::new(&FilterOptions::default());

    let err = filter_pairs(&mut m1, &mut m2, &mut o1, &mut o2, &filter, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(
        err,
        FastqError::UnequalStreams {
            exhausted: Mate::Second,
            records: 1
        }
    ));

    let mut m1 = reader("@a/1\nACGT\n+\nIIII\n");
    let mut m2 = reader("@a/2\nACGT\n+\nIIII\n@b/2\nACGT\n+\nIIII\n");
    let err = filter_pairs(&mut m1, &mut m2, &mut o1, &mut o2, &filter, &CancellationToken::new())
        .unwrap_err();
    assert!(matches!(
        err,
        FastqError::UnequalStreams {
            exhausted: Mate::First,
            ..
        }
    ));
}

#[test]
fn cancelled_filter_stops_before_reading() {
    let mut fq = reader("@a\nACGT\n+\nIIII\n");
    let mut out: Vec<FastqRecord> = Vec::new();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = filter_records(&mut fq, &mut out, &AmbiguityFilter::new(&FilterOptions::default()), &cancel)
        .unwrap_err();
    assert!(matches!(err, FastqError::Cancelled));
    assert!(out.is_empty());
}

#[test]
fn paired_filter_refuses_skipping_readers() {
    let lenient = || {
        FastqReader::from_bufread(
            "@a/1\nACGT\n+\nIIII\n@b/1\nACGT\n-\nIIII\n@c/1\nACGT\n+\nIIII\n".as_bytes(),
            ReaderOptions {
                error_policy: ErrorPolicy::Skip,
                batch_lines: 4,
                ..ReaderOptions::default()
            },
        )
        .unwrap()
    };
    let (mut o1, mut o2): (Vec<FastqRecord>, Vec<FastqRecord>) = (Vec::new(), Vec::new());
    let filter = AmbiguityFilter::new(&FilterOptions::default());

    let err = filter_pairs(
        &mut lenient(),
        &mut reader("@a/2\nACGT\n+\nIIII\n@b/2\nACGT\n+\nIIII\n@c/2\nACGT\n+\nIIII\n"),
        &mut o1,
        &mut o2,
        &filter,
        &CancellationToken::new(),
    )
    .unwrap_err();
    assert!(matches!(err, FastqError::Config(_)));
    assert!(o1.is_empty() && o2.is_empty());
}
