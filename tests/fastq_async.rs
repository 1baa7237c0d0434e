#[cfg(feature = "async")]
mod t {
    use ngs_mate_tools::{AsyncFastqReader, ErrorPolicy, ReaderOptions};
    use tempfile::tempdir;
    use tokio::fs::File;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn async_parse_plain() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.fastq");
        {
            let mut f = File::create(&path).await.unwrap();
            f.write_all(b"@id\nACGT\n+\n!!!!\n").await.unwrap();
        }
        let mut fq = AsyncFastqReader::from_path(
            &path,
            ReaderOptions {
                error_policy: ErrorPolicy::Return,
                fastq_only: true,
                batch_lines: 2000,
            },
        )
        .await
        .unwrap();

        if let Some(Ok(rec)) = fq.next_record().await {
            assert_eq!(rec.id, "id");
            assert_eq!(rec.seq, b"ACGT");
            assert_eq!(rec.qual, b"!!!!");
        } else {
            panic!("no record");
        }
        assert!(fq.next_record().await.is_none());
    }

    #[tokio::test]
    async fn async_batches_match_sync_contract() {
        let data: &'static [u8] = b"@a\nAC\n+\nII\n@b\nGT\n+\nII\n@c\nTT\n+\nII\n";
        let mut fq = AsyncFastqReader::from_async_bufread(
            data,
            ReaderOptions {
                batch_lines: 8,
                ..ReaderOptions::default()
            },
        )
        .unwrap();

        let first = fq.next_batch().await.unwrap().unwrap();
        assert_eq!(first.records.len(), 2);
        assert!(!first.is_final);

        let second = fq.next_batch().await.unwrap().unwrap();
        assert_eq!(second.records.len(), 1);
        assert!(second.is_final);
        assert_eq!(second.records[0].id, "c");

        assert!(fq.next_batch().await.unwrap().is_none());
    }
}
