//! Storage layer for Shortlist.
//!
//! A corpus lives in one directory as two parallel files: `index.bin`
//! (bincode flat index) and `metadata.json` (records, in row order).

pub mod format;
pub mod loader;
pub mod writer;

pub use format::{CorpusPaths, IndexFile, INDEX_FILE, INDEX_FORMAT_VERSION, METADATA_FILE};
pub use loader::{load_corpus, load_corpus_dir};
pub use writer::write_corpus;

#[cfg(test)]
mod tests {
    use super::*;
    use shortlist_core::{AssessmentRecord, Error, FlatIndex, TestType, TestTypes, Vector};

    fn sample() -> (Vec<AssessmentRecord>, FlatIndex) {
        let records = vec![
            AssessmentRecord::new(
                0,
                "Core Java (Entry Level)",
                "https://catalog.test/products/core-java-entry-level/",
                TestTypes::from_iter([TestType::Knowledge]),
            ),
            AssessmentRecord::new(
                1,
                "Occupational Personality Questionnaire",
                "https://catalog.test/solutions/products/opq/",
                TestTypes::from_iter([TestType::Personality, TestType::Development]),
            ),
        ];
        let index = FlatIndex::from_vectors(
            3,
            [
                Vector::new(vec![1.0, 0.0, 0.0]),
                Vector::new(vec![0.0, 1.0, 0.0]),
            ],
        )
        .unwrap();
        (records, index)
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let (records, index) = sample();
        write_corpus(dir.path(), &records, &index).unwrap();

        let corpus = load_corpus_dir(dir.path()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.dim(), 3);
        assert_eq!(corpus.records(), records.as_slice());
    }

    #[test]
    fn test_missing_files_are_startup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_corpus_dir(dir.path()).unwrap_err();
        assert!(matches!(&err, Error::Startup(msg) if msg.contains("index not found")));

        let (records, index) = sample();
        let paths = write_corpus(dir.path(), &records, &index).unwrap();
        std::fs::remove_file(&paths.metadata).unwrap();
        let err = load_corpus(&paths).unwrap_err();
        assert!(matches!(&err, Error::Startup(msg) if msg.contains("metadata not found")));
    }

    #[test]
    fn test_corrupt_files_are_startup_errors() {
        let dir = tempfile::tempdir().unwrap();
        let (records, index) = sample();
        let paths = write_corpus(dir.path(), &records, &index).unwrap();

        std::fs::write(&paths.metadata, b"{ not json").unwrap();
        assert!(matches!(load_corpus(&paths), Err(Error::Startup(_))));

        write_corpus(dir.path(), &records, &index).unwrap();
        std::fs::write(&paths.index, b"\x01\x02").unwrap();
        assert!(matches!(load_corpus(&paths), Err(Error::Startup(_))));
    }

    #[test]
    fn test_count_mismatch_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let (records, index) = sample();
        let paths = write_corpus(dir.path(), &records, &index).unwrap();
        writer::write_metadata(&paths.metadata, &records[..1]).unwrap();

        let err = load_corpus(&paths).unwrap_err();
        assert!(matches!(&err, Error::Startup(msg) if msg.contains("1 records")));
    }

    #[test]
    fn test_writer_rejects_mismatched_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let (records, index) = sample();
        assert!(write_corpus(dir.path(), &records[..1], &index).is_err());
    }

    #[test]
    fn test_rejects_unknown_format_version() {
        let dir = tempfile::tempdir().unwrap();
        let (records, index) = sample();
        let paths = write_corpus(dir.path(), &records, &index).unwrap();
        let stale = IndexFile {
            format_version: INDEX_FORMAT_VERSION + 1,
            dim: 3,
            vectors: vec![0.0; 6],
        };
        std::fs::write(&paths.index, bincode::serialize(&stale).unwrap()).unwrap();

        let err = load_corpus(&paths).unwrap_err();
        assert!(matches!(&err, Error::Startup(msg) if msg.contains("format version")));
    }
}
