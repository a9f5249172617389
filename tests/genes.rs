use std::sync::Mutex;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use kira_ora::app::{ProgressEvent, ProgressSink};
use kira_ora::domain::GeneCase;
use kira_ora::error::OraError;
use kira_ora::genes::read_gene_list;
use kira_ora::labels::clean_label;

#[derive(Default)]
struct RecordingSink {
    messages: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn event(&self, event: ProgressEvent) {
        self.messages.lock().unwrap().push(event.message);
    }
}

#[test]
fn read_gene_file_preserves_order() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("genes.txt")).unwrap();
    std::fs::write(path.as_std_path(), "brca1,brca2\n\n  atm \nchek2,,palb2\n").unwrap();
    let sink = RecordingSink::default();

    let genes = read_gene_list(&path, GeneCase::Upper, &sink).unwrap();

    assert_eq!(genes, vec!["BRCA1", "BRCA2", "ATM", "CHEK2", "PALB2"]);
    let messages = sink.messages.lock().unwrap();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0], format!("5 genes read from {path}"));
}

#[test]
fn read_gene_file_missing() {
    let temp = tempfile::tempdir().unwrap();
    let path = Utf8PathBuf::from_path_buf(temp.path().join("nope.txt")).unwrap();
    let sink = RecordingSink::default();

    let err = read_gene_list(&path, GeneCase::Upper, &sink).unwrap_err();

    assert_matches!(err, OraError::InputNotFound(_));
    assert!(sink.messages.lock().unwrap().is_empty());
}

#[test]
fn label_cleaner_examples() {
    assert_eq!(
        clean_label("Apoptosis Regulation Pathway (GO:001234)", 3),
        "Apoptosis Regulation Pathway"
    );
    assert_eq!(clean_label("A B", 3), "A B");
}
