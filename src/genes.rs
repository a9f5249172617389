use std::fs;

use camino::Utf8Path;

use crate::app::{EventKind, ProgressEvent, ProgressSink};
use crate::domain::GeneCase;
use crate::error::OraError;

/// Reads a gene list where symbols are separated by commas and/or line breaks.
pub fn read_gene_list(
    path: &Utf8Path,
    case: GeneCase,
    sink: &dyn ProgressSink,
) -> Result<Vec<String>, OraError> {
    if !path.as_std_path().exists() {
        return Err(OraError::InputNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path.as_std_path()).map_err(|err| OraError::InputRead {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    let genes = parse_gene_list(&content, case);

    sink.event(ProgressEvent {
        kind: EventKind::Success,
        message: format!("{} genes read from {path}", genes.len()),
        elapsed: None,
    });
    Ok(genes)
}

pub fn parse_gene_list(content: &str, case: GeneCase) -> Vec<String> {
    content
        .split(|ch: char| matches!(ch, ',' | '\n' | '\r'))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| match case {
            GeneCase::Upper => token.to_uppercase(),
            GeneCase::Preserve => token.to_string(),
        })
        .collect()
}
