use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum OraError {
    #[error("input gene file not found: {0}")]
    #[diagnostic(help("pass the gene list with --input <PATH>"))]
    InputNotFound(Utf8PathBuf),

    #[error("failed to read input gene file {path}: {message}")]
    InputRead { path: Utf8PathBuf, message: String },

    #[error("gene list is empty: {0}")]
    EmptyGeneList(Utf8PathBuf),

    #[error("invalid gene-set library name: {0}")]
    InvalidLibrary(String),

    #[error("gene-set library not offered by Enrichr: {0}")]
    #[diagnostic(help("run `kira-ora --list-databases` to see the available libraries"))]
    UnknownLibrary(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(Utf8PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("Enrichr request failed: {0}")]
    EnrichrHttp(String),

    #[error("Enrichr returned status {status}: {message}")]
    EnrichrStatus { status: u16, message: String },

    #[error("unexpected Enrichr response: {0}")]
    EnrichrPayload(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("failed to write results table: {0}")]
    Csv(String),

    #[error("failed to render chart: {0}")]
    Plot(String),
}
