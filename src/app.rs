use std::collections::HashSet;
use std::fs;
use std::time::{Duration, Instant};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;

use crate::domain::{
    DEFAULT_TOP_RESULTS, GeneCase, Library, SIGNIFICANCE_CUTOFF, default_libraries,
};
use crate::enrichr::{EnrichrClient, LibraryInfo};
use crate::error::OraError;
use crate::genes::read_gene_list;
use crate::plot::{ChartRenderer, PLOT_FILE_NAME, prepare_bars};
use crate::results::{RESULTS_FILE_NAME, ResultsTable, parse_export};

#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub input: Utf8PathBuf,
    pub output_dir: Utf8PathBuf,
    pub libraries: Vec<Library>,
    pub gene_case: GeneCase,
    pub validate_libraries: bool,
    pub description: String,
}

impl AnalysisRequest {
    pub fn new(input: impl Into<Utf8PathBuf>, output_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            libraries: default_libraries(),
            gene_case: GeneCase::Upper,
            validate_libraries: true,
            description: "kira-ora".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub genes: usize,
    pub libraries: Vec<String>,
    pub terms: usize,
    pub significant_terms: usize,
    pub cutoff: f64,
    pub results_path: Option<String>,
    pub plot_path: Option<String>,
    pub generated_at: String,
    #[serde(skip)]
    pub table: ResultsTable,
}

#[derive(Debug, Clone, Serialize)]
pub struct LibraryListResult {
    pub libraries: Vec<LibraryInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Info,
    Success,
    Warning,
}

#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub kind: EventKind,
    pub message: String,
    pub elapsed: Option<Duration>,
}

impl ProgressEvent {
    fn info(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Info,
            message: message.into(),
            elapsed: None,
        }
    }

    fn success(message: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Success,
            message: message.into(),
            elapsed: None,
        }
    }
}

pub trait ProgressSink {
    fn event(&self, event: ProgressEvent);
}

pub struct App<C: EnrichrClient, P: ChartRenderer> {
    client: C,
    renderer: P,
}

impl<C: EnrichrClient, P: ChartRenderer> App<C, P> {
    pub fn new(client: C, renderer: P) -> Self {
        Self { client, renderer }
    }

    /// Reads the gene file named by the request and runs the analysis on it.
    pub fn run(
        &self,
        request: &AnalysisRequest,
        sink: &dyn ProgressSink,
    ) -> Result<AnalysisResult, OraError> {
        let genes = read_gene_list(&request.input, request.gene_case, sink)?;
        self.analyze(&genes, request, sink)
    }

    pub fn analyze(
        &self,
        genes: &[String],
        request: &AnalysisRequest,
        sink: &dyn ProgressSink,
    ) -> Result<AnalysisResult, OraError> {
        if genes.is_empty() {
            return Err(OraError::EmptyGeneList(request.input.clone()));
        }
        if request.validate_libraries {
            self.validate_libraries(&request.libraries)?;
        }

        sink.event(ProgressEvent::info(format!(
            "running over-representation analysis on {} genes against {} libraries",
            genes.len(),
            request.libraries.len()
        )));
        let start = Instant::now();
        let list = self.client.add_list(genes, &request.description)?;
        tracing::debug!(user_list_id = list.user_list_id, "gene list submitted");

        let mut records = Vec::new();
        for library in &request.libraries {
            let text = self.client.export(&list, library)?;
            let parsed = parse_export(library, &text)?;
            tracing::debug!(%library, terms = parsed.len(), "library exported");
            records.extend(parsed);
        }
        sink.event(ProgressEvent {
            kind: EventKind::Info,
            message: format!("enrichr.response terms={}", records.len()),
            elapsed: Some(start.elapsed()),
        });

        let table = ResultsTable::new(records);
        let mut result = AnalysisResult {
            genes: genes.len(),
            libraries: request.libraries.iter().map(Library::to_string).collect(),
            terms: table.len(),
            significant_terms: table.significant_count(SIGNIFICANCE_CUTOFF),
            cutoff: SIGNIFICANCE_CUTOFF,
            results_path: None,
            plot_path: None,
            generated_at: iso_timestamp(),
            table,
        };

        if result.table.is_empty() {
            tracing::warn!("no enriched terms returned");
            sink.event(ProgressEvent {
                kind: EventKind::Warning,
                message: "no enriched terms found".to_string(),
                elapsed: None,
            });
            return Ok(result);
        }

        fs::create_dir_all(request.output_dir.as_std_path())
            .map_err(|err| OraError::Filesystem(err.to_string()))?;
        let results_path = request.output_dir.join(RESULTS_FILE_NAME);
        result.table.write_csv(&results_path)?;
        sink.event(ProgressEvent::success(format!(
            "results saved to {results_path}"
        )));
        result.results_path = Some(results_path.to_string());

        let plot_path = self.plot(
            &result.table,
            &request.output_dir,
            DEFAULT_TOP_RESULTS,
            sink,
        )?;
        result.plot_path = plot_path.map(|path| path.to_string());
        Ok(result)
    }

    /// Draws the `top` most significant terms; does nothing for an empty table.
    pub fn plot(
        &self,
        table: &ResultsTable,
        output_dir: &Utf8Path,
        top: usize,
        sink: &dyn ProgressSink,
    ) -> Result<Option<Utf8PathBuf>, OraError> {
        let bars = prepare_bars(table, top);
        if bars.is_empty() {
            return Ok(None);
        }
        fs::create_dir_all(output_dir.as_std_path())
            .map_err(|err| OraError::Filesystem(err.to_string()))?;
        let path = output_dir.join(PLOT_FILE_NAME);
        self.renderer.render(&bars, &path)?;
        sink.event(ProgressEvent::success(format!("chart saved to {path}")));
        Ok(Some(path))
    }

    pub fn list_libraries(&self, sink: &dyn ProgressSink) -> Result<LibraryListResult, OraError> {
        sink.event(ProgressEvent::info("fetching Enrichr library catalogue"));
        let mut libraries = self.client.libraries()?;
        libraries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(LibraryListResult { libraries })
    }

    fn validate_libraries(&self, requested: &[Library]) -> Result<(), OraError> {
        let available: HashSet<String> = self
            .client
            .libraries()?
            .into_iter()
            .map(|info| info.name)
            .collect();
        match requested
            .iter()
            .find(|library| !available.contains(library.as_str()))
        {
            Some(unknown) => Err(OraError::UnknownLibrary(unknown.to_string())),
            None => Ok(()),
        }
    }
}

fn iso_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
