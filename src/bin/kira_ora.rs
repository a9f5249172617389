use std::process::ExitCode;

use camino::Utf8PathBuf;
use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use kira_ora::app::{AnalysisRequest, App, ProgressSink};
use kira_ora::config::{ConfigLoader, ConfigOverrides};
use kira_ora::domain::{DEFAULT_TOP_RESULTS, GeneCase, Organism};
use kira_ora::enrichr::EnrichrHttpClient;
use kira_ora::error::OraError;
use kira_ora::output::{ConsoleOutput, JsonOutput, OutputMode};
use kira_ora::plot::PngChartRenderer;

#[derive(Parser)]
#[command(name = "kira-ora")]
#[command(about = "Gene-set over-representation analysis (GO, KEGG, Reactome) via Enrichr")]
#[command(version, author)]
struct Cli {
    /// Gene list, symbols separated by commas or line breaks
    #[arg(long, default_value = "data/genes_input.txt")]
    input: Utf8PathBuf,

    /// Directory receiving enrichment_results.csv and enrichment_plot.png
    #[arg(long, default_value = "results")]
    output: Utf8PathBuf,

    /// Enrichr gene-set libraries (space separated)
    #[arg(long, num_args = 1..)]
    databases: Option<Vec<String>>,

    /// Redraw the chart with --top rows after the analysis
    #[arg(long, visible_alias = "plot")]
    graficar: bool,

    /// Rows drawn by --graficar (default 10, at most 100); the config file `top` key is also
    /// only used by --graficar
    #[arg(long, requires = "graficar", value_parser = clap::value_parser!(u16).range(1..=100))]
    top: Option<u16>,

    #[arg(long)]
    organism: Option<Organism>,

    /// Keep gene symbols as written instead of uppercasing them
    #[arg(long)]
    preserve_case: bool,

    /// Skip checking the libraries against the Enrichr catalogue
    #[arg(long)]
    no_validate: bool,

    #[arg(long)]
    config: Option<Utf8PathBuf>,

    /// Print the run summary as JSON
    #[arg(long)]
    json: bool,

    /// List the libraries offered by Enrichr and exit
    #[arg(long)]
    list_databases: bool,
}

fn main() -> ExitCode {
    if let Err(report) = run() {
        eprintln!("{report:?}");
        if let Some(error) = report.downcast_ref::<OraError>() {
            return ExitCode::from(map_exit_code(error));
        }
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn map_exit_code(error: &OraError) -> u8 {
    match error {
        OraError::InputNotFound(_)
        | OraError::InputRead { .. }
        | OraError::EmptyGeneList(_)
        | OraError::InvalidLibrary(_)
        | OraError::UnknownLibrary(_)
        | OraError::ConfigRead(_)
        | OraError::ConfigParse(_) => 2,
        OraError::EnrichrHttp(_)
        | OraError::EnrichrStatus { .. }
        | OraError::EnrichrPayload(_) => 3,
        _ => 1,
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output_mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Console
    };

    let overrides = ConfigOverrides {
        databases: cli.databases.clone(),
        organism: cli.organism,
        top: cli.top.map(usize::from),
    };
    let config = ConfigLoader::resolve(cli.config.as_deref(), overrides)?;
    tracing::debug!(url = %config.enrichr_url, organism = %config.organism, "resolved config");

    let client = EnrichrHttpClient::new(&config.enrichr_url, config.timeout)?;
    let app = App::new(client, PngChartRenderer::default());
    let sink: &dyn ProgressSink = match output_mode {
        OutputMode::Console => &ConsoleOutput,
        OutputMode::Json => &JsonOutput,
    };

    if cli.list_databases {
        let result = app.list_libraries(sink)?;
        return match output_mode {
            OutputMode::Console => {
                ConsoleOutput::print_libraries(&result);
                Ok(())
            }
            OutputMode::Json => JsonOutput::print_libraries(&result).into_diagnostic(),
        };
    }

    let request = AnalysisRequest {
        libraries: config.libraries.clone(),
        gene_case: if cli.preserve_case {
            GeneCase::Preserve
        } else {
            GeneCase::Upper
        },
        validate_libraries: !cli.no_validate,
        ..AnalysisRequest::new(cli.input, cli.output)
    };

    if !cli.graficar && config.top != DEFAULT_TOP_RESULTS {
        tracing::warn!(top = config.top, "top from config is ignored without --graficar");
    }

    let mut result = app.run(&request, sink)?;

    // the run already charted the default top rows; only redraw for a different count
    if cli.graficar && config.top != DEFAULT_TOP_RESULTS {
        if let Some(path) = app.plot(&result.table, &request.output_dir, config.top, sink)? {
            result.plot_path = Some(path.to_string());
        }
    }

    match output_mode {
        OutputMode::Console => {
            ConsoleOutput::print_summary(&result);
            Ok(())
        }
        OutputMode::Json => JsonOutput::print_analysis(&result).into_diagnostic(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_requires_graficar() {
        assert!(Cli::try_parse_from(["kira-ora", "--top", "5"]).is_err());

        let cli = Cli::try_parse_from(["kira-ora", "--plot", "--top", "5"]).unwrap();
        assert!(cli.graficar);
        assert_eq!(cli.top, Some(5));
    }

    #[test]
    fn top_is_bounded() {
        assert!(Cli::try_parse_from(["kira-ora", "--graficar", "--top", "0"]).is_err());
        assert!(Cli::try_parse_from(["kira-ora", "--graficar", "--top", "101"]).is_err());
        assert!(Cli::try_parse_from(["kira-ora", "--graficar", "--top", "100"]).is_ok());
    }
}
