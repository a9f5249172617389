use std::io::{self, Write};

use serde::Serialize;

use crate::app::{AnalysisResult, EventKind, LibraryListResult, ProgressEvent, ProgressSink};

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Console,
    Json,
}

/// Human-readable progress on stdout.
pub struct ConsoleOutput;

impl ConsoleOutput {
    pub fn print_summary(result: &AnalysisResult) {
        let green = "\x1b[32m";
        let yellow = "\x1b[33m";
        let cyan = "\x1b[36m";
        let reset = "\x1b[0m";

        println!("{cyan}🧬 ORA summary{reset}");
        println!("{cyan}   genes: {}{reset}", result.genes);
        println!("{cyan}   libraries: {}{reset}", result.libraries.join(", "));
        let color = if result.significant_terms > 0 { green } else { yellow };
        println!(
            "{color}   terms: {} ({} with adjusted p ≤ {}){reset}",
            result.terms, result.significant_terms, result.cutoff
        );
    }

    pub fn print_libraries(result: &LibraryListResult) {
        for library in &result.libraries {
            match library.terms {
                Some(terms) => println!("{}\t{terms}", library.name),
                None => println!("{}", library.name),
            }
        }
    }
}

impl ProgressSink for ConsoleOutput {
    fn event(&self, event: ProgressEvent) {
        let (icon, color) = match event.kind {
            EventKind::Info => ("🔍", "\x1b[36m"),
            EventKind::Success => ("✅", "\x1b[32m"),
            EventKind::Warning => ("⚠️", "\x1b[33m"),
        };
        let reset = "\x1b[0m";
        match event.elapsed {
            Some(elapsed) => println!(
                "{color}{icon} {} latency_ms={}{reset}",
                event.message,
                elapsed.as_millis()
            ),
            None => println!("{color}{icon} {}{reset}", event.message),
        }
    }
}

/// Machine-readable output: progress is dropped, results go to stdout as JSON.
pub struct JsonOutput;

impl JsonOutput {
    pub fn print_analysis(result: &AnalysisResult) -> io::Result<()> {
        Self::print_json(result)
    }

    pub fn print_libraries(result: &LibraryListResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

impl ProgressSink for JsonOutput {
    fn event(&self, _event: ProgressEvent) {}
}
