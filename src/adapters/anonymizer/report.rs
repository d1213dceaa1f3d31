//! Completion report of the batch anonymizer

use serde::Serialize;

const ELAPSED_PREFIX: &str = "Elapsed time:";
const PROCESSED_MARKER: &str = "Anonymized file";

/// Signals scraped from the anonymizer's standard output
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AnonymizeSummary {
    /// Elapsed seconds reported by the engine, 0 if it reported none
    pub elapsed_secs: f64,

    /// Lines announcing an anonymized file
    pub processed_files: usize,
}

/// Parses the anonymizer's standard output
///
/// Lines starting with `Elapsed time:` carry the elapsed seconds (the last
/// one wins); every line containing `Anonymized file` counts one processed
/// file. Everything else is informational.
pub fn parse_output(stdout: &str) -> AnonymizeSummary {
    let mut summary = AnonymizeSummary::default();

    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix(ELAPSED_PREFIX) {
            match rest.split_whitespace().next().map(str::parse::<f64>) {
                Some(Ok(secs)) => summary.elapsed_secs = secs,
                _ => tracing::debug!(line, "Unparseable elapsed time line"),
            }
        } else if line.contains(PROCESSED_MARKER) {
            summary.processed_files += 1;
        }
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_typical_output() {
        let stdout = "\
DicomAnonymizerTool starting
Anonymized file 1 of 3: /in/a.dcm
Anonymized file 2 of 3: /in/b.dcm
Skipped /in/readme.txt
Anonymized file 3 of 3: /in/c.dcm
Elapsed time: 4.25
";
        let summary = parse_output(stdout);
        assert_eq!(summary.processed_files, 3);
        assert!((summary.elapsed_secs - 4.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_empty_output() {
        assert_eq!(parse_output(""), AnonymizeSummary::default());
    }

    #[test]
    fn test_bad_elapsed_line_is_ignored() {
        let summary = parse_output("Elapsed time: soon\nElapsed time:\n");
        assert_eq!(summary.elapsed_secs, 0.0);
        assert_eq!(summary.processed_files, 0);
    }

    #[test]
    fn test_elapsed_with_unit_suffix() {
        let summary = parse_output("Elapsed time: 12 seconds");
        assert_eq!(summary.elapsed_secs, 12.0);
    }
}
