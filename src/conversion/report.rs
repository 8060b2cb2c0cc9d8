//! Conversion report types for tracking skipped inputs and policy decisions.
//!
//! The written COCO file carries no trace of what was skipped; this report
//! is where that information goes, similar to how
//! `validation::ValidationReport` tracks dataset issues.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Example messages shown per issue code in the text rendering.
const MAX_EXAMPLES_PER_CODE: usize = 5;

/// A report generated during one conversion run.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ConversionReport {
    /// Counts of what was read and written.
    pub counts: ConversionCounts,
    /// Skips and policy decisions, in the order they happened.
    pub issues: Vec<ConversionIssue>,
}

impl ConversionReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an issue to the report.
    pub fn add(&mut self, issue: ConversionIssue) {
        self.issues.push(issue);
    }

    /// Count of warning-level issues.
    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Warning)
            .count()
    }

    /// Count of info-level issues.
    pub fn info_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == ConversionSeverity::Info)
            .count()
    }

    /// Number of issues carrying `code`.
    pub fn count(&self, code: ConversionIssueCode) -> usize {
        self.issues.iter().filter(|i| i.code == code).count()
    }
}

impl fmt::Display for ConversionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "  read {} annotation file(s), {} object(s)",
            self.counts.annotation_files, self.counts.objects
        )?;
        writeln!(
            f,
            "  wrote {} images, {} categories, {} annotations",
            self.counts.images, self.counts.categories, self.counts.annotations
        )?;

        for (title, severity) in [
            ("Warnings", ConversionSeverity::Warning),
            ("Skipped", ConversionSeverity::Info),
        ] {
            let mut by_code: BTreeMap<ConversionIssueCode, Vec<&str>> = BTreeMap::new();
            for issue in self.issues.iter().filter(|i| i.severity == severity) {
                by_code.entry(issue.code).or_default().push(&issue.message);
            }
            if by_code.is_empty() {
                continue;
            }

            let total: usize = by_code.values().map(Vec::len).sum();
            writeln!(f)?;
            writeln!(f, "{} ({}):", title, total)?;
            for (code, messages) in by_code {
                writeln!(f, "  {} x{}", code.as_str(), messages.len())?;
                for message in messages.iter().take(MAX_EXAMPLES_PER_CODE) {
                    writeln!(f, "    - {}", message)?;
                }
                if messages.len() > MAX_EXAMPLES_PER_CODE {
                    writeln!(
                        f,
                        "    ... and {} more",
                        messages.len() - MAX_EXAMPLES_PER_CODE
                    )?;
                }
            }
        }

        Ok(())
    }
}

/// Counts of inputs read and records written.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ConversionCounts {
    /// Top-level annotation files listed.
    pub annotation_files: usize,
    /// `<object>` elements seen in converted files.
    pub objects: usize,
    pub images: usize,
    pub categories: usize,
    pub annotations: usize,
}

/// A single skip or policy note.
#[derive(Clone, Debug, Serialize)]
pub struct ConversionIssue {
    pub severity: ConversionSeverity,
    pub code: ConversionIssueCode,
    pub message: String,
}

impl ConversionIssue {
    /// Create a warning-level issue (suspicious input data).
    pub fn warning(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Warning,
            code,
            message: message.into(),
        }
    }

    /// Create an info-level issue (expected skip).
    pub fn info(code: ConversionIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: ConversionSeverity::Info,
            code,
            message: message.into(),
        }
    }
}

/// Severity level for conversion issues.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSeverity {
    /// The input looks wrong and was skipped or altered.
    Warning,
    /// An expected skip (missing image, label outside the vocabulary).
    Info,
}

/// Stable issue codes for programmatic consumption.
///
/// These codes are part of the JSON report schema and should remain stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionIssueCode {
    /// Annotation file skipped: referenced image is not in the image directory.
    MissingImage,
    /// Object skipped: label is not in the category vocabulary.
    UnknownLabel,
    /// Annotation file skipped: image could not be read or decoded.
    ImageUnreadable,
    /// Object skipped: box has max < min on an axis.
    DegenerateBoxRejected,
    /// Box had max < min on an axis; negative dimensions were set to 0.
    DegenerateBoxClamped,
    /// Box had max < min on an axis and was written unchanged.
    DegenerateBoxKept,
    /// `.xml` files in subdirectories of the annotation directory were ignored.
    NestedXmlIgnored,
}

impl ConversionIssueCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversionIssueCode::MissingImage => "missing_image",
            ConversionIssueCode::UnknownLabel => "unknown_label",
            ConversionIssueCode::ImageUnreadable => "image_unreadable",
            ConversionIssueCode::DegenerateBoxRejected => "degenerate_box_rejected",
            ConversionIssueCode::DegenerateBoxClamped => "degenerate_box_clamped",
            ConversionIssueCode::DegenerateBoxKept => "degenerate_box_kept",
            ConversionIssueCode::NestedXmlIgnored => "nested_xml_ignored",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_report_has_no_issues() {
        let report = ConversionReport::new();
        assert_eq!(report.warning_count(), 0);
        assert_eq!(report.info_count(), 0);
        assert!(!report.to_string().contains("Warnings"));
    }

    #[test]
    fn counts_by_severity_and_code() {
        let mut report = ConversionReport::new();
        report.add(ConversionIssue::info(
            ConversionIssueCode::UnknownLabel,
            "a.xml: label 'x'",
        ));
        report.add(ConversionIssue::info(
            ConversionIssueCode::UnknownLabel,
            "b.xml: label 'y'",
        ));
        report.add(ConversionIssue::warning(
            ConversionIssueCode::DegenerateBoxRejected,
            "c.xml: box",
        ));

        assert_eq!(report.info_count(), 2);
        assert_eq!(report.warning_count(), 1);
        assert_eq!(report.count(ConversionIssueCode::UnknownLabel), 2);
        assert_eq!(report.count(ConversionIssueCode::MissingImage), 0);
    }

    #[test]
    fn display_truncates_long_issue_lists() {
        let mut report = ConversionReport::new();
        for idx in 0..8 {
            report.add(ConversionIssue::info(
                ConversionIssueCode::MissingImage,
                format!("{idx}.xml"),
            ));
        }

        let text = report.to_string();
        assert!(text.contains("Skipped (8):"));
        assert!(text.contains("missing_image x8"));
        assert!(text.contains("... and 3 more"));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = ConversionReport::new();
        report.counts.images = 2;
        report.add(ConversionIssue::warning(
            ConversionIssueCode::ImageUnreadable,
            "bad.jpg could not be decoded",
        ));

        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"images\":2"));
        assert!(json.contains("\"severity\":\"warning\""));
        assert!(json.contains("\"code\":\"image_unreadable\""));
    }
}
