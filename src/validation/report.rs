//! Validation report types for structured error reporting.
//!
//! Reports render as text for people and serialize as JSON for scripts.

use serde::{Serialize, Serializer};
use std::fmt;

/// The result of validating a COCO dataset.
#[derive(Clone, Debug, Default)]
pub struct ValidationReport {
    /// All issues found, in check order.
    pub issues: Vec<ValidationIssue>,

    /// Warnings fail the report too.
    pub strict: bool,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty report that fails on warnings.
    pub fn strict() -> Self {
        Self {
            issues: Vec::new(),
            strict: true,
        }
    }

    pub fn add(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Returns true if there are no issues at all.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true if the report passes: no errors, and no warnings
    /// either when the report is strict.
    pub fn passes(&self) -> bool {
        self.error_count() == 0 && (!self.strict || self.warning_count() == 0)
    }

    /// Returns true if any issue carries `code`.
    pub fn has(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }

    fn count(&self, severity: Severity) -> usize {
        self.issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .count()
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ValidationReport", 4)?;
        state.serialize_field("strict", &self.strict)?;
        state.serialize_field("error_count", &self.error_count())?;
        state.serialize_field("warning_count", &self.warning_count())?;
        state.serialize_field("issues", &self.issues)?;
        state.end()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(f, "Validation passed: no issues found");
        }

        writeln!(
            f,
            "Validation completed with {} error(s) and {} warning(s):",
            self.error_count(),
            self.warning_count()
        )?;
        writeln!(f)?;

        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }

        Ok(())
    }
}

/// A single validation issue (error or warning).
#[derive(Clone, Debug, Serialize)]
pub struct ValidationIssue {
    pub severity: Severity,

    /// A stable code for the issue type.
    pub code: IssueCode,

    pub message: String,

    /// Where the issue occurred.
    pub context: IssueContext,
}

impl ValidationIssue {
    pub fn error(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            context,
        }
    }

    pub fn warning(code: IssueCode, message: impl Into<String>, context: IssueContext) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
            context,
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "ERROR",
            Severity::Warning => "WARN ",
        };
        write!(
            f,
            "[{}] {:?} in {}: {}",
            severity, self.code, self.context, self.message
        )
    }
}

/// The severity of a validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Suspicious but representable data (e.g. a box outside the image).
    Warning,
    /// Broken cross-references or inconsistent records.
    Error,
}

/// A stable code identifying the type of validation issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum IssueCode {
    // ID issues
    DuplicateImageId,
    DuplicateAnnotationId,
    DuplicateCategoryId,
    /// Image or annotation ids do not increase in list order.
    IdsOutOfOrder,

    // Reference issues
    /// An annotation references a non-existent image.
    MissingImageRef,
    /// An annotation references a non-existent category.
    MissingCategoryRef,

    // Image and category issues
    /// An image has a zero width or height.
    InvalidImageDimensions,
    EmptyFileName,
    EmptyCategoryName,
    /// Category names must be unique for lookup by name.
    DuplicateCategoryName,

    // Bounding box issues
    /// A bounding box has a negative width or height.
    NegativeBBoxDimensions,
    /// `area` is not `bbox[2] * bbox[3]`.
    AreaMismatch,
    /// A bounding box extends outside the image bounds.
    BBoxOutOfBounds,
    /// An annotation is marked `iscrowd`, which the converter never writes.
    CrowdAnnotation,
}

/// Context about where a validation issue occurred.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueContext {
    Image { id: u64 },
    Annotation { id: u64 },
    Category { id: u64 },
}

impl fmt::Display for IssueContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueContext::Image { id } => write!(f, "image {}", id),
            IssueContext::Annotation { id } => write!(f, "annotation {}", id),
            IssueContext::Category { id } => write!(f, "category {}", id),
        }
    }
}
