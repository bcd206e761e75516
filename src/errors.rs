//! Error types shared by the numerical core
//!

use std::fmt;

/// Failure cases of the CCF and discriminant analysis computations
///
/// Missing copy-number lookups are not represented here, the segment index always resolves those
/// to the diploid default.
///
#[derive(Clone, Debug, PartialEq)]
pub enum ClonalityError {
    /// A ratio or frequency was requested with a zero denominator
    DivisionByZero { context: String },

    /// Expected mutation copy number is only defined for a total copy number of at least one
    InvalidCopyNumber { copy_number: i32 },

    /// Tumor purity must be in (0,1]
    InvalidPurity { purity: f64 },

    /// The within-class scatter matrix could not be inverted
    SingularMatrix {
        class_sizes: [usize; 2],
        feature_names: Vec<String>,
    },

    /// Discriminant training requires observations from both classes
    MissingClass { class_sizes: [usize; 2] },

    /// A text record did not match the expected column layout
    MalformedRecord {
        label: String,
        line_number: usize,
        msg: String,
    },
}

impl ClonalityError {
    pub fn division_by_zero(context: impl Into<String>) -> Self {
        Self::DivisionByZero {
            context: context.into(),
        }
    }

    pub fn malformed(label: &str, line_number: usize, msg: impl Into<String>) -> Self {
        Self::MalformedRecord {
            label: label.to_string(),
            line_number,
            msg: msg.into(),
        }
    }
}

impl std::error::Error for ClonalityError {}

impl fmt::Display for ClonalityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DivisionByZero { context } => write!(f, "Division by zero: {context}"),
            Self::InvalidCopyNumber { copy_number } => write!(
                f,
                "Expected mutation copy number is undefined for total copy number {copy_number}"
            ),
            Self::InvalidPurity { purity } => {
                write!(f, "Tumor purity must be in (0,1], observed {purity}")
            }
            Self::SingularMatrix {
                class_sizes,
                feature_names,
            } => write!(
                f,
                "Within-class scatter matrix is singular. Class sizes: {}/{}, features: [{}]",
                class_sizes[0],
                class_sizes[1],
                feature_names.join(", ")
            ),
            Self::MissingClass { class_sizes } => write!(
                f,
                "Training data must include both classes. Class sizes: {}/{}",
                class_sizes[0], class_sizes[1]
            ),
            Self::MalformedRecord {
                label,
                line_number,
                msg,
            } => write!(f, "Malformed {label} record at line {line_number}: {msg}"),
        }
    }
}

pub type ClonalityResult<T> = Result<T, ClonalityError>;
