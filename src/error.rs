//! Error types for observer statistics.

/// Error returned when observer inputs cannot produce a meaningful statistic.
///
/// Dimension and degenerate-input errors indicate a bug in the data pipeline
/// that feeds patches and labels into the observer, so they are returned to the
/// caller immediately instead of being papered over with a sentinel value.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Two inputs that must agree in length or width do not.
    ///
    /// Raised for feature-length mismatches between patch sets and a channel
    /// basis, channel-count mismatches between projections and a template, and
    /// length mismatches between decision values and labels.
    DimensionMismatch {
        /// What was being compared (e.g. "patch length").
        context: &'static str,
        /// Size required by the other operand.
        expected: usize,
        /// Size actually supplied.
        actual: usize,
    },

    /// The input cannot define the statistic at all.
    ///
    /// The canonical case is a single-class label set, for which the AUC is
    /// undefined. Empty inputs are reported the same way.
    DegenerateInput(&'static str),

    /// A decision value or patch entry was NaN or infinite.
    NonFinite(&'static str),

    /// A tuning parameter is outside its valid range.
    InvalidParameter(String),
}

impl Error {
    pub(crate) fn dimension(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DimensionMismatch {
                context,
                expected,
                actual,
            } => write!(
                f,
                "dimension mismatch in {}: expected {}, got {}",
                context, expected, actual
            ),
            Self::DegenerateInput(msg) => write!(f, "degenerate input: {}", msg),
            Self::NonFinite(what) => write!(f, "non-finite value in {}", what),
            Self::InvalidParameter(msg) => write!(f, "invalid parameter: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
