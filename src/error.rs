use indicatif::style::TemplateError;
use thiserror::Error;

pub type PlotResult<T> = Result<T, PlotError>;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Env(#[from] EnvError),

    #[error(transparent)]
    Io(#[from] IoError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors raised by a policy while it is queried for quotes.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Invalid input to policy: {0}")]
    InvalidInput(String),

    #[error("Policy returned a malformed action: {0}")]
    MalformedAction(String),

    #[error("Policy execution failure: {0}")]
    Execution(String),
}

/// Errors related to trajectory arrays and tabular summaries.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Shape mismatch in {array}: expected {expected}, got {actual:?}")]
    Shape {
        array: &'static str,
        expected: String,
        actual: Vec<usize>,
    },

    #[error("Data frame error: {0}")]
    DataFrame(String),

    #[error("Missing column in results table: {0}")]
    MissingColumn(String),
}

/// Errors related to the environment attributes used for axis derivation.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Environment has no parallel rollouts")]
    NoRollouts,

    #[error("Environment has zero steps")]
    NoSteps,

    #[error("Invalid terminal time: {0}")]
    InvalidTerminalTime(f64),

    #[error("Trajectory generation failed: {0}")]
    Generation(String),

    #[error("Progress bar error")]
    ProgressBar(#[from] TemplateError),
}

/// Errors related to file I/O and serialization of figures and tables.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("IO operation failed")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("File system error: {0}")]
    FileSystem(String),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),
}

/// Errors raised by the drawing backend.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Drawing backend failure: {0}")]
    Backend(String),

    #[error("Figure has no panels")]
    EmptyFigure,

    #[error("Panel index {index} out of bounds for a {rows}x{cols} grid")]
    PanelOutOfBounds {
        index: usize,
        rows: usize,
        cols: usize,
    },
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for RenderError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        RenderError::Backend(e.to_string())
    }
}

impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for PlotError
where
    E: std::error::Error + Send + Sync,
{
    fn from(e: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        PlotError::Render(e.into())
    }
}

impl From<polars::error::PolarsError> for PlotError {
    fn from(e: polars::error::PolarsError) -> Self {
        PlotError::Data(DataError::DataFrame(e.to_string()))
    }
}
