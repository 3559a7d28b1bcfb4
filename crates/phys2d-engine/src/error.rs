//! Engine error kinds.

use thiserror::Error;

/// Failure classes surfaced by the render lifecycle.
///
/// `run()` never returns these as `Err`; they are logged and reported through
/// [`RunOutcome`](crate::engine::RunOutcome).
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad constructor input.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The windowing subsystem could not start.
    #[error("windowing subsystem failed to initialize")]
    Initialization(#[source] anyhow::Error),

    /// The platform refused to produce a usable window.
    #[error("window creation failed")]
    WindowCreation(#[source] anyhow::Error),

    /// Any other failure after the window exists (callback wiring, frame loop).
    #[error("runtime failure")]
    Runtime(#[source] anyhow::Error),
}

impl EngineError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Short stable name, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            EngineError::InvalidArgument(_) => "invalid-argument",
            EngineError::Initialization(_) => "initialization",
            EngineError::WindowCreation(_) => "window-creation",
            EngineError::Runtime(_) => "runtime",
        }
    }

    /// Message plus every source, joined with ": ".
    pub fn report(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(err) = source {
            out.push_str(": ");
            out.push_str(&err.to_string());
            source = err.source();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_chain_is_preserved() {
        let err = EngineError::Initialization(anyhow::anyhow!("no display"));
        assert_eq!(err.report(), "windowing subsystem failed to initialize: no display");
    }

    #[test]
    fn report_walks_context_layers() {
        let inner = anyhow::anyhow!("driver missing").context("failed to create window");
        let err = EngineError::WindowCreation(inner);
        assert_eq!(err.report(), "window creation failed: failed to create window: driver missing");
    }

    #[test]
    fn kind_names() {
        assert_eq!(EngineError::invalid_argument("x").kind(), "invalid-argument");
        assert_eq!(EngineError::Runtime(anyhow::anyhow!("x")).kind(), "runtime");
    }
}
