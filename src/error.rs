//! Typed failure taxonomy for the viewer.
//!
//! Builder-level problems (empty datasets and the like) are recovered locally
//! with a log line; everything in this enum is structural and propagates to
//! the bootstrap, which turns it into a single user-visible error state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    /// Missing container/window or an unusable configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// No rendering capability, or GPU context acquisition failed.
    #[error("rendering unavailable: {0}")]
    Render(String),

    /// Network failure or non-2xx status while fetching the dataset.
    #[error("failed to load data: {0}")]
    DataLoad(String),

    /// The endpoint answered, but the envelope or payload is unusable.
    #[error("malformed data: {0}")]
    DataFormat(String),
}

impl ViewerError {
    /// Whether the failure is rendering-related, so the error surface can
    /// offer capability-specific remediation guidance.
    pub fn is_render_related(&self) -> bool {
        matches!(self, ViewerError::Render(_))
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_errors_are_classified_for_remediation() {
        assert!(ViewerError::Render("no adapter".into()).is_render_related());
        assert!(!ViewerError::Config("no window".into()).is_render_related());
        assert!(!ViewerError::DataLoad("status 500".into()).is_render_related());
        assert!(!ViewerError::DataFormat("not an array".into()).is_render_related());
    }

    #[test]
    fn messages_carry_the_cause() {
        let err = ViewerError::DataLoad("status 404 Not Found".into());
        assert_eq!(err.to_string(), "failed to load data: status 404 Not Found");
    }
}
