use crate::coords::ColorRgba;
use crate::error::EngineError;

/// Window/render-loop configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub title: String,
    /// Requested window size. Non-positive values are passed through for the
    /// platform to reject.
    pub width: i32,
    pub height: i32,
    pub resizable: bool,
    /// Display refreshes per present; 0 disables vsync.
    pub swap_interval: u32,
    /// Background color written to the back buffer every frame.
    pub clear_color: ColorRgba,
}

impl EngineConfig {
    pub fn new(width: i32, height: i32, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Rejects an absent (empty or blank) title. Sizes are not checked here.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.title.trim().is_empty() {
            return Err(EngineError::invalid_argument("window title must not be empty"));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            title: "phys2d".to_string(),
            width: 800,
            height: 600,
            resizable: true,
            swap_interval: 1,
            clear_color: ColorRgba::red(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_title_is_invalid() {
        let err = EngineConfig::new(10, 10, "  ").validate().unwrap_err();
        assert!(matches!(err, EngineError::InvalidArgument(_)));
    }

    #[test]
    fn non_positive_size_is_deferred() {
        assert!(EngineConfig::new(0, -5, "t").validate().is_ok());
    }

    #[test]
    fn defaults_enable_vsync() {
        let c = EngineConfig::default();
        assert_eq!(c.swap_interval, 1);
        assert!(c.resizable);
    }
}
