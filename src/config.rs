use serde::Serialize;

use crate::error::ConfigError;
use crate::models::WindowPolicy;

pub const DEFAULT_WINDOW: usize = 7;
pub const DEFAULT_LOOKBACK: usize = 14;
pub const DEFAULT_MIN_POINTS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisConfig {
    pub window: usize,
    pub policy: WindowPolicy,
    pub lookback: usize,
    pub min_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            policy: WindowPolicy::Partial,
            lookback: DEFAULT_LOOKBACK,
            min_points: DEFAULT_MIN_POINTS,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window == 0 {
            return Err(ConfigError::Window(self.window));
        }
        if self.lookback < 2 {
            return Err(ConfigError::Lookback(self.lookback));
        }
        if self.min_points < 2 || self.min_points > self.lookback {
            return Err(ConfigError::MinPoints {
                min_points: self.min_points,
                lookback: self.lookback,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = AnalysisConfig::default();
        assert_eq!(config.window, 7);
        assert_eq!(config.lookback, 14);
        assert_eq!(config.min_points, 4);
        assert_eq!(config.policy, WindowPolicy::Partial);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_settings() {
        let zero_window = AnalysisConfig {
            window: 0,
            ..AnalysisConfig::default()
        };
        assert_eq!(zero_window.validate(), Err(ConfigError::Window(0)));

        let short_lookback = AnalysisConfig {
            lookback: 1,
            min_points: 1,
            ..AnalysisConfig::default()
        };
        assert_eq!(short_lookback.validate(), Err(ConfigError::Lookback(1)));

        let too_many_points = AnalysisConfig {
            lookback: 5,
            min_points: 6,
            ..AnalysisConfig::default()
        };
        assert_eq!(
            too_many_points.validate(),
            Err(ConfigError::MinPoints {
                min_points: 6,
                lookback: 5
            })
        );
    }

    #[test]
    fn window_error_is_phrased_in_points() {
        assert_eq!(
            ConfigError::Window(0).to_string(),
            "rolling window must be at least 1 point, got 0"
        );
    }
}
