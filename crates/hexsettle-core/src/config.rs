//! Game configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Points needed to win the standard game
pub const VICTORY_POINTS_TO_WIN: u32 = 10;

/// Minimum length for Longest Road
pub const MIN_LONGEST_ROAD: u32 = 5;

/// Hands larger than this lose half their cards on a 7
pub const DISCARD_THRESHOLD: u32 = 7;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 6;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("At least 2 players are required, got min_players = {0}")]
    TooFewPlayers(usize),

    #[error("At most 6 players are supported, got max_players = {0}")]
    TooManyPlayers(usize),

    #[error("min_players ({min}) exceeds max_players ({max})")]
    PlayerRange { min: usize, max: usize },

    #[error("victory_points_to_win must be positive")]
    ZeroVictoryPoints,

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// RNG seed for board generation and dice; None seeds from entropy
    pub seed: Option<u64>,
    pub victory_points_to_win: u32,
    pub min_players: usize,
    pub max_players: usize,
    pub longest_road_minimum: u32,
    pub discard_threshold: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            seed: None,
            victory_points_to_win: VICTORY_POINTS_TO_WIN,
            min_players: MIN_PLAYERS,
            max_players: MAX_PLAYERS,
            longest_road_minimum: MIN_LONGEST_ROAD,
            discard_threshold: DISCARD_THRESHOLD,
        }
    }
}

impl GameConfig {
    /// Default rules with a fixed seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_players < MIN_PLAYERS {
            return Err(ConfigError::TooFewPlayers(self.min_players));
        }
        if self.max_players > MAX_PLAYERS {
            return Err(ConfigError::TooManyPlayers(self.max_players));
        }
        if self.min_players > self.max_players {
            return Err(ConfigError::PlayerRange {
                min: self.min_players,
                max: self.max_players,
            });
        }
        if self.victory_points_to_win == 0 {
            return Err(ConfigError::ZeroVictoryPoints);
        }
        Ok(())
    }

    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config_is_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.victory_points_to_win, 10);
        assert_eq!(config.longest_road_minimum, 5);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = GameConfig::from_json(r#"{"seed": 7, "max_players": 4}"#).unwrap();
        assert_eq!(
            config,
            GameConfig {
                seed: Some(7),
                max_players: 4,
                ..GameConfig::default()
            }
        );
    }

    #[test]
    fn test_invalid_configs_rejected() {
        assert!(matches!(
            GameConfig::from_json(r#"{"min_players": 1}"#),
            Err(ConfigError::TooFewPlayers(1))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"max_players": 8}"#),
            Err(ConfigError::TooManyPlayers(8))
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"min_players": 5, "max_players": 3}"#),
            Err(ConfigError::PlayerRange { min: 5, max: 3 })
        ));
        assert!(matches!(
            GameConfig::from_json(r#"{"victory_points_to_win": 0}"#),
            Err(ConfigError::ZeroVictoryPoints)
        ));
        assert!(matches!(GameConfig::from_json("{"), Err(ConfigError::Json(_))));
    }
}
