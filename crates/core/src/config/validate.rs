use super::{types::Config, ConfigError};
use crate::search::Score;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - At least one subtitle extension is accepted
/// - Scoring weights are finite, non-negative and keep the identity bonus
///   above every other bonus combined
/// - Fingerprint buffer size is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Search validation
    if config.search.extensions.iter().all(|e| e.trim().is_empty()) {
        return Err(ConfigError::ValidationError(
            "search.extensions must contain at least one extension".to_string(),
        ));
    }

    // Scoring validation
    let scoring = &config.scoring;
    let weights = [
        ("identity_bonus", scoring.identity_bonus),
        ("tag_weight", scoring.tag_weight),
        ("fps_bonus", scoring.fps_bonus),
        ("trusted_bonus", scoring.trusted_bonus),
        ("member_bonus", scoring.member_bonus),
    ];
    for (name, value) in weights {
        if !value.is_finite() || value < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "scoring.{} must be a non-negative number",
                name
            )));
        }
    }

    if scoring.min_tag_tokens == 0 {
        return Err(ConfigError::ValidationError(
            "scoring.min_tag_tokens cannot be 0".to_string(),
        ));
    }

    if scoring.member_bonus > scoring.trusted_bonus {
        return Err(ConfigError::ValidationError(
            "scoring.member_bonus cannot exceed scoring.trusted_bonus".to_string(),
        ));
    }

    // Compare in the scorer's fixed-point units. A full tag match earns whole
    // points only, so the tag weight is floored.
    let identity = Score::from_points(scoring.identity_bonus).tenths();
    let best_tag = Score::from_points(scoring.tag_weight).tenths() / 10 * 10;
    let others = best_tag
        + Score::from_points(scoring.fps_bonus).tenths()
        + Score::from_points(scoring.trusted_bonus).tenths();
    if identity <= others {
        return Err(ConfigError::ValidationError(format!(
            "scoring.identity_bonus ({}) must exceed tag_weight + fps_bonus + trusted_bonus ({})",
            Score::from_tenths(identity),
            Score::from_tenths(others)
        )));
    }

    // Fingerprint validation
    if config.fingerprint.buffer_size == 0 {
        return Err(ConfigError::ValidationError(
            "fingerprint.buffer_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ScoringConfig, ServerConfig};
    use std::net::IpAddr;

    fn assert_invalid(config: &Config, needle: &str) {
        match validate_config(config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains(needle), "unexpected message: {}", msg)
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let config = Config {
            server: ServerConfig {
                host: "0.0.0.0".parse::<IpAddr>().unwrap(),
                port: 0,
            },
            ..Default::default()
        };
        assert_invalid(&config, "server.port");
    }

    #[test]
    fn test_validate_empty_extensions_fails() {
        let mut config = Config::default();
        config.search.extensions = vec![];
        assert_invalid(&config, "search.extensions");

        config.search.extensions = vec!["  ".to_string()];
        assert_invalid(&config, "search.extensions");
    }

    #[test]
    fn test_validate_min_tag_tokens_zero_fails() {
        let mut config = Config::default();
        config.scoring.min_tag_tokens = 0;
        assert_invalid(&config, "min_tag_tokens");
    }

    #[test]
    fn test_validate_member_above_trusted_fails() {
        let mut config = Config::default();
        config.scoring.member_bonus = 0.8;
        assert_invalid(&config, "member_bonus");
    }

    #[test]
    fn test_validate_identity_must_dominate() {
        let config = Config {
            scoring: ScoringConfig {
                identity_bonus: 8.0,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_invalid(&config, "identity_bonus");
    }

    #[test]
    fn test_validate_identity_must_dominate_after_rounding() {
        // 8.56 > 7 + 1 + 0.55, but both sides round to 8.6.
        let mut config = Config::default();
        config.scoring.identity_bonus = 8.56;
        config.scoring.trusted_bonus = 0.55;
        assert_invalid(&config, "identity_bonus");

        config.scoring.identity_bonus = 8.7;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_fractional_tag_weight_is_floored() {
        // A full tag match on 7.9 earns 7 points, so 8.6 still dominates.
        let mut config = Config::default();
        config.scoring.tag_weight = 7.9;
        config.scoring.identity_bonus = 8.6;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_negative_weight_fails() {
        let mut config = Config::default();
        config.scoring.fps_bonus = -1.0;
        assert_invalid(&config, "fps_bonus");

        config.scoring.fps_bonus = f64::NAN;
        assert_invalid(&config, "fps_bonus");
    }

    #[test]
    fn test_validate_zero_buffer_fails() {
        let mut config = Config::default();
        config.fingerprint.buffer_size = 0;
        assert_invalid(&config, "buffer_size");
    }
}
