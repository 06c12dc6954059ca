//! Pipeline Configuration
//!
//! [`PipelineConfig`] holds every tunable of the ring effect and the capture
//! side. Every field has a default, so a JSON document only needs to name the
//! values it overrides. Environment overrides use `RING_` plus the upper-case
//! field name, for example `RING_NUM_LEDS=24`.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const ENV_PREFIX: &str = "RING_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Capture rate in Hz.
    pub sample_rate: u32,
    /// Milliseconds of capture history kept in the buffer.
    pub buffer_ms: u64,
    /// Seconds of audio analysed per tick.
    pub window_size: f64,
    pub num_leds: usize,
    /// Lowest analysed octave, as the exponent of 2 Hz.
    pub first_octave: f64,
    pub number_octaves: usize,
    /// Loudness below which the ring stays dark.
    pub volume_min_threshold: f64,
    /// Decay base per second of the loudness threshold.
    pub volume_falloff: f64,
    /// Decay base per second of the held peaks.
    pub fade_falloff: f64,
    /// Seconds for the hue to rotate once around the color wheel.
    pub color_rotation_period: f64,
    /// Smoothing width in frequency bins.
    pub blur_sigma: f64,
    /// Frames per second.
    pub tick_rate: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sample_rate: 22050,
            buffer_ms: 1000,
            window_size: 0.1,
            num_leds: 60,
            first_octave: 4.0,
            number_octaves: 8,
            volume_min_threshold: 0.001,
            volume_falloff: 32.0,
            fade_falloff: 64.0,
            color_rotation_period: 180.0,
            blur_sigma: 2.0,
            tick_rate: 60.0,
        }
    }
}

impl PipelineConfig {
    /// Parse a JSON document, filling absent fields with defaults.
    pub fn from_json(document: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `RING_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_overrides(|var| env::var(var).ok())
    }

    /// Apply overrides from `lookup`, which maps a variable name to its value.
    pub fn with_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        override_field(&lookup, "SAMPLE_RATE", &mut self.sample_rate)?;
        override_field(&lookup, "BUFFER_MS", &mut self.buffer_ms)?;
        override_field(&lookup, "WINDOW_SIZE", &mut self.window_size)?;
        override_field(&lookup, "NUM_LEDS", &mut self.num_leds)?;
        override_field(&lookup, "FIRST_OCTAVE", &mut self.first_octave)?;
        override_field(&lookup, "NUMBER_OCTAVES", &mut self.number_octaves)?;
        override_field(&lookup, "VOLUME_MIN_THRESHOLD", &mut self.volume_min_threshold)?;
        override_field(&lookup, "VOLUME_FALLOFF", &mut self.volume_falloff)?;
        override_field(&lookup, "FADE_FALLOFF", &mut self.fade_falloff)?;
        override_field(&lookup, "COLOR_ROTATION_PERIOD", &mut self.color_rotation_period)?;
        override_field(&lookup, "BLUR_SIGMA", &mut self.blur_sigma)?;
        override_field(&lookup, "TICK_RATE", &mut self.tick_rate)?;
        self.validate()?;
        Ok(self)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("sample_rate", f64::from(self.sample_rate))?;
        positive("buffer_ms", self.buffer_ms as f64)?;
        positive("window_size", self.window_size)?;
        positive("num_leds", self.num_leds as f64)?;
        positive("number_octaves", self.number_octaves as f64)?;
        positive("volume_min_threshold", self.volume_min_threshold)?;
        positive("color_rotation_period", self.color_rotation_period)?;
        positive("tick_rate", self.tick_rate)?;
        decaying("volume_falloff", self.volume_falloff)?;
        decaying("fade_falloff", self.fade_falloff)?;

        if !self.first_octave.is_finite() {
            return Err(invalid("first_octave", "must be finite"));
        }
        if !self.blur_sigma.is_finite() || self.blur_sigma < 0.0 {
            return Err(invalid("blur_sigma", "must be zero or positive"));
        }
        if self.window_samples() > self.buffer_samples() {
            return Err(invalid("window_size", "exceeds the capture history"));
        }
        Ok(())
    }

    /// Seconds between consecutive samples.
    pub fn sample_delta(&self) -> f64 {
        1.0 / f64::from(self.sample_rate)
    }

    pub fn seconds_to_samples(&self, seconds: f64) -> usize {
        (seconds * f64::from(self.sample_rate)) as usize
    }

    /// Samples analysed per tick.
    pub fn window_samples(&self) -> usize {
        self.seconds_to_samples(self.window_size)
    }

    /// Samples of capture history.
    pub fn buffer_samples(&self) -> usize {
        self.seconds_to_samples(self.buffer_ms as f64 / 1000.0)
    }
}

fn override_field<T, F>(lookup: &F, suffix: &str, field: &mut T) -> Result<(), ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    let var = format!("{ENV_PREFIX}{suffix}");
    if let Some(value) = lookup(&var) {
        *field = value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Env { var, value })?;
    }
    Ok(())
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be positive"))
    }
}

fn decaying(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 1.0 {
        Ok(())
    } else {
        Err(invalid(field, "must be greater than 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.num_leds, 60);
        assert_eq!(config.window_samples(), 2205);
        assert_eq!(config.buffer_samples(), 22050);
    }

    #[test]
    fn json_overrides_only_named_fields() {
        let config = PipelineConfig::from_json(r#"{"num_leds": 24, "blur_sigma": 0.5}"#).unwrap();
        assert_eq!(config.num_leds, 24);
        assert_eq!(config.blur_sigma, 0.5);
        assert_eq!(config.sample_rate, 22050);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = PipelineConfig::from_json("{ num_leds: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = PipelineConfig::from_json(r#"{"fade_falloff": 1.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "fade_falloff", .. }));

        let err = PipelineConfig::from_json(r#"{"num_leds": 0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "num_leds", .. }));

        let err = PipelineConfig::from_json(r#"{"window_size": 5.0}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "window_size", .. }));
    }

    #[test]
    fn environment_overrides_apply() {
        let config = PipelineConfig::default()
            .with_overrides(lookup(&[("RING_NUM_LEDS", "12"), ("RING_TICK_RATE", " 30 ")]))
            .unwrap();
        assert_eq!(config.num_leds, 12);
        assert_eq!(config.tick_rate, 30.0);
    }

    #[test]
    fn unparsable_environment_value_names_the_variable() {
        let err = PipelineConfig::default()
            .with_overrides(lookup(&[("RING_SAMPLE_RATE", "fast")]))
            .unwrap_err();
        match err {
            ConfigError::Env { var, value } => {
                assert_eq!(var, "RING_SAMPLE_RATE");
                assert_eq!(value, "fast");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
