use serde::Deserialize;
use thiserror::Error;

/// The molar gas constant in cal/(K·mol), matching the parameter table's
/// calorie base scale.
pub const GAS_CONSTANT: f64 = 1.98717;

/// 0 °C in Kelvin.
pub const K0: f64 = 273.15;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParamError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),

    #[error("Failed to parse model parameters: {0}")]
    Parse(String),
}

/// Settings of the folding energy model that the soft-constraint subsystem
/// consumes.
///
/// `window_size` and `min_loop_size` steer the windowed storage variant only;
/// dense folding ignores them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ModelParams {
    /// Folding temperature in °C.
    pub temperature: f64,
    /// Maximum span of the sliding window, in nucleotides.
    pub window_size: usize,
    /// Minimum number of unpaired nucleotides enclosed by a base pair.
    pub min_loop_size: usize,
}

impl Default for ModelParams {
    fn default() -> Self {
        Self {
            temperature: 37.0,
            window_size: 70,
            min_loop_size: 3,
        }
    }
}

impl ModelParams {
    pub fn from_toml_str(s: &str) -> Result<Self, ParamError> {
        toml::from_str(s).map_err(|e| ParamError::Parse(e.to_string()))
    }
}

/// Parameters of the partition-function (Boltzmann) domain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PfParams {
    /// Folding temperature in °C.
    pub temperature: f64,
    /// Thermal energy kT in cal/mol.
    pub kt: f64,
}

#[derive(Debug, Default)]
pub struct PfParamsBuilder {
    temperature: Option<f64>,
    kt: Option<f64>,
}

impl PfParamsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn temperature(mut self, celsius: f64) -> Self {
        self.temperature = Some(celsius);
        self
    }

    /// Overrides the thermal energy; by default it is derived from the
    /// temperature as `(T + K0) · R`.
    pub fn kt(mut self, kt: f64) -> Self {
        self.kt = Some(kt);
        self
    }

    pub fn build(self) -> Result<PfParams, ParamError> {
        let temperature = self
            .temperature
            .ok_or(ParamError::MissingParameter("temperature"))?;
        let kt = self
            .kt
            .unwrap_or_else(|| (temperature + K0) * GAS_CONSTANT);
        Ok(PfParams { temperature, kt })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_requires_temperature() {
        let err = PfParamsBuilder::new().build().unwrap_err();
        assert_eq!(err, ParamError::MissingParameter("temperature"));
    }

    #[test]
    fn builder_derives_kt_from_temperature() {
        let params = PfParamsBuilder::new().temperature(37.0).build().unwrap();
        let expected = (37.0 + K0) * GAS_CONSTANT;
        assert!((params.kt - expected).abs() < 1e-9);
    }

    #[test]
    fn builder_accepts_explicit_kt() {
        let params = PfParamsBuilder::new()
            .temperature(37.0)
            .kt(600.0)
            .build()
            .unwrap();
        assert_eq!(params.kt, 600.0);
    }

    #[test]
    fn model_params_default_matches_conventions() {
        let params = ModelParams::default();
        assert_eq!(params.temperature, 37.0);
        assert_eq!(params.window_size, 70);
        assert_eq!(params.min_loop_size, 3);
    }

    #[test]
    fn model_params_parse_from_toml() {
        let params = ModelParams::from_toml_str(
            r#"
            temperature = 25.0
            window_size = 150
            min_loop_size = 2
            "#,
        )
        .unwrap();
        assert_eq!(params.temperature, 25.0);
        assert_eq!(params.window_size, 150);
        assert_eq!(params.min_loop_size, 2);
    }

    #[test]
    fn model_params_rejects_unknown_fields() {
        let result = ModelParams::from_toml_str("span = 70\n");
        assert!(matches!(result, Err(ParamError::Parse(_))));
    }
}
