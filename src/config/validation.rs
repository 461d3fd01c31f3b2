//! Configuration validation.
//!
//! # Responsibilities
//! - Coerce raw variable strings into typed values
//! - Validate value ranges (ports, thresholds, positive counts)
//! - Check cross-field constraints (backoff cap >= base)
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - One validator per field, each returning `Result<T, FieldError>`
//! - File-system checks are not done here; see [`crate::config::loader`]

use std::fmt;
use std::path::PathBuf;

use crate::config::env::EnvVars;
use crate::config::schema::*;

/// A single field that failed coercion or a range check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Environment variable name.
    pub field: &'static str,
    /// The offending raw value.
    pub value: String,
    /// The violated constraint.
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}: {}", self.field, self.value, self.reason)
    }
}

impl std::error::Error for FieldError {}

/// Build a snapshot from collected variables, reporting every bad field.
///
/// The credential path is coerced but not checked for existence.
pub fn validate_vars(vars: &EnvVars) -> Result<AcdcnConfig, Vec<FieldError>> {
    let mut errors = Vec::new();
    let defaults = AcdcnConfig::default();

    let config = AcdcnConfig {
        credential_path: take(&mut errors, credential_path(vars), defaults.credential_path),
        database_name: take(
            &mut errors,
            non_empty(vars, DATABASE_NAME_VAR, DEFAULT_DATABASE_NAME),
            defaults.database_name,
        ),
        synergy_threshold: take(&mut errors, synergy_threshold(vars), defaults.synergy_threshold),
        max_domain_connections: take(
            &mut errors,
            positive_u32(vars, MAX_DOMAIN_CONNECTIONS_VAR, DEFAULT_MAX_DOMAIN_CONNECTIONS),
            defaults.max_domain_connections,
        ),
        api_host: take(
            &mut errors,
            non_empty(vars, API_HOST_VAR, DEFAULT_API_HOST),
            defaults.api_host,
        ),
        api_port: take(&mut errors, api_port(vars), defaults.api_port),
        batch_size: take(&mut errors, batch_size(vars), defaults.batch_size),
        max_retry_attempts: take(
            &mut errors,
            positive_u32(vars, MAX_RETRY_ATTEMPTS_VAR, DEFAULT_MAX_RETRY_ATTEMPTS),
            defaults.max_retry_attempts,
        ),
        retry_base_delay_ms: take(
            &mut errors,
            non_negative_u64(vars, RETRY_BASE_DELAY_MS_VAR, DEFAULT_RETRY_BASE_DELAY_MS),
            defaults.retry_base_delay_ms,
        ),
        retry_max_delay_ms: take(
            &mut errors,
            non_negative_u64(vars, RETRY_MAX_DELAY_MS_VAR, DEFAULT_RETRY_MAX_DELAY_MS),
            defaults.retry_max_delay_ms,
        ),
        connect_timeout_secs: take(
            &mut errors,
            positive_u64(vars, CONNECT_TIMEOUT_SECS_VAR, DEFAULT_CONNECT_TIMEOUT_SECS),
            defaults.connect_timeout_secs,
        ),
        operation_timeout_secs: take(
            &mut errors,
            positive_u64(vars, OPERATION_TIMEOUT_SECS_VAR, DEFAULT_OPERATION_TIMEOUT_SECS),
            defaults.operation_timeout_secs,
        ),
    };

    // Cross-field: only meaningful when both delays parsed.
    let delays_parsed = !errors
        .iter()
        .any(|e| e.field == RETRY_BASE_DELAY_MS_VAR || e.field == RETRY_MAX_DELAY_MS_VAR);
    if delays_parsed && config.retry_max_delay_ms < config.retry_base_delay_ms {
        errors.push(FieldError::new(
            RETRY_MAX_DELAY_MS_VAR,
            config.retry_max_delay_ms.to_string(),
            format!(
                "must be at least {} ({})",
                RETRY_BASE_DELAY_MS_VAR, config.retry_base_delay_ms
            ),
        ));
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

/// Record a failed field and substitute a placeholder. The placeholder never
/// escapes because any recorded error fails the whole snapshot.
fn take<T>(errors: &mut Vec<FieldError>, result: Result<T, FieldError>, placeholder: T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            errors.push(e);
            placeholder
        }
    }
}

fn raw<'a>(vars: &'a EnvVars, name: &str) -> Option<&'a str> {
    vars.get(name).map(str::trim)
}

pub fn credential_path(vars: &EnvVars) -> Result<PathBuf, FieldError> {
    non_empty(vars, CREDENTIAL_PATH_VAR, DEFAULT_CREDENTIAL_PATH).map(PathBuf::from)
}

pub fn synergy_threshold(vars: &EnvVars) -> Result<f64, FieldError> {
    let value = match raw(vars, SYNERGY_THRESHOLD_VAR) {
        None => return Ok(DEFAULT_SYNERGY_THRESHOLD),
        Some(v) => v,
    };
    let parsed: f64 = value
        .parse()
        .map_err(|_| FieldError::new(SYNERGY_THRESHOLD_VAR, value, "expected a number"))?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(FieldError::new(
            SYNERGY_THRESHOLD_VAR,
            value,
            "must be between 0.0 and 1.0 inclusive",
        ));
    }
    Ok(parsed)
}

pub fn api_port(vars: &EnvVars) -> Result<u16, FieldError> {
    let value = match raw(vars, API_PORT_VAR) {
        None => return Ok(DEFAULT_API_PORT),
        Some(v) => v,
    };
    let parsed = parse_int(API_PORT_VAR, value)?;
    if parsed <= 1024 {
        return Err(FieldError::new(API_PORT_VAR, value, "must be greater than 1024"));
    }
    u16::try_from(parsed).map_err(|_| FieldError::new(API_PORT_VAR, value, "must be less than 65536"))
}

pub fn batch_size(vars: &EnvVars) -> Result<usize, FieldError> {
    let value = match raw(vars, BATCH_SIZE_VAR) {
        None => return Ok(DEFAULT_BATCH_SIZE),
        Some(v) => v,
    };
    let parsed = parse_int(BATCH_SIZE_VAR, value)?;
    if parsed <= 0 {
        return Err(FieldError::new(BATCH_SIZE_VAR, value, "must be greater than 0"));
    }
    usize::try_from(parsed).map_err(|_| FieldError::new(BATCH_SIZE_VAR, value, "out of range"))
}

fn positive_u32(vars: &EnvVars, name: &'static str, default: u32) -> Result<u32, FieldError> {
    let value = match raw(vars, name) {
        None => return Ok(default),
        Some(v) => v,
    };
    let parsed = parse_int(name, value)?;
    if parsed <= 0 {
        return Err(FieldError::new(name, value, "must be greater than 0"));
    }
    u32::try_from(parsed).map_err(|_| FieldError::new(name, value, "out of range"))
}

fn positive_u64(vars: &EnvVars, name: &'static str, default: u64) -> Result<u64, FieldError> {
    let parsed = non_negative_u64(vars, name, default)?;
    if parsed == 0 {
        let value = raw(vars, name).unwrap_or_default();
        return Err(FieldError::new(name, value, "must be greater than 0"));
    }
    Ok(parsed)
}

fn non_negative_u64(vars: &EnvVars, name: &'static str, default: u64) -> Result<u64, FieldError> {
    let value = match raw(vars, name) {
        None => return Ok(default),
        Some(v) => v,
    };
    let parsed = parse_int(name, value)?;
    u64::try_from(parsed).map_err(|_| FieldError::new(name, value, "must not be negative"))
}

fn non_empty(vars: &EnvVars, name: &'static str, default: &str) -> Result<String, FieldError> {
    match raw(vars, name) {
        None => Ok(default.to_string()),
        Some("") => Err(FieldError::new(name, "", "must not be empty")),
        Some(v) => Ok(v.to_string()),
    }
}

/// Parse as a signed integer so negative input reports a range error rather
/// than a syntax error.
fn parse_int(name: &'static str, value: &str) -> Result<i64, FieldError> {
    value
        .parse::<i64>()
        .map_err(|_| FieldError::new(name, value, "expected an integer"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::env::EnvSource;

    fn vars(pairs: &[(&str, &str)]) -> EnvVars {
        EnvSource::Fixed(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
        .collect()
        .unwrap()
    }

    fn single_error(pairs: &[(&str, &str)]) -> FieldError {
        let errors = validate_vars(&vars(pairs)).unwrap_err();
        assert_eq!(errors.len(), 1, "expected one error, got {:?}", errors);
        errors.into_iter().next().unwrap()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = validate_vars(&vars(&[])).unwrap();
        assert_eq!(config, AcdcnConfig::default());
    }

    #[test]
    fn test_values_are_coerced() {
        let config = validate_vars(&vars(&[
            ("ACDCN_FIREBASE_CREDENTIAL_PATH", " /etc/acdcn/key.json "),
            ("ACDCN_FIRESTORE_DATABASE_NAME", "acdcn-prod"),
            ("ACDCN_KG_SYNERGY_THRESHOLD", "0.5"),
            ("ACDCN_MAX_DOMAIN_CONNECTIONS", "12"),
            ("ACDCN_API_HOST", "127.0.0.1"),
            ("ACDCN_API_PORT", "9090"),
            ("ACDCN_BATCH_SIZE", "250"),
            ("ACDCN_MAX_RETRY_ATTEMPTS", "5"),
        ]))
        .unwrap();

        assert_eq!(config.credential_path, PathBuf::from("/etc/acdcn/key.json"));
        assert_eq!(config.database_name, "acdcn-prod");
        assert_eq!(config.synergy_threshold, 0.5);
        assert_eq!(config.max_domain_connections, 12);
        assert_eq!(config.api_host, "127.0.0.1");
        assert_eq!(config.api_port, 9090);
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.max_retry_attempts, 5);
    }

    #[test]
    fn test_port_bounds() {
        assert_eq!(single_error(&[("ACDCN_API_PORT", "80")]).field, API_PORT_VAR);
        assert_eq!(single_error(&[("ACDCN_API_PORT", "1024")]).field, API_PORT_VAR);
        assert_eq!(single_error(&[("ACDCN_API_PORT", "65536")]).field, API_PORT_VAR);
        assert_eq!(single_error(&[("ACDCN_API_PORT", "http")]).reason, "expected an integer");

        assert_eq!(validate_vars(&vars(&[("ACDCN_API_PORT", "1025")])).unwrap().api_port, 1025);
        assert_eq!(validate_vars(&vars(&[("ACDCN_API_PORT", "65535")])).unwrap().api_port, 65535);
    }

    #[test]
    fn test_threshold_bounds() {
        for bad in ["-0.01", "1.01", "NaN", "high"] {
            let err = single_error(&[("ACDCN_KG_SYNERGY_THRESHOLD", bad)]);
            assert_eq!(err.field, SYNERGY_THRESHOLD_VAR);
            assert_eq!(err.value, bad);
        }
        for good in ["0", "1", "1.0", "0.0"] {
            assert!(validate_vars(&vars(&[("ACDCN_KG_SYNERGY_THRESHOLD", good)])).is_ok());
        }
    }

    #[test]
    fn test_positive_counts() {
        for name in [MAX_DOMAIN_CONNECTIONS_VAR, BATCH_SIZE_VAR, MAX_RETRY_ATTEMPTS_VAR] {
            for bad in ["0", "-5"] {
                let err = single_error(&[(name, bad)]);
                assert_eq!(err.field, name);
                assert_eq!(err.reason, "must be greater than 0");
            }
        }
    }

    #[test]
    fn test_all_errors_reported() {
        let errors = validate_vars(&vars(&[
            ("ACDCN_API_PORT", "80"),
            ("ACDCN_BATCH_SIZE", "0"),
            ("ACDCN_KG_SYNERGY_THRESHOLD", "2"),
        ]))
        .unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec![SYNERGY_THRESHOLD_VAR, API_PORT_VAR, BATCH_SIZE_VAR]);
    }

    #[test]
    fn test_empty_strings_rejected() {
        let err = single_error(&[("ACDCN_FIRESTORE_DATABASE_NAME", "   ")]);
        assert_eq!(err.reason, "must not be empty");
    }

    #[test]
    fn test_backoff_cap_below_base() {
        let err = single_error(&[
            ("ACDCN_RETRY_BASE_DELAY_MS", "500"),
            ("ACDCN_RETRY_MAX_DELAY_MS", "100"),
        ]);
        assert_eq!(err.field, RETRY_MAX_DELAY_MS_VAR);

        let config = validate_vars(&vars(&[
            ("ACDCN_RETRY_BASE_DELAY_MS", "0"),
            ("ACDCN_RETRY_MAX_DELAY_MS", "0"),
        ]))
        .unwrap();
        assert_eq!(config.retry_base_delay_ms, 0);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let err = single_error(&[("ACDCN_CONNECT_TIMEOUT_SECS", "0")]);
        assert_eq!(err.field, CONNECT_TIMEOUT_SECS_VAR);
    }

    #[test]
    fn test_error_display_names_field_and_value() {
        let err = single_error(&[("ACDCN_API_PORT", "80")]);
        assert_eq!(err.to_string(), "ACDCN_API_PORT=\"80\": must be greater than 1024");
    }
}
