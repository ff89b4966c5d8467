//! Cross-origin access for the viewer page and the presence endpoints.

use std::str::FromStr;
use std::time::Duration;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowMethods, AllowOrigin, CorsLayer};

use relay_core::config::CorsConfig;

/// CORS layer for the relay's read-only surface.
///
/// A `"*"` origin allows any origin. Entries that are not valid header
/// values or method names are skipped with a warning.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let origins = if config.allowed_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(parse_entries::<HeaderValue>("origin", &config.allowed_origins))
    };

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list(parse_entries::<Method>(
            "method",
            &config.allowed_methods,
        )))
        .max_age(Duration::from_secs(config.max_age_seconds))
}

fn parse_entries<T: FromStr>(what: &str, raw: &[String]) -> Vec<T> {
    raw.iter()
        .filter_map(|entry| match entry.trim().parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(entry = %entry, "Ignoring invalid CORS {}", what);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_methods_are_skipped() {
        let raw = vec!["GET".to_string(), " OPTIONS ".to_string(), "NOT A METHOD".to_string()];
        let methods: Vec<Method> = parse_entries("method", &raw);
        assert_eq!(methods, vec![Method::GET, Method::OPTIONS]);
    }

    #[test]
    fn test_origins_parse_as_header_values() {
        let raw = vec!["https://relay.example".to_string(), "bad\norigin".to_string()];
        let origins: Vec<HeaderValue> = parse_entries("origin", &raw);
        assert_eq!(origins, vec![HeaderValue::from_static("https://relay.example")]);
    }
}
