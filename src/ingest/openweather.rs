/// OpenWeather current-weather API client
///
/// Retrieves the current temperature for a city by name. Two transports
/// share one request shape and one response parser:
/// - `fetch_current_blocking` occupies the calling thread for the round trip
/// - `fetch_current` yields while the request is outstanding
///
/// API Documentation: https://openweathermap.org/current
///
/// The service reports its own status in the `cod` field of the JSON body
/// (a string on most failures, an integer on success), so the body is parsed
/// whatever the HTTP status was.

use serde::Deserialize;
use serde_json::Value;

use crate::config::WeatherEndpoint;
use crate::model::{WeatherError, WeatherQuote};

/// `cod` value of a successful response, compared as a string.
pub const SUCCESS_COD: &str = "200";

const USER_AGENT: &str = concat!("tempmon_service/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// API Response Structures
// ============================================================================

/// The parts of a successful current-weather body this service reads.
#[derive(Debug, Deserialize)]
pub struct OwmCurrentResponse {
    pub main: Option<OwmMain>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OwmMain {
    pub temp: Option<f64>, // °C with units=metric
    pub feels_like: Option<f64>,
    pub humidity: Option<f64>,
}

// ============================================================================
// Request construction
// ============================================================================

/// Query parameters for one current-weather request.
pub fn weather_query<'a>(
    endpoint: &'a WeatherEndpoint,
    city: &'a str,
    api_key: &'a str,
) -> [(&'static str, &'a str); 3] {
    [("q", city), ("appid", api_key), ("units", endpoint.units.as_str())]
}

pub fn build_blocking_client(
    endpoint: &WeatherEndpoint,
) -> Result<reqwest::blocking::Client, WeatherError> {
    Ok(reqwest::blocking::Client::builder()
        .timeout(endpoint.timeout())
        .user_agent(USER_AGENT)
        .build()?)
}

/// One pooled async client; clones share the connection pool.
pub fn build_async_client(endpoint: &WeatherEndpoint) -> Result<reqwest::Client, WeatherError> {
    Ok(reqwest::Client::builder()
        .timeout(endpoint.timeout())
        .user_agent(USER_AGENT)
        .build()?)
}

// ============================================================================
// API Client Functions
// ============================================================================

/// Fetch current weather for `city`, blocking the calling thread.
///
/// Must not be called from inside an async runtime.
pub fn fetch_current_blocking(
    client: &reqwest::blocking::Client,
    endpoint: &WeatherEndpoint,
    city: &str,
    api_key: &str,
) -> Result<WeatherQuote, WeatherError> {
    let response = client
        .get(&endpoint.base_url)
        .query(&weather_query(endpoint, city, api_key))
        .header("Accept", "application/json")
        .timeout(endpoint.timeout())
        .send()?;

    let body = response.text()?;
    parse_weather_response(city, &body)
}

/// Fetch current weather for `city` without blocking the runtime thread.
pub async fn fetch_current(
    client: &reqwest::Client,
    endpoint: &WeatherEndpoint,
    city: &str,
    api_key: &str,
) -> Result<WeatherQuote, WeatherError> {
    let response = client
        .get(&endpoint.base_url)
        .query(&weather_query(endpoint, city, api_key))
        .header("Accept", "application/json")
        .timeout(endpoint.timeout())
        .send()
        .await?;

    let body = response.text().await?;
    parse_weather_response(city, &body)
}

// ============================================================================
// Response parsing
// ============================================================================

/// Parse a current-weather body into a quote.
///
/// A `cod` other than "200" is an API error carrying the whole payload.
/// A body that is not JSON, or a success body without `main.temp`, is a
/// parse error.
pub fn parse_weather_response(city: &str, body: &str) -> Result<WeatherQuote, WeatherError> {
    let payload: Value = serde_json::from_str(body)
        .map_err(|e| WeatherError::Parse(format!("response is not JSON: {}", e)))?;

    let code = status_code(&payload);
    if code != SUCCESS_COD {
        return Err(WeatherError::Api { code, payload });
    }

    let parsed: OwmCurrentResponse = serde_json::from_value(payload.clone())
        .map_err(|e| WeatherError::Parse(e.to_string()))?;

    let temperature = parsed
        .main
        .and_then(|m| m.temp)
        .ok_or_else(|| WeatherError::Parse("success response has no main.temp".to_string()))?;

    Ok(WeatherQuote {
        city: city.to_string(),
        status_code: code,
        temperature,
        raw_payload: payload,
    })
}

/// `cod` as a string, whichever JSON type it arrived as. Missing → "".
fn status_code(payload: &Value) -> String {
    match payload.get("cod") {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
