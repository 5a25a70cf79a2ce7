/// Representative payloads for unit tests.
///
/// The OpenWeather bodies are trimmed copies of real responses from the
/// current-weather endpoint. Note that `cod` is an integer on success and a
/// string on most failures.

pub const OWM_SUCCESS_LONDON: &str = r#"{
  "coord": {"lon": -0.1257, "lat": 51.5085},
  "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
  "base": "stations",
  "main": {"temp": 11.42, "feels_like": 10.61, "temp_min": 10.1, "temp_max": 12.5, "pressure": 1012, "humidity": 79},
  "visibility": 10000,
  "wind": {"speed": 4.63, "deg": 240},
  "dt": 1697461200,
  "sys": {"country": "GB", "sunrise": 1697437689, "sunset": 1697476023},
  "timezone": 3600,
  "id": 2643743,
  "name": "London",
  "cod": 200
}"#;

pub const OWM_SUCCESS_STRING_COD: &str = r#"{"main": {"temp": -3.5}, "name": "Oslo", "cod": "200"}"#;

pub const OWM_CITY_NOT_FOUND: &str = r#"{"cod": "404", "message": "city not found"}"#;

pub const OWM_INVALID_KEY: &str = r#"{"cod": 401, "message": "Invalid API key. Please see https://openweathermap.org/faq#error401 for more info."}"#;

pub const OWM_SUCCESS_MISSING_TEMP: &str = r#"{"main": {"humidity": 40}, "name": "Nowhere", "cod": 200}"#;

pub const OWM_NOT_JSON: &str = "<html><body>502 Bad Gateway</body></html>";

/// Two cities, three seasons, with a season column on every row.
pub const SAMPLE_TEMPERATURE_CSV: &str = "\
city,timestamp,temperature,season
Berlin,2023-01-01,0.5,winter
Berlin,2023-01-02,-1.2,winter
Berlin,2023-01-03,1.8,winter
Berlin,2023-04-01,9.7,spring
Berlin,2023-04-02,11.3,spring
Cairo,2023-01-01,14.9,winter
Cairo,2023-01-02,15.6,winter
Cairo,2023-07-01,34.2,summer
Cairo,2023-07-02,35.1,summer
Cairo,2023-07-03,36.0,summer
";
