use chrono::NaiveDate;

/// Application configuration, parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// Label for the configured home location; used as the forecast cache key.
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Base URL of the Open-Meteo forecast API (overridable for tests).
    pub weather_base_url: String,
    /// Fixed UTC offset of the user's timezone, in whole hours.
    pub utc_offset_hours: i32,
    /// Optional training plan start date; seeds the plan table on boot.
    pub plan_start_date: Option<NaiveDate>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("PORT must be a valid u16"),
            location_name: std::env::var("LOCATION_NAME").unwrap_or_else(|_| "home".to_string()),
            latitude: std::env::var("LATITUDE")
                .unwrap_or_else(|_| "47.3769".to_string())
                .parse()
                .expect("LATITUDE must be a valid number"),
            longitude: std::env::var("LONGITUDE")
                .unwrap_or_else(|_| "8.5417".to_string())
                .parse()
                .expect("LONGITUDE must be a valid number"),
            weather_base_url: std::env::var("WEATHER_BASE_URL")
                .unwrap_or_else(|_| "https://api.open-meteo.com".to_string()),
            utc_offset_hours: std::env::var("UTC_OFFSET_HOURS")
                .unwrap_or_else(|_| "0".to_string())
                .parse()
                .expect("UTC_OFFSET_HOURS must be a whole number of hours"),
            plan_start_date: std::env::var("PLAN_START_DATE").ok().map(|s| {
                s.parse()
                    .expect("PLAN_START_DATE must be an ISO date (YYYY-MM-DD)")
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        // NOTE: set_var/remove_var in tests is unsafe in multi-threaded contexts
        // (Rust may run tests in parallel). This test only exercises the
        // default-value logic; cargo runs this module's tests sequentially
        // within one test binary, so we accept the risk.
        unsafe {
            std::env::set_var("DATABASE_URL", "sqlite://planner-test.db");
            std::env::remove_var("PORT");
            std::env::remove_var("LOCATION_NAME");
            std::env::remove_var("LATITUDE");
            std::env::remove_var("LONGITUDE");
            std::env::remove_var("WEATHER_BASE_URL");
            std::env::remove_var("UTC_OFFSET_HOURS");
            std::env::remove_var("PLAN_START_DATE");
        }

        let config = AppConfig::from_env();

        assert_eq!(config.port, 8080);
        assert_eq!(config.location_name, "home");
        assert!(config.weather_base_url.contains("open-meteo"));
        assert_eq!(config.utc_offset_hours, 0);
        assert!(config.plan_start_date.is_none());
    }
}
