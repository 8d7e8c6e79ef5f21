// ABOUTME: Application constants organized by domain for the carbon-aware pipeline
// ABOUTME: Provider endpoints, sampling windows, unit conversions and parameter names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Carbon Aware Contributors

/// Unit conversion factors
pub mod units {
    /// Grams per pound
    pub const LBS_TO_GRAMS: f64 = 453.592_37;

    /// kWh per MWh
    pub const MWH_TO_KWH: f64 = 1000.0;

    /// Convert a marginal operating emissions rate (lbs/MWh) into g/kWh
    #[must_use]
    pub fn moer_to_grams_per_kwh(lbs_per_mwh: f64) -> f64 {
        lbs_per_mwh * LBS_TO_GRAMS / MWH_TO_KWH
    }
}

/// WattTime API defaults
pub mod watttime {
    /// Provider name used in logs and errors
    pub const PROVIDER_NAME: &str = "WattTime";

    /// Data API base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.watttime.org/v3/";

    /// Authentication base URL (differs from the data API since v3)
    pub const DEFAULT_AUTH_BASE_URL: &str = "https://api.watttime.org/";

    /// Region cache lifetime in seconds
    pub const DEFAULT_REGION_CACHE_TTL_SECS: u64 = 86_400;

    /// Minutes of data fetched on either side of a historical query
    pub const MIN_SAMPLING_WINDOW_MINUTES: i64 = 120;

    /// Historical forecasts are generated on this minute grid
    pub const FORECAST_GRANULARITY_MINUTES: i64 = 5;

    /// Signal requested from every data endpoint
    pub const SIGNAL_TYPE: &str = "co2_moer";

    /// Endpoint paths relative to the base URLs
    pub mod paths {
        /// Basic-auth login (relative to the auth base URL)
        pub const LOGIN: &str = "login";
        /// Historical signal data
        pub const HISTORICAL: &str = "historical";
        /// Most recent forecast
        pub const FORECAST: &str = "forecast";
        /// Previously generated forecasts
        pub const FORECAST_HISTORICAL: &str = "forecast/historical";
        /// Geoposition to region lookup
        pub const REGION_FROM_LOCATION: &str = "region-from-loc";
    }

    /// Query string keys
    pub mod query {
        /// Region abbreviation
        pub const REGION: &str = "region";
        /// Range start
        pub const START: &str = "start";
        /// Range end
        pub const END: &str = "end";
        /// Latitude for region lookup
        pub const LATITUDE: &str = "latitude";
        /// Longitude for region lookup
        pub const LONGITUDE: &str = "longitude";
        /// Signal type selector
        pub const SIGNAL_TYPE: &str = "signal_type";
    }
}

/// Electricity Maps API defaults
pub mod electricity_maps {
    /// Provider name used in logs and errors
    pub const PROVIDER_NAME: &str = "ElectricityMaps";

    /// Data API base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.electricitymap.org/v3/";

    /// Window in hours served by the recent-history endpoint
    pub const RECENT_HISTORY_HOURS: i64 = 24;

    /// Sample length assumed when a response has fewer than two points
    pub const DEFAULT_SAMPLE_MINUTES: i64 = 60;

    /// Region cache time-to-live in seconds
    pub const DEFAULT_REGION_CACHE_TTL_SECS: u64 = 86_400;

    /// Access list entry granting every path
    pub const WILDCARD_ACCESS: &str = "*";

    /// Error body marker for a zone the token may not query
    pub const UNAUTHORIZED_ZONE: &str = "Token unauthorized for zoneKey";

    /// Error body marker for an endpoint the token may not call
    pub const UNAUTHORIZED_ENDPOINT: &str = "Endpoint not available";

    /// Endpoint paths relative to the base URL
    pub mod paths {
        /// Last 24 hours of carbon intensity
        pub const HISTORY: &str = "carbon-intensity/history";
        /// Current forecast
        pub const FORECAST: &str = "carbon-intensity/forecast";
        /// Arbitrary past range
        pub const PAST_RANGE: &str = "carbon-intensity/past-range";
        /// Zones and access paths for the token
        pub const ZONES: &str = "zones";
    }

    /// Query string keys
    pub mod query {
        /// Latitude
        pub const LATITUDE: &str = "lat";
        /// Longitude
        pub const LONGITUDE: &str = "lon";
        /// Zone key
        pub const ZONE: &str = "zone";
        /// Range start
        pub const START: &str = "start";
        /// Range end
        pub const END: &str = "end";
        /// Lifecycle or direct emission factors
        pub const EMISSION_FACTOR_TYPE: &str = "emissionFactorType";
        /// Exclude estimated values
        pub const DISABLE_ESTIMATIONS: &str = "disableEstimations";
    }
}

/// Electricity Maps free tier (CO2 Signal) defaults
pub mod electricity_maps_free {
    /// Provider name used in logs and errors
    pub const PROVIDER_NAME: &str = "ElectricityMapsFree";

    /// Default API base URL
    pub const DEFAULT_BASE_URL: &str = "https://api.co2signal.com/v1/";

    /// Path of the latest-intensity endpoint, relative to the base URL
    pub const LATEST_PATH: &str = "latest";

    /// Header carrying the API token
    pub const TOKEN_HEADER: &str = "auth-token";

    /// Length assigned to the single reported sample
    pub const SAMPLE_DURATION_MINUTES: i64 = 120;

    /// Default region cache time-to-live in seconds
    pub const DEFAULT_REGION_CACHE_TTL_SECS: u64 = 86_400;

    /// Query parameter names
    pub mod query {
        /// Zone code
        pub const COUNTRY_CODE: &str = "countryCode";
        /// Latitude
        pub const LATITUDE: &str = "lat";
        /// Longitude
        pub const LONGITUDE: &str = "lon";
    }
}

/// Static JSON data source defaults
pub mod json_source {
    /// Provider name used in logs and errors
    pub const PROVIDER_NAME: &str = "JsonDataSource";

    /// Minutes of data kept on either side of a historical query before clipping
    pub const MIN_SAMPLING_WINDOW_MINUTES: i64 = 1440;
}

/// Latest-emissions cache defaults
pub mod emissions_cache {
    /// Entry lifetime used when the cache is enabled without one
    pub const DEFAULT_EXPIRATION_MINUTES: i64 = 10;
}

/// Bounds applied to query parameters
pub mod limits {
    /// Largest accepted workload window, one year in minutes
    pub const MAX_WINDOW_MINUTES: i64 = 525_600;
}

/// Location source defaults
pub mod locations {
    /// Separator between a file prefix and a location key
    pub const DEFAULT_DELIMITER: &str = "-";

    /// Name used in errors raised while loading location files
    pub const SOURCE_NAME: &str = "LocationSource";
}

/// Service identity used by logging
pub mod service_names {
    /// Default service name
    pub const CARBON_AWARE: &str = "carbon-aware";
}

/// Environment variable names read by the application configuration
pub mod env_config {
    /// Provider serving historical emissions
    pub const EMISSIONS_DATA_SOURCE: &str = "CARBON_EMISSIONS_DATA_SOURCE";
    /// Provider serving forecasts
    pub const FORECAST_DATA_SOURCE: &str = "CARBON_FORECAST_DATA_SOURCE";

    /// `WattTime` account name
    pub const WATTTIME_USERNAME: &str = "WATTTIME_USERNAME";
    /// `WattTime` account password
    pub const WATTTIME_PASSWORD: &str = "WATTTIME_PASSWORD";
    /// `WattTime` data API base URL
    pub const WATTTIME_BASE_URL: &str = "WATTTIME_BASE_URL";
    /// `WattTime` login base URL
    pub const WATTTIME_AUTH_BASE_URL: &str = "WATTTIME_AUTH_BASE_URL";
    /// Region cache lifetime in seconds
    pub const WATTTIME_REGION_CACHE_TTL_SECS: &str = "WATTTIME_REGION_CACHE_TTL_SECS";

    /// Header carrying the Electricity Maps token
    pub const ELECTRICITYMAPS_API_TOKEN_HEADER: &str = "ELECTRICITYMAPS_API_TOKEN_HEADER";
    /// Electricity Maps token
    pub const ELECTRICITYMAPS_API_TOKEN: &str = "ELECTRICITYMAPS_API_TOKEN";
    /// Electricity Maps API base URL
    pub const ELECTRICITYMAPS_BASE_URL: &str = "ELECTRICITYMAPS_BASE_URL";
    /// `lifecycle` or `direct`
    pub const ELECTRICITYMAPS_EMISSION_FACTOR_TYPE: &str = "ELECTRICITYMAPS_EMISSION_FACTOR_TYPE";
    /// Ask the provider to omit estimated values
    pub const ELECTRICITYMAPS_DISABLE_ESTIMATIONS: &str = "ELECTRICITYMAPS_DISABLE_ESTIMATIONS";

    /// Electricity Maps free tier token
    pub const ELECTRICITYMAPSFREE_API_TOKEN: &str = "ELECTRICITYMAPSFREE_API_TOKEN";
    /// Electricity Maps free tier base URL
    pub const ELECTRICITYMAPSFREE_BASE_URL: &str = "ELECTRICITYMAPSFREE_BASE_URL";

    /// Static data file for the JSON source
    pub const JSON_DATA_FILE: &str = "CARBON_JSON_DATA_FILE";

    /// Wrap the emissions source in the latest-emissions cache
    pub const EMISSIONS_CACHE_ENABLED: &str = "CARBON_EMISSIONS_CACHE_ENABLED";
    /// Minutes a cached emissions entry stays valid
    pub const EMISSIONS_CACHE_EXPIRATION_MIN: &str = "CARBON_EMISSIONS_CACHE_EXPIRATION_MIN";

    /// Comma-separated `path` or `prefix=path` location files
    pub const LOCATION_FILES: &str = "CARBON_LOCATION_FILES";
    /// Separator between a location file prefix and its keys
    pub const LOCATION_DELIMITER: &str = "CARBON_LOCATION_DELIMITER";

    /// Whole-request timeout for outbound HTTP
    pub const HTTP_CLIENT_TIMEOUT_SECS: &str = "HTTP_CLIENT_TIMEOUT_SECS";
    /// Connect timeout for outbound HTTP
    pub const HTTP_CLIENT_CONNECT_TIMEOUT_SECS: &str = "HTTP_CLIENT_CONNECT_TIMEOUT_SECS";
    /// Outbound proxy URL
    pub const PROXY_URL: &str = "CARBON_PROXY_URL";
    /// Outbound proxy user
    pub const PROXY_USERNAME: &str = "CARBON_PROXY_USERNAME";
    /// Outbound proxy password
    pub const PROXY_PASSWORD: &str = "CARBON_PROXY_PASSWORD";
}
