/// Built-in severity tiers, most extreme first (°C, mm, m/s)
pub const TX_TIERS: [(&str, f64); 3] = [("extreme-hot", 38.0), ("very-hot", 32.0), ("warm", 30.0)];
pub const TN_TIERS: [(&str, f64); 3] = [
    ("extreme-cold", -15.0),
    ("very-cold", -5.0),
    ("frost", 0.0),
];
pub const RR_TIERS: [(&str, f64); 4] = [
    ("deluge", 100.0),
    ("heavy-rain", 50.0),
    ("rain", 10.0),
    ("light-rain", 1.0),
];
pub const FFM_TIERS: [(&str, f64); 3] = [
    ("violent-storm", 24.5),
    ("storm", 17.5),
    ("strong-wind", 10.8),
];
pub const FXY_TIERS: [(&str, f64); 3] = [
    ("violent-storm", 25.0),
    ("storm", 17.5),
    ("strong-wind", 10.8),
];

/// Episode predicates
pub const HEATWAVE_TX: f64 = 30.0;
pub const COLD_SNAP_TN: f64 = 0.0;
pub const TROPICAL_NIGHT_TN: f64 = 20.0;
pub const DELUGE_RR: f64 = 100.0;
pub const STORM_WIND_FFM: f64 = 17.5;
pub const STORM_GUST_FXY: f64 = 25.0;
pub const DRY_DAY_RR: f64 = 1.0;

/// Minimum run lengths (days)
pub const HEATWAVE_MIN_DAYS: usize = 3;
pub const COLD_SNAP_MIN_DAYS: usize = 3;
pub const SINGLE_DAY_MIN_DAYS: usize = 1;
pub const DRY_SPELL_MIN_DAYS: usize = 30;

/// Percentiles reported by default
pub const DEFAULT_PERCENTILES: [f64; 9] = [1.0, 5.0, 10.0, 25.0, 50.0, 75.0, 90.0, 95.0, 99.0];

/// Widest year range a zero-filled frequency table may materialise
pub const MAX_ZERO_FILL_YEARS: i64 = 10_000;

/// Missing-value sentinel accepted in station tables
pub const MISSING_SENTINEL: f64 = -9999.0;

/// Reader buffer
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "WEATHER_EXTREMES";
