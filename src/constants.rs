// Defaults and well-known names shared across the ETL

pub const DEFAULT_WEB_URL: &str = "http://localhost:7080";
pub const DEFAULT_DATABASE_PATH: &str = "data/contacts.db";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:7300";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_BACKOFF_MS: u64 = 250;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIG_FILE: &str = "etl.toml";

/// Company-name keywords marking the industry we collect contacts for
pub const DEFAULT_INDUSTRY_KEYWORDS: &[&str] =
    &["Tech", "Data", "Cloud", "Digital", "Software", "System"];

/// Title fragments marking a senior contact
pub const DEFAULT_SENIORITY_MARKERS: &[&str] = &[
    "CEO",
    "CTO",
    "Director",
    "VP",
    "Chief",
    "Vice President",
    "President",
];

pub const DEFAULT_MIN_CONTACTS_PER_COMPANY: usize = 2;

// Environment variable names
pub const ENV_WEB_URL: &str = "WEB_URL";
pub const ENV_DATABASE_PATH: &str = "CONTACTS_DB_PATH";
pub const ENV_API_BASE_URL: &str = "API_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "LOG_LEVEL";
pub const ENV_RETRY_ATTEMPTS: &str = "RETRY_ATTEMPTS";
pub const ENV_RETRY_BACKOFF_MS: &str = "RETRY_BACKOFF_MS";
pub const ENV_HTTP_TIMEOUT_SECS: &str = "HTTP_TIMEOUT_SECS";
pub const ENV_METRICS_PORT: &str = "ETL_METRICS_PORT";

/// Path on the tracker API that accepts run summaries
pub const TRACKER_RUNS_PATH: &str = "/api/etl";

pub const NO_MATCHES_DESCRIPTION: &str = "No contacts matched filtering criteria";

/// Statuses the HTTP client retries before giving up
pub const RETRYABLE_STATUSES: &[u16] = &[429, 500, 502, 503, 504];
