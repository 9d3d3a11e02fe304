pub const OK_RESPONSE: &str = "HTTP/1.1 200 OK";
pub const CREATED: &str = "HTTP/1.1 201 Created";
pub const BAD_REQUEST: &str = "HTTP/1.1 400 Bad Request";
pub const UNAUTHORIZED: &str = "HTTP/1.1 401 Unauthorized";
pub const NOT_FOUND: &str = "HTTP/1.1 404 Not Found";
pub const CONFLICT: &str = "HTTP/1.1 409 Conflict";
pub const PAYLOAD_TOO_LARGE: &str = "HTTP/1.1 413 Payload Too Large";
pub const INTERNAL_ERROR: &str = "HTTP/1.1 500 Internal Server Error";
pub const BAD_GATEWAY: &str = "HTTP/1.1 502 Bad Gateway";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:7879";
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Account id recorded on salary events that never touched an asset.
pub const HISTORICAL_ACCOUNT_ID: &str = "HISTORICAL";
pub const HISTORICAL_CATEGORY: &str = "INCOME";
pub const DEFAULT_SUB_CATEGORY: &str = "General";
pub const DEFAULT_SALARY_CURRENCY: &str = "HUF";

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;
pub const TOP_MOVERS: usize = 3;

pub const DEFAULT_PRICE_API_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_RESYNC_SECS: u64 = 60;
