//! Wire/HTTP status code taxonomy (§6.4).

pub const SUCCESS: u32 = 20_000_000;
pub const DEFAULT_CLIENT_ERROR: u32 = 40_000_000;
pub const AUTHENTICATION_FAILED: u32 = 40_000_001;
pub const INVALID_MESSAGE: u32 = 40_000_002;
pub const INVALID_PARAMETER: u32 = 40_000_003;
pub const IDLE_TIMEOUT: u32 = 40_000_004;
pub const TOO_MANY_REQUESTS: u32 = 40_000_005;
pub const UNSUPPORTED_SAMPLE_RATE: u32 = 41_010_101;
pub const DEFAULT_SERVER_ERROR: u32 = 50_000_000;
pub const INTERNAL_GRPC_ERROR: u32 = 50_000_001;
