//! Shared constants for storyvault.

/// Fixed primary key of the story configuration singleton.
pub const STORY_CONFIG_ID: i64 = 1;

/// Default r2d2 pool size. The engine assumes a single writer, so a small pool is enough.
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// Default SQLite busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Current shape version of [`crate::WorkingState`].
pub const WORKING_STATE_VERSION: u32 = 1;
