//! Protocol versioning for daemon IPC communication.
//!
//! # Version History
//!
//! | Version | Changes |
//! |---------|---------|
//! | 1 | Initial protocol version |
//! | 2 | Added `modules` to DaemonStatus, `RecordUnlock` request |
//!
//! # Breaking Changes (require PROTOCOL_VERSION bump)
//!
//! - Removing fields from request/response types
//! - Changing field types
//! - Renaming fields without `#[serde(alias)]`
//! - Removing enum variants
//!
//! # Non-Breaking Changes (safe without version bump)
//!
//! - Adding new optional fields with `#[serde(default)]`
//! - Adding new request/response variants
//!
//! We keep N-1 compatibility: `MIN_SUPPORTED_VERSION` stays one behind
//! `PROTOCOL_VERSION` until support for the older version is dropped.

/// Current protocol version. Bump when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 2;

/// Minimum protocol version this build can communicate with.
pub const MIN_SUPPORTED_VERSION: u32 = 1;
