//! Object storage for report photos.
//!
//! MinIO/S3-compatible client; photos live under a public prefix and are
//! served by direct URL.

mod photo_storage;

pub use photo_storage::PhotoStorage;
