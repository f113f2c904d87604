/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// REPORT CONTENT LIMITS
// =============================================================================

/// Minimum photos attached to a report at creation
pub const MIN_REPORT_PHOTOS: usize = 1;

/// Maximum photos attached to a report at creation
pub const MAX_REPORT_PHOTOS: usize = 3;

/// Per-photo size cap in bytes
pub const MAX_PHOTO_SIZE_BYTES: usize = 8 * 1024 * 1024;

/// Photo content types accepted on upload
pub const ALLOWED_PHOTO_CONTENT_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// Maximum length of a rejection reason
pub const MAX_REJECTION_REASON_CHARS: usize = 500;

/// Maximum length of a report message or internal note
pub const MAX_MESSAGE_CONTENT_CHARS: usize = 2000;
