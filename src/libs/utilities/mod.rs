// Building blocks used by the install pipeline and the version store.

// Release locations and the HTTP client seam.
pub mod assets;
// Streaming single-entry zip extraction.
pub mod compression;
// Permission and link helpers.
pub mod file_operations;
// Pass-through SHA-256 hashing.
pub mod hashing;
// Host OS/arch to release naming.
pub mod platform;
