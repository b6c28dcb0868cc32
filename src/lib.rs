// Takeout Restore - library entry point
//
// Repairs a bulk photo/video export: re-pairs each media file with its
// sidecar metadata record despite mangled on-disk names, then merges the
// record's capture time and geolocation back into a copy of the file.

pub mod constants;
pub mod error;
pub mod tools;
pub mod discover;
pub mod sidecar;
pub mod pairing;
pub mod merge;
pub mod batch;
