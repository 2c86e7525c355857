//! Whisper model management: catalog, local cache, and downloads.

pub mod catalog;
pub mod download;
