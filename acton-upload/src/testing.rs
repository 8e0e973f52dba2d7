//! Shared fixtures for unit tests

use crate::file::FileInfo;
use crate::intake::{MockUploadChannel, UploadChannel};
use image::{ImageFormat, RgbImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A channel that vouches for every path
pub fn trusting() -> Arc<dyn UploadChannel> {
    let mut channel = MockUploadChannel::new();
    channel.expect_is_uploaded_file().return_const(true);
    Arc::new(channel)
}

/// A channel that vouches for nothing
pub fn rejecting() -> Arc<dyn UploadChannel> {
    let mut channel = MockUploadChannel::new();
    channel.expect_is_uploaded_file().return_const(false);
    Arc::new(channel)
}

/// Writes `contents` to `dir/file_name`
pub fn write_fixture(dir: &Path, file_name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Writes a black PNG of the given size to `dir/file_name`
pub fn write_png(dir: &Path, file_name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(file_name);
    RgbImage::new(width, height)
        .save_with_format(&path, ImageFormat::Png)
        .unwrap();
    path
}

/// File info for an uploaded temp file with the client name `declared`
pub fn uploaded(path: &Path, declared: &str) -> FileInfo {
    FileInfo::new(path, Some(declared), trusting())
}
