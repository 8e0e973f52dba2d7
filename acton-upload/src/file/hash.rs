//! Streaming file digests

use md5::Md5;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

const CHUNK_SIZE: usize = 64 * 1024;

/// Digest algorithms supported by [`FileInfo::hash`](super::FileInfo::hash)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum HashAlgorithm {
    /// MD5 (default)
    #[default]
    Md5,
    /// SHA-1
    Sha1,
    /// SHA-256
    Sha256,
    /// SHA-512
    Sha512,
}

impl HashAlgorithm {
    /// Canonical lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Streams the file through this digest and returns lower-case hex
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or read.
    pub fn digest_file(self, path: &Path) -> io::Result<String> {
        match self {
            Self::Md5 => digest_file::<Md5>(path),
            Self::Sha1 => digest_file::<Sha1>(path),
            Self::Sha256 => digest_file::<Sha256>(path),
            Self::Sha512 => digest_file::<Sha512>(path),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The requested digest is not supported
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unsupported hash algorithm: {0}")]
pub struct UnsupportedHash(pub String);

impl FromStr for HashAlgorithm {
    type Err = UnsupportedHash;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "").as_str() {
            "md5" => Ok(Self::Md5),
            "sha1" => Ok(Self::Sha1),
            "sha256" => Ok(Self::Sha256),
            "sha512" => Ok(Self::Sha512),
            _ => Err(UnsupportedHash(s.to_string())),
        }
    }
}

fn digest_file<D: Digest>(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = D::new();
    let mut buffer = vec![0_u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }

    Ok(hex::encode(hasher.finalize()))
}
