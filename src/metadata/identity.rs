//! Assembly public-key identities.
//!
//! Assemblies identify themselves with either a full public key (when the
//! `PUBLIC_KEY` flag is set) or the 8-byte token derived from one. Tokens are
//! the trailing 8 bytes of the key's digest under the assembly's declared
//! hash algorithm.

use md5::{Digest, Md5};
use sha1::Sha1;

use crate::{file::io::read_le, metadata::tables::AssemblyHashAlgorithm, Result};

/// A full public key or the token hashed from one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublicKeyIdentity {
    /// The full public key blob
    Key(Vec<u8>),
    /// The 8-byte token of a public key
    Token(u64),
}

impl PublicKeyIdentity {
    /// Build an identity from a `#Blob` entry.
    ///
    /// ## Arguments
    /// * 'data'        - The blob bytes
    /// * '`is_full_key`' - True when the blob holds the full key rather than a token
    ///
    /// # Errors
    /// Returns an error if a token blob is shorter than 8 bytes.
    pub fn from_blob(data: &[u8], is_full_key: bool) -> Result<Self> {
        Ok(if is_full_key {
            PublicKeyIdentity::Key(data.to_vec())
        } else {
            PublicKeyIdentity::Token(read_le::<u64>(data)?)
        })
    }

    /// The public-key token of this identity.
    ///
    /// Keys are digested with the given `AssemblyHashAlgorithm` (`NONE`
    /// defaults to SHA-1, matching runtime behavior) and the trailing 8 bytes
    /// of the digest form the token. Tokens pass through unchanged.
    ///
    /// ## Arguments
    /// * 'algorithm' - The declared `AssemblyHashAlgorithm`
    ///
    /// # Errors
    /// Returns [`crate::Error::NotSupported`] for hash algorithms outside the
    /// standard set.
    pub fn token_with(&self, algorithm: u32) -> Result<u64> {
        match self {
            PublicKeyIdentity::Token(token) => Ok(*token),
            PublicKeyIdentity::Key(key) => {
                let digest: Vec<u8> = match algorithm {
                    AssemblyHashAlgorithm::MD5 => {
                        let mut hasher = Md5::new();
                        hasher.update(key);
                        hasher.finalize().to_vec()
                    }
                    AssemblyHashAlgorithm::SHA1 | AssemblyHashAlgorithm::NONE => {
                        let mut hasher = Sha1::new();
                        hasher.update(key);
                        hasher.finalize().to_vec()
                    }
                    _ => return Err(crate::Error::NotSupported),
                };

                read_le::<u64>(&digest[digest.len() - 8..])
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_blob_round_trips() {
        let blob = [0xB7, 0x7A, 0x5C, 0x56, 0x19, 0x34, 0xE0, 0x89];
        let identity = PublicKeyIdentity::from_blob(&blob, false).unwrap();

        assert_eq!(
            identity,
            PublicKeyIdentity::Token(u64::from_le_bytes(blob))
        );
        assert_eq!(
            identity.token_with(AssemblyHashAlgorithm::SHA1).unwrap(),
            u64::from_le_bytes(blob)
        );
    }

    #[test]
    fn short_token_blob_rejected() {
        assert!(PublicKeyIdentity::from_blob(&[0x01, 0x02], false).is_err());
    }

    #[test]
    fn key_token_is_stable() {
        let key = vec![0x01, 0x02, 0x03, 0x04];
        let identity = PublicKeyIdentity::from_blob(&key, true).unwrap();

        let first = identity.token_with(AssemblyHashAlgorithm::SHA1).unwrap();
        let second = identity.token_with(AssemblyHashAlgorithm::SHA1).unwrap();
        assert_eq!(first, second);

        // Different algorithms hash to different tokens
        let md5 = identity.token_with(AssemblyHashAlgorithm::MD5).unwrap();
        assert_ne!(first, md5);
    }

    #[test]
    fn none_algorithm_defaults_to_sha1() {
        let key = vec![0xAA; 16];
        let identity = PublicKeyIdentity::from_blob(&key, true).unwrap();

        assert_eq!(
            identity.token_with(AssemblyHashAlgorithm::NONE).unwrap(),
            identity.token_with(AssemblyHashAlgorithm::SHA1).unwrap()
        );
    }

    #[test]
    fn unknown_algorithm_rejected() {
        let identity = PublicKeyIdentity::Key(vec![1, 2, 3]);
        assert!(identity.token_with(0x1234).is_err());
    }
}
