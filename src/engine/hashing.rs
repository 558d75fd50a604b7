//! Path hashing: 48-bit MD5-derived ids and their 12-digit hex codec.
//!
//! An entry's id is a pure function of its NFC-normalized relative path, so
//! path → id lookups never need a string index. The recurrence hashes the
//! parent's hex id concatenated with the child name, which makes the stored
//! ancestry string decodable one single-row lookup at a time.

use std::path::{Component, Path};

use unicode_normalization::UnicodeNormalization;

use crate::error::{IndexError, Result};

/// Length of a hex-encoded id.
pub const HEX_ID_LEN: usize = 12;

const HASH_MASK: i64 = 0x0000_ffff_ffff_ffff;

/// 48-bit hash of a string: MD5 of the UTF-8 bytes, bytes 2..8 big-endian.
/// The two forced-zero high bytes keep the value positive in an i64; SQLite
/// has no unsigned 64-bit integer type.
pub fn md5_48(s: &str) -> i64 {
    let digest = md5::compute(s.as_bytes());
    let mut bytes = [0u8; 8];
    bytes[2..].copy_from_slice(&digest[2..8]);
    i64::from_be_bytes(bytes)
}

/// Child id from the parent's id and the child's name.
pub fn step_hash(parent: i64, name: &str) -> i64 {
    md5_48(&format!("{}{}", hash_to_hex(parent), name))
}

/// Hash of a relative path: clean, NFC-normalize, then fold [`step_hash`]
/// over the components. Equal for any spelling that cleans and normalizes to
/// the same string. Fails on absolute paths.
pub fn path_hash(path: &str) -> Result<i64> {
    let norm = normalize_path(path)?;
    let mut segments = norm.split('/');
    // a cleaned path has at least one segment ("." for the empty path)
    let mut id = md5_48(segments.next().unwrap_or("."));
    for seg in segments {
        id = step_hash(id, seg);
    }
    Ok(id)
}

/// Lexically clean `path` and NFC-normalize the result: collapse `//`, drop
/// `.`, resolve `..` against prior components; an empty result becomes `.`.
/// Rejects absolute paths.
pub fn normalize_path(path: &str) -> Result<String> {
    let p = Path::new(path);
    if p.is_absolute() {
        return Err(IndexError::AbsolutePath(p.to_path_buf()));
    }
    let mut parts: Vec<&str> = Vec::new();
    for comp in p.components() {
        match comp {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(&"..") | None => parts.push(".."),
                Some(_) => {
                    parts.pop();
                }
            },
            Component::Normal(os) => {
                // the input is a &str, so every component is valid UTF-8
                if let Some(s) = os.to_str() {
                    parts.push(s);
                }
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(IndexError::AbsolutePath(p.to_path_buf()));
            }
        }
    }
    let cleaned = if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    };
    Ok(cleaned.nfc().collect())
}

/// Render an id as exactly 12 lowercase hex digits (the low 48 bits,
/// big-endian).
pub fn hash_to_hex(hash: i64) -> String {
    format!("{:012x}", hash & HASH_MASK)
}

/// Parse a 12-digit hex id, either case. Inverse of [`hash_to_hex`].
pub fn hex_to_hash(hex: &str) -> Result<i64> {
    if hex.len() != HEX_ID_LEN || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(IndexError::MalformedHex(hex.to_string()));
    }
    i64::from_str_radix(hex, 16).map_err(|_| IndexError::MalformedHex(hex.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // (relative path, 12-digit hex id)
    const HASH_VECTORS: &[(&str, &str)] = &[
        ("dir1/dir2/dir3/dir4", "fa9456b527e3"),
        ("usr/bin/bash", "5dbf20a5dc3b"),
        ("UTF/string/João/👍", "89006f5a9f86"),
        ("日/本/語", "2fd0d138e55e"),
    ];

    #[test]
    fn test_hash_vectors() {
        for (path, hex) in HASH_VECTORS {
            let id = path_hash(path).unwrap();
            assert_eq!(hash_to_hex(id), *hex, "path {path}");
        }
    }

    #[test]
    fn test_codec_round_trip() {
        for (_, hex) in HASH_VECTORS {
            let id = hex_to_hash(hex).unwrap();
            assert_eq!(hash_to_hex(id), *hex);
            // either case parses to the same id
            assert_eq!(hex_to_hash(&hex.to_uppercase()).unwrap(), id);
        }
    }

    #[test]
    fn test_hex_rejects_malformed() {
        for bad in ["", "123", "fa9456b527e", "fa9456b527e3a", "fa9456b527ez"] {
            assert!(
                matches!(hex_to_hash(bad), Err(IndexError::MalformedHex(_))),
                "input {bad:?}"
            );
        }
    }

    #[test]
    fn test_recurrence_consistency() {
        let dir = path_hash("usr/bin").unwrap();
        assert_eq!(path_hash("usr/bin/bash").unwrap(), step_hash(dir, "bash"));
        assert_eq!(
            step_hash(dir, "bash"),
            md5_48(&format!("{}bash", hash_to_hex(dir)))
        );
    }

    #[test]
    fn test_clean_equivalence() {
        assert_eq!(
            path_hash(".git/hooks/../hooks/commit-msg.sample").unwrap(),
            path_hash(".git/hooks/commit-msg.sample").unwrap()
        );
        assert_eq!(path_hash("a//b/").unwrap(), path_hash("a/b").unwrap());
        assert_eq!(path_hash("./a/./b").unwrap(), path_hash("a/b").unwrap());
    }

    #[test]
    fn test_nfc_purity() {
        // "João" with the tilde as a combining mark (NFD)
        let nfd = "UTF/string/Joa\u{0303}o/👍";
        assert_eq!(
            path_hash(nfd).unwrap(),
            path_hash("UTF/string/João/👍").unwrap()
        );
    }

    #[test]
    fn test_empty_path_is_dot() {
        assert_eq!(path_hash("").unwrap(), md5_48("."));
        assert_eq!(path_hash(".").unwrap(), path_hash("").unwrap());
    }

    #[test]
    fn test_rejects_absolute() {
        assert!(matches!(
            path_hash("/usr/bin"),
            Err(IndexError::AbsolutePath(_))
        ));
        assert!(matches!(
            normalize_path("/etc"),
            Err(IndexError::AbsolutePath(_))
        ));
    }

    #[test]
    fn test_parent_dir_components() {
        // leading .. survives cleanup; interior .. cancels
        assert_eq!(normalize_path("../a").unwrap(), "../a");
        assert_eq!(normalize_path("a/../b").unwrap(), "b");
        assert_eq!(normalize_path("a/b/../../c").unwrap(), "c");
    }

    #[test]
    fn test_ids_fit_48_bits() {
        for (path, _) in HASH_VECTORS {
            let id = path_hash(path).unwrap();
            assert!(id >= 0);
            assert_eq!(id & !HASH_MASK, 0);
        }
    }
}
