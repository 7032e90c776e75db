//! Value Codec Module
//!
//! Optional pre-processing applied to a payload before it is stored.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::CacheError;

// == Value Codec Trait ==
/// Transforms a payload before the cache stores it.
///
/// The cache treats the output as opaque bytes. A codec that cannot encode a
/// value should panic; the panic unwinds out of `set` before any lock is taken.
pub trait ValueCodec: Send + Sync {
    /// Encodes `value` into the bytes that will be stored.
    fn encode(&self, value: Bytes) -> Bytes;

    /// Short name used in logs and load reports.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> ValueCodec for F
where
    F: Fn(Bytes) -> Bytes + Send + Sync,
{
    fn encode(&self, value: Bytes) -> Bytes {
        self(value)
    }
}

// == Identity Codec ==
/// Stores payloads unchanged. This is the default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCodec;

impl ValueCodec for IdentityCodec {
    #[inline]
    fn encode(&self, value: Bytes) -> Bytes {
        value
    }

    fn name(&self) -> &str {
        "identity"
    }
}

// == Copy Codec ==
/// Copies every payload into a freshly allocated buffer.
///
/// The stored value never shares an allocation with the caller's buffer,
/// even when the caller handed over a slice of a larger `Bytes`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CopyCodec;

impl ValueCodec for CopyCodec {
    fn encode(&self, value: Bytes) -> Bytes {
        Bytes::copy_from_slice(&value)
    }

    fn name(&self) -> &str {
        "copy"
    }
}

// == Codec Kind ==
/// Built-in codecs selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    Identity,
    Copy,
}

impl CodecKind {
    /// All built-in codecs, in the order the load driver runs them.
    pub const ALL: [CodecKind; 2] = [CodecKind::Copy, CodecKind::Identity];

    /// Builds the codec this kind names.
    pub fn build(self) -> Box<dyn ValueCodec> {
        match self {
            CodecKind::Identity => Box::new(IdentityCodec),
            CodecKind::Copy => Box::new(CopyCodec),
        }
    }
}

impl FromStr for CodecKind {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "identity" | "none" => Ok(CodecKind::Identity),
            "copy" => Ok(CodecKind::Copy),
            other => Err(CacheError::UnknownCodec(other.to_string())),
        }
    }
}

impl fmt::Display for CodecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecKind::Identity => f.write_str("identity"),
            CodecKind::Copy => f.write_str("copy"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_returns_same_bytes() {
        let value = Bytes::from_static(b"payload");
        assert_eq!(IdentityCodec.encode(value.clone()), value);
    }

    #[test]
    fn test_copy_detaches_from_source_buffer() {
        let source = Bytes::from(vec![1u8, 2, 3, 4, 5, 6]);
        let slice = source.slice(1..4);

        let encoded = CopyCodec.encode(slice.clone());
        assert_eq!(encoded, slice);
        assert_ne!(encoded.as_ptr(), slice.as_ptr());
    }

    #[test]
    fn test_closure_is_a_codec() {
        let upper = |value: Bytes| Bytes::from(value.to_ascii_uppercase());
        assert_eq!(upper.encode(Bytes::from_static(b"abc")), "ABC");
        assert_eq!(ValueCodec::name(&upper), "custom");
    }

    #[test]
    fn test_codec_kind_parse() {
        assert_eq!("copy".parse::<CodecKind>().unwrap(), CodecKind::Copy);
        assert_eq!(" Identity ".parse::<CodecKind>().unwrap(), CodecKind::Identity);
        assert!(matches!(
            "gpu".parse::<CodecKind>(),
            Err(CacheError::UnknownCodec(name)) if name == "gpu"
        ));
    }

    #[test]
    fn test_codec_kind_build_names() {
        for kind in CodecKind::ALL {
            assert_eq!(kind.build().name(), kind.to_string());
        }
    }
}
