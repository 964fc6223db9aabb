//! Vendor-scoped review and response ids
//!
//! Every review id, developer-response id and response id the dispatcher
//! emits carries a vendor scheme prefix (`"as:123"`, `"gp:com.example.app/x"`)
//! so a later respond/delete call can be routed from the id alone.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Vendor;

/// A malformed scoped id was passed to an id-scoped operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed id '{0}': expected '<scheme>:<id>' (e.g. \"as:123\" or \"gp:com.example.app\")")]
pub struct MalformedId(pub String);

/// A vendor-scoped id: scheme prefix plus the vendor-native id
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedId {
    vendor: Vendor,
    native: String,
}

impl ScopedId {
    /// Scope a vendor-native id
    pub fn new(vendor: Vendor, native: impl Into<String>) -> Self {
        Self {
            vendor,
            native: native.into(),
        }
    }

    /// Parse a `"<scheme>:<id>"` string.
    ///
    /// A missing colon, an unrecognized scheme or an empty native part all
    /// reject with [`MalformedId`] echoing the offending input.
    pub fn parse(raw: &str) -> Result<Self, MalformedId> {
        let (scheme, native) = raw.split_once(':').ok_or_else(|| MalformedId(raw.to_string()))?;
        let vendor = Vendor::from_scheme(scheme).ok_or_else(|| MalformedId(raw.to_string()))?;
        if native.is_empty() {
            return Err(MalformedId(raw.to_string()));
        }
        Ok(Self {
            vendor,
            native: native.to_string(),
        })
    }

    /// The owning vendor
    pub fn vendor(&self) -> Vendor {
        self.vendor
    }

    /// The vendor-native id, without the scheme prefix
    pub fn native(&self) -> &str {
        &self.native
    }
}

impl std::fmt::Display for ScopedId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.vendor.scheme(), self.native)
    }
}

// Serialized as the wire string, so scoped ids look the same in JSON output
// as they do on the command line.
impl Serialize for ScopedId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopedId {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ScopedId::parse(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_store_id() {
        let id = ScopedId::parse("as:999").unwrap();
        assert_eq!(id.vendor(), Vendor::AppStore);
        assert_eq!(id.native(), "999");
        assert_eq!(id.to_string(), "as:999");
    }

    #[test]
    fn test_parse_google_play_id() {
        let id = ScopedId::parse("gp:com.example.app/abc123").unwrap();
        assert_eq!(id.vendor(), Vendor::GooglePlay);
        assert_eq!(id.native(), "com.example.app/abc123");
    }

    #[test]
    fn test_native_keeps_later_colons() {
        // Only the first colon separates the scheme
        let id = ScopedId::parse("as:a:b").unwrap();
        assert_eq!(id.native(), "a:b");
    }

    #[test]
    fn test_missing_colon_rejected() {
        let err = ScopedId::parse("nocolon").unwrap_err();
        assert_eq!(err, MalformedId("nocolon".to_string()));
        assert!(err.to_string().contains("nocolon"));
        assert!(err.to_string().contains("<scheme>:<id>"));
    }

    #[test]
    fn test_unknown_scheme_rejected() {
        assert!(ScopedId::parse("xx:123").is_err());
    }

    #[test]
    fn test_empty_native_rejected() {
        assert!(ScopedId::parse("as:").is_err());
    }

    #[test]
    fn test_round_trip() {
        let original = ScopedId::new(Vendor::GooglePlay, "com.example.app/r1");
        let parsed = ScopedId::parse(&original.to_string()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_serde_as_wire_string() {
        let id = ScopedId::new(Vendor::AppStore, "42");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"as:42\"");

        let back: ScopedId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
