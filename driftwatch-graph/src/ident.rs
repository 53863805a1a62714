// Identifier codec — canonical string form of a component reference.
//
// The wire format `domain/flow/key@version` is used as a map key, in
// violation messages, and by every rendering layer, so encode/parse must
// round-trip exactly.

use serde::{Deserialize, Serialize};

use crate::{GraphError, Result};

/// Structured identity of one versioned component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentRef {
    pub domain: String,
    pub flow: String,
    pub key: String,
    /// Semantic-version string (`1.2.3`).
    pub version: String,
}

impl ComponentRef {
    pub fn new(
        domain: impl Into<String>,
        flow: impl Into<String>,
        key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            flow: flow.into(),
            key: key.into(),
            version: version.into(),
        }
    }
}

/// Canonical string identifier: `domain/flow/key@version`.
///
/// Ordered and hashable so it can key maps and produce deterministic output
/// orderings.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Encode a reference into its canonical identifier. Pure formatting,
    /// no failure mode.
    pub fn from_ref(component: &ComponentRef) -> Self {
        Self(format!(
            "{}/{}/{}@{}",
            component.domain, component.flow, component.key, component.version
        ))
    }

    /// Wrap an externally supplied identifier string without validating it.
    ///
    /// Collaborators use this for ids read off the wire; [`parse`](Self::parse)
    /// is the validating inverse.
    pub fn from_raw(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Decode the identifier back into a [`ComponentRef`].
    ///
    /// Grammar: `^([^/]+)/([^/]+)/([^@]+)@(.+)$`. A malformed id yields
    /// [`GraphError::MalformedIdentifier`], never a panic — externally
    /// fetched records may be malformed and a single bad record must not
    /// abort a whole analysis.
    pub fn parse(&self) -> Result<ComponentRef> {
        let malformed = |reason: &str| GraphError::MalformedIdentifier {
            id: self.0.clone(),
            reason: reason.to_string(),
        };

        let (domain, rest) = self
            .0
            .split_once('/')
            .ok_or_else(|| malformed("expected domain/flow/key@version"))?;
        let (flow, rest) = rest
            .split_once('/')
            .ok_or_else(|| malformed("missing flow segment"))?;
        let (key, version) = rest
            .split_once('@')
            .ok_or_else(|| malformed("missing @version suffix"))?;

        if domain.is_empty() || flow.is_empty() || key.is_empty() || version.is_empty() {
            return Err(malformed("empty segment"));
        }

        Ok(ComponentRef {
            domain: domain.to_string(),
            flow: flow.to_string(),
            key: key.to_string(),
            version: version.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&ComponentRef> for ComponentId {
    fn from(component: &ComponentRef) -> Self {
        Self::from_ref(component)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_canonical_form() {
        let r = ComponentRef::new("core", "sys-flows", "a", "1.0.0");
        assert_eq!(ComponentId::from_ref(&r).as_str(), "core/sys-flows/a@1.0.0");
    }

    #[test]
    fn round_trips_valid_ref() {
        let r = ComponentRef::new("billing", "invoice", "pdf-export", "2.3.1");
        let id = ComponentId::from_ref(&r);
        assert_eq!(id.parse().unwrap(), r);
    }

    #[test]
    fn version_may_contain_at_sign() {
        // Key stops at the first '@'; everything after belongs to version.
        let id = ComponentId::from_raw("d/f/k@1.0.0-beta@2");
        let r = id.parse().unwrap();
        assert_eq!(r.key, "k");
        assert_eq!(r.version, "1.0.0-beta@2");
    }

    #[test]
    fn key_may_contain_slashes() {
        let id = ComponentId::from_raw("d/f/nested/key@1.0.0");
        let r = id.parse().unwrap();
        assert_eq!(r.flow, "f");
        assert_eq!(r.key, "nested/key");
    }

    #[test]
    fn rejects_malformed_ids() {
        for bad in [
            "",
            "no-separators",
            "only/one-slash@1.0.0",
            "d/f/key-without-version",
            "d/f/@1.0.0",
            "//k@1.0.0",
            "d/f/k@",
        ] {
            let err = ComponentId::from_raw(bad).parse().unwrap_err();
            assert!(
                matches!(err, GraphError::MalformedIdentifier { .. }),
                "expected malformed-identifier failure for {bad:?}"
            );
        }
    }

    #[test]
    fn id_serde_is_transparent() {
        let id = ComponentId::from_raw("d/f/k@1.0.0");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"d/f/k@1.0.0\"");
        let back: ComponentId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    // ── Property-based round-trip ──────────────────────────────────

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        // Segment alphabets mirror the id grammar: no '/' in domain/flow,
        // no '@' in key, version free-form but non-empty.
        fn arb_ref() -> impl Strategy<Value = ComponentRef> {
            (
                "[a-zA-Z0-9_.-]{1,16}",
                "[a-zA-Z0-9_.-]{1,16}",
                "[a-zA-Z0-9_.-]{1,16}",
                "[0-9]{1,3}\\.[0-9]{1,3}\\.[0-9]{1,3}",
            )
                .prop_map(|(domain, flow, key, version)| {
                    ComponentRef::new(domain, flow, key, version)
                })
        }

        proptest! {
            #[test]
            fn parse_inverts_from_ref(r in arb_ref()) {
                let id = ComponentId::from_ref(&r);
                prop_assert_eq!(id.parse().unwrap(), r);
            }

            #[test]
            fn parse_never_panics(s in ".{0,64}") {
                let _ = ComponentId::from_raw(s).parse();
            }
        }
    }
}
