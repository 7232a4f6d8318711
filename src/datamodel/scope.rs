//! Dot-joined state-id paths used as data-model scope keys.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Chain of enclosing state ids, root-relative. The empty path is the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ScopePath {
    segments: Vec<String>,
}

impl ScopePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Split a dot-joined path. Empty segments are ignored, so `""` and `"."`
    /// both name the root.
    pub fn parse(path: &str) -> Self {
        ScopePath {
            segments: path
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ScopePath {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn parent(&self) -> Option<ScopePath> {
        if self.is_root() {
            return None;
        }
        Some(ScopePath {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    pub fn child(&self, segment: impl Into<String>) -> ScopePath {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        ScopePath { segments }
    }

    /// Segment-wise prefix test; a path is its own ancestor.
    pub fn is_ancestor_of(&self, other: &ScopePath) -> bool {
        other.segments.len() >= self.segments.len()
            && self.segments.iter().zip(&other.segments).all(|(a, b)| a == b)
    }

    /// `self`, then each parent up to and including the root.
    pub fn ancestors(&self) -> impl Iterator<Item = ScopePath> + '_ {
        (0..=self.segments.len()).rev().map(move |len| ScopePath {
            segments: self.segments[..len].to_vec(),
        })
    }
}

impl std::fmt::Display for ScopePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.segments.join("."))
    }
}

impl From<&str> for ScopePath {
    fn from(path: &str) -> Self {
        ScopePath::parse(path)
    }
}

impl From<&[String]> for ScopePath {
    fn from(segments: &[String]) -> Self {
        ScopePath::from_segments(segments.iter().cloned())
    }
}

impl Serialize for ScopePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ScopePath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let path = String::deserialize(deserializer)?;
        Ok(ScopePath::parse(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ancestry_is_by_segment_not_string_prefix() {
        let ab = ScopePath::parse("a.b");
        let abc = ScopePath::parse("a.bc");
        let abcd = ScopePath::parse("a.bc.d");

        assert!(abc.is_ancestor_of(&abcd));
        assert!(!ab.is_ancestor_of(&abcd));
        assert!(ScopePath::root().is_ancestor_of(&ab));
        assert!(ab.is_ancestor_of(&ab));
    }

    #[test]
    fn ancestors_walk_to_root() {
        let path = ScopePath::parse("dot.child.grandchild");
        let chain: Vec<String> = path.ancestors().map(|p| p.to_string()).collect();
        assert_eq!(chain, vec!["dot.child.grandchild", "dot.child", "dot", ""]);
    }

    #[test]
    fn empty_string_is_root() {
        assert!(ScopePath::parse("").is_root());
        assert_eq!(ScopePath::parse("a").parent(), Some(ScopePath::root()));
        assert_eq!(ScopePath::root().parent(), None);
    }
}
