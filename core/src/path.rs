use crate::error::ImdsError;
use std::fmt;
use std::str::FromStr;

/// One of the three independent metadata trees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Namespace {
    MetaData,
    Dynamic,
    UserData,
}

impl Namespace {
    /// Crawl order used when no root is given.
    pub const ALL: [Namespace; 3] = [Namespace::Dynamic, Namespace::MetaData, Namespace::UserData];

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::MetaData => "meta-data",
            Namespace::Dynamic => "dynamic",
            Namespace::UserData => "user-data",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Namespace {
    type Err = ImdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "meta-data" => Ok(Namespace::MetaData),
            "dynamic" => Ok(Namespace::Dynamic),
            "user-data" => Ok(Namespace::UserData),
            other => Err(ImdsError::UnsupportedPath(other.to_string())),
        }
    }
}

/// A path into one namespace. Segments never contain `/` and are never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ImdsPath {
    namespace: Namespace,
    segments: Vec<String>,
}

impl ImdsPath {
    pub fn root(namespace: Namespace) -> Self {
        Self {
            namespace,
            segments: Vec::new(),
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ImdsError> {
        let mut parts = split_segments(raw);
        let Some(head) = parts.next() else {
            return Err(ImdsError::UnsupportedPath(raw.to_string()));
        };
        let namespace = head
            .parse::<Namespace>()
            .map_err(|_| ImdsError::UnsupportedPath(raw.to_string()))?;
        Ok(Self {
            namespace,
            segments: parts.map(str::to_string).collect(),
        })
    }

    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    /// Segments below the namespace.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments including the namespace.
    pub fn depth(&self) -> usize {
        self.segments.len() + 1
    }

    /// Last segment, or the namespace name for a namespace root.
    pub fn name(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or_else(|| self.namespace.as_str())
    }

    /// The path one segment shorter. A namespace root has no parent.
    pub fn parent(&self) -> Option<Self> {
        let (_, rest) = self.segments.split_last()?;
        Some(Self {
            namespace: self.namespace,
            segments: rest.to_vec(),
        })
    }

    /// Appends a listing entry. Entries that smuggle `/` are split so the
    /// segment invariant holds.
    pub fn join(&self, entry: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.extend(split_segments(entry).map(str::to_string));
        Self {
            namespace: self.namespace,
            segments,
        }
    }

    /// Path below the namespace as sent to the service, without slashes at
    /// either end.
    pub fn sub_path(&self) -> String {
        self.segments.join("/")
    }

    /// Keys under which a value at this path is stored in a crawled tree.
    pub(crate) fn tree_keys(&self) -> Vec<&str> {
        let mut keys = Vec::with_capacity(self.depth());
        keys.push(self.namespace.as_str());
        keys.extend(self.segments.iter().map(String::as_str));
        keys
    }
}

impl fmt::Display for ImdsPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.namespace.as_str())?;
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}

impl FromStr for ImdsPath {
    type Err = ImdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Maps free-form user input onto a namespace-rooted path. Bare keys are
/// assumed to live under `meta-data`.
pub fn normalize_path(input: &str) -> String {
    let trimmed = input.trim().trim_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    let joined = split_segments(trimmed).collect::<Vec<_>>().join("/");
    let head = joined.split('/').next().unwrap_or_default();
    if head.parse::<Namespace>().is_ok() {
        joined
    } else {
        format!("{}/{joined}", Namespace::MetaData)
    }
}

fn split_segments(raw: &str) -> impl Iterator<Item = &str> {
    raw.split('/').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn normalize_path_roots_bare_keys_under_meta_data() {
        let cases = [
            ("", ""),
            ("instance-id", "meta-data/instance-id"),
            ("meta-data/instance-id", "meta-data/instance-id"),
            (
                "dynamic/instance-identity/document",
                "dynamic/instance-identity/document",
            ),
            ("user-data", "user-data"),
            ("placement/region", "meta-data/placement/region"),
            ("/instance-id/", "meta-data/instance-id"),
        ];
        for (input, expected) in cases {
            assert_eq!(normalize_path(input), expected, "input {input:?}");
        }
    }

    #[test]
    fn parse_trims_slashes_and_rejects_unknown_namespace() {
        let path = ImdsPath::parse("/meta-data//placement/region/").unwrap();
        assert_eq!(path.namespace(), Namespace::MetaData);
        assert_eq!(path.segments(), ["placement", "region"]);
        assert_eq!(path.to_string(), "meta-data/placement/region");
        assert_eq!(path.depth(), 3);

        assert!(matches!(
            ImdsPath::parse("latest/meta-data"),
            Err(ImdsError::UnsupportedPath(_))
        ));
        assert!(ImdsPath::parse("").is_err());
    }

    #[test]
    fn parent_stops_at_namespace_root() {
        let path = ImdsPath::parse("dynamic/instance-identity/document").unwrap();
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "dynamic/instance-identity");
        let root = parent.parent().unwrap();
        assert_eq!(root, ImdsPath::root(Namespace::Dynamic));
        assert_eq!(root.name(), "dynamic");
        assert_eq!(root.parent(), None);
    }

    #[test]
    fn join_splits_embedded_slashes() {
        let base = ImdsPath::root(Namespace::MetaData);
        let child = base.join("network/interfaces/");
        assert_eq!(child.segments(), ["network", "interfaces"]);
        assert_eq!(child.sub_path(), "network/interfaces");
    }
}
