//! Directory-versus-value detection for metadata responses.
//!
//! The service never says whether a path is a directory. A body is a value
//! when it parses as a JSON document or when the crawler expected a value
//! there; otherwise it is read as a listing. A wrong guess only surfaces later,
//! as a failed fetch of a child that does not exist.

use crate::node::LeafValue;
use crate::path::ImdsPath;
use crate::path::Namespace;

/// Leaves holding signatures and certificates. Stored byte-for-byte.
pub const OPAQUE_BLOB_NAMES: [&str; 3] = ["pkcs7", "signature", "rsa2048"];

/// The crawler's guess about a path before it is fetched.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LookupHint {
    /// Listed with a trailing `/`, or a namespace root.
    Directory,
    /// Listed without a trailing `/`, or demoted after a failed expansion.
    Terminal,
    /// Supplied by the caller. Treated like `Directory` unless the body is
    /// JSON.
    Unknown,
}

/// A pending fetch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Lookup {
    pub path: ImdsPath,
    pub hint: LookupHint,
}

impl Lookup {
    pub fn new(path: ImdsPath, hint: LookupHint) -> Self {
        Self { path, hint }
    }

    pub fn directory(path: ImdsPath) -> Self {
        Self::new(path, LookupHint::Directory)
    }

    pub fn terminal(path: ImdsPath) -> Self {
        Self::new(path, LookupHint::Terminal)
    }
}

/// Outcome of looking at one fetched path.
#[derive(Clone, Debug, PartialEq)]
pub enum Classification {
    /// Expand: these children still need fetching.
    Directory(Vec<Lookup>),
    /// Store this value and stop.
    Terminal(LeafValue),
    /// The fetch failed, so the shape is still unknown. The parent is the one
    /// that gets re-fetched.
    Unknown,
}

/// Classifies a successfully fetched body for `lookup`.
pub fn classify(lookup: &Lookup, body: &[u8]) -> Classification {
    let text = String::from_utf8_lossy(body);
    if lookup.path.namespace() == Namespace::UserData {
        return Classification::Terminal(LeafValue::Scalar(text.into_owned()));
    }
    let json = parse_json(body);
    let terminal = json.is_some() || lookup.hint == LookupHint::Terminal;
    if terminal {
        Classification::Terminal(materialize_leaf(lookup.path.name(), &text, json))
    } else {
        Classification::Directory(listing_children(&lookup.path, &text))
    }
}

/// Picks the leaf representation for a value named `name`.
///
/// Any name ending in `s` is stored as a list, even a single-line one. That
/// matches how the service names plural keys (`security-groups`,
/// `local-ipv4s`) but also catches the odd singular key.
pub fn materialize_leaf(name: &str, text: &str, json: Option<serde_json::Value>) -> LeafValue {
    if OPAQUE_BLOB_NAMES.contains(&name) {
        return LeafValue::Scalar(text.to_string());
    }
    if let Some(value) = json {
        return LeafValue::Json(value);
    }
    let lines = non_empty_lines(text).map(str::to_string).collect::<Vec<_>>();
    if lines.len() > 1 || name.ends_with('s') {
        LeafValue::List(lines)
    } else {
        LeafValue::Scalar(text.trim().to_string())
    }
}

/// Children named by a directory listing. Entries ending in `/` are
/// sub-directories; everything else is expected to be a value.
pub fn listing_children(parent: &ImdsPath, text: &str) -> Vec<Lookup> {
    non_empty_lines(text)
        .map(|line| {
            let hint = if line.ends_with('/') {
                LookupHint::Directory
            } else {
                LookupHint::Terminal
            };
            Lookup::new(parent.join(line.trim_end_matches('/')), hint)
        })
        .filter(|lookup| lookup.path != *parent)
        .collect()
}

/// Parses `body` when it is a JSON object or array. Bare strings and numbers
/// do not count.
pub fn parse_json(body: &[u8]) -> Option<serde_json::Value> {
    match serde_json::from_slice::<serde_json::Value>(body) {
        Ok(value @ (serde_json::Value::Object(_) | serde_json::Value::Array(_))) => Some(value),
        _ => None,
    }
}

/// Best guess from the body alone: several lines, or any entry with a
/// trailing `/`, look like a listing.
pub fn is_directory(body: &[u8]) -> bool {
    if parse_json(body).is_some() {
        return false;
    }
    let text = String::from_utf8_lossy(body);
    let mut count = 0usize;
    for line in non_empty_lines(&text) {
        if line.ends_with('/') {
            return true;
        }
        count += 1;
    }
    count > 1
}

fn non_empty_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}
