use crate::classify::Lookup;
use crate::path::ImdsPath;
use std::collections::HashSet;
use tracing::debug;

/// Decides what to re-fetch after a path fails.
///
/// A failed fetch almost always means the parent was a value that got read as
/// a listing. The parent is demoted to a terminal lookup and fetched whole.
/// Every path can fail at most once before it is dropped, so retries are
/// bounded by the number of distinct paths.
#[derive(Debug, Default)]
pub struct RecoveryPolicy {
    failed: HashSet<ImdsPath>,
    demoted: HashSet<ImdsPath>,
}

impl RecoveryPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for `path` and returns the lookup to enqueue, if any.
    ///
    /// `None` when the path already failed once, when it is a namespace root,
    /// or when its parent is already queued for a terminal re-fetch.
    pub fn on_failure(&mut self, path: &ImdsPath) -> Option<Lookup> {
        if !self.failed.insert(path.clone()) {
            debug!(%path, "dropping path that failed twice");
            return None;
        }
        let parent = path.parent()?;
        if !self.demoted.insert(parent.clone()) {
            return None;
        }
        debug!(%path, %parent, "demoting parent to terminal");
        Some(Lookup::terminal(parent))
    }

    pub fn has_failed(&self, path: &ImdsPath) -> bool {
        self.failed.contains(path)
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path(raw: &str) -> ImdsPath {
        ImdsPath::parse(raw).unwrap()
    }

    #[test]
    fn first_failure_demotes_parent() {
        let mut policy = RecoveryPolicy::new();
        let lookup = policy.on_failure(&path("meta-data/public-keys/0=my-key"));
        assert_eq!(lookup, Some(Lookup::terminal(path("meta-data/public-keys"))));
        assert!(policy.has_failed(&path("meta-data/public-keys/0=my-key")));
    }

    #[test]
    fn second_failure_of_same_path_is_dropped() {
        let mut policy = RecoveryPolicy::new();
        let failing = path("meta-data/iam/info");
        assert!(policy.on_failure(&failing).is_some());
        assert_eq!(policy.on_failure(&failing), None);
        assert_eq!(policy.failed_count(), 1);
    }

    #[test]
    fn siblings_demote_a_parent_once() {
        let mut policy = RecoveryPolicy::new();
        assert!(policy.on_failure(&path("meta-data/tags/a")).is_some());
        assert_eq!(policy.on_failure(&path("meta-data/tags/b")), None);
    }

    #[test]
    fn namespace_root_has_nothing_to_demote() {
        let mut policy = RecoveryPolicy::new();
        assert_eq!(policy.on_failure(&path("dynamic")), None);
        assert!(policy.has_failed(&path("dynamic")));
    }
}
