//! Minimal add/remove delta between an entry's stored and submitted tag sets.
//!
//! # Invariants
//! - `added` and `removed` are disjoint; names present in both sets are never
//!   touched.
//! - Applying the delta leaves the entry's tag set equal to the submitted set.

use crate::model::entry::EntryId;
use crate::repo::tag_repo::TagRepository;
use crate::repo::RepoResult;
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagDelta {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl TagDelta {
    /// Computes `new - old` as additions and `old - new` as removals.
    pub fn between(old: &BTreeSet<String>, new: &BTreeSet<String>) -> Self {
        Self {
            added: new.difference(old).cloned().collect(),
            removed: old.difference(new).cloned().collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Issues one add per added name and one remove per removed name.
pub fn apply_tag_delta<R: TagRepository + ?Sized>(
    repo: &R,
    entry_id: EntryId,
    delta: &TagDelta,
) -> RepoResult<()> {
    for name in &delta.removed {
        repo.remove_entry_tag(entry_id, name)?;
    }
    for name in &delta.added {
        repo.add_entry_tag(entry_id, name)?;
    }
    Ok(())
}

/// Loads the entry's current tags and brings them in line with `submitted`.
pub fn reconcile_entry_tags<R: TagRepository + ?Sized>(
    repo: &R,
    entry_id: EntryId,
    submitted: &BTreeSet<String>,
) -> RepoResult<TagDelta> {
    let current = repo.tags_of_entry(entry_id)?;
    let delta = TagDelta::between(&current, submitted);
    apply_tag_delta(repo, entry_id, &delta)?;
    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::{apply_tag_delta, reconcile_entry_tags, TagDelta};
    use crate::model::entry::EntryId;
    use crate::model::tag::{parse_tag_field, Tag, TagId};
    use crate::repo::tag_repo::TagRepository;
    use crate::repo::RepoResult;
    use std::cell::RefCell;
    use std::collections::BTreeSet;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Add(String),
        Remove(String),
    }

    #[derive(Default)]
    struct RecordingTags {
        attached: RefCell<BTreeSet<String>>,
        calls: RefCell<Vec<Call>>,
    }

    impl RecordingTags {
        fn with(names: &[&str]) -> Self {
            let repo = Self::default();
            repo.attached
                .borrow_mut()
                .extend(names.iter().map(|name| name.to_string()));
            repo
        }
    }

    impl TagRepository for RecordingTags {
        fn list_tags(&self) -> RepoResult<Vec<Tag>> {
            unreachable!("not used by reconciliation")
        }
        fn get_tag(&self, _id: TagId) -> RepoResult<Tag> {
            unreachable!("not used by reconciliation")
        }
        fn create_tag(&self, _name: &str) -> RepoResult<()> {
            unreachable!("not used by reconciliation")
        }
        fn update_tag(&self, _id: TagId, _name: &str) -> RepoResult<()> {
            unreachable!("not used by reconciliation")
        }
        fn delete_tag(&self, _id: TagId) -> RepoResult<()> {
            unreachable!("not used by reconciliation")
        }
        fn tags_of_entry(&self, _entry_id: EntryId) -> RepoResult<BTreeSet<String>> {
            Ok(self.attached.borrow().clone())
        }
        fn add_entry_tag(&self, _entry_id: EntryId, tag_name: &str) -> RepoResult<()> {
            self.calls.borrow_mut().push(Call::Add(tag_name.to_string()));
            self.attached.borrow_mut().insert(tag_name.to_string());
            Ok(())
        }
        fn remove_entry_tag(&self, _entry_id: EntryId, tag_name: &str) -> RepoResult<()> {
            self.calls
                .borrow_mut()
                .push(Call::Remove(tag_name.to_string()));
            self.attached.borrow_mut().remove(tag_name);
            Ok(())
        }
    }

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn delta_is_set_difference_both_ways() {
        let delta = TagDelta::between(&set(&["a", "b"]), &set(&["b", "c"]));
        assert_eq!(delta.added, set(&["c"]));
        assert_eq!(delta.removed, set(&["a"]));
    }

    #[test]
    fn identical_sets_yield_empty_delta() {
        let delta = TagDelta::between(&set(&["a"]), &set(&["a"]));
        assert!(delta.is_empty());
    }

    #[test]
    fn comparison_is_case_sensitive() {
        let delta = TagDelta::between(&set(&["Rust"]), &set(&["rust"]));
        assert_eq!(delta.added, set(&["rust"]));
        assert_eq!(delta.removed, set(&["Rust"]));
    }

    #[test]
    fn reconcile_touches_only_changed_names() {
        let repo = RecordingTags::with(&["a", "b"]);
        let delta = reconcile_entry_tags(&repo, 7, &parse_tag_field(" b , c ")).unwrap();

        assert_eq!(delta.added, set(&["c"]));
        assert_eq!(delta.removed, set(&["a"]));
        assert_eq!(*repo.attached.borrow(), set(&["b", "c"]));

        let calls = repo.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert!(calls.contains(&Call::Remove("a".to_string())));
        assert!(calls.contains(&Call::Add("c".to_string())));
        assert!(!calls
            .iter()
            .any(|call| matches!(call, Call::Add(name) | Call::Remove(name) if name == "b")));
    }

    #[test]
    fn empty_delta_issues_no_calls() {
        let repo = RecordingTags::with(&["x"]);
        apply_tag_delta(&repo, 1, &TagDelta::default()).unwrap();
        assert!(repo.calls.borrow().is_empty());
    }
}
