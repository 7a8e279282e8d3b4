//! Teacher allow-list.

use std::collections::HashSet;

/// Identities allowed to author courses.
///
/// Built once from configuration at startup and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct TeacherAllowList {
    ids: HashSet<String>,
}

impl TeacherAllowList {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids
                .into_iter()
                .map(Into::into)
                .filter(|id: &String| !id.is_empty())
                .collect(),
        }
    }

    pub fn is_teacher(&self, identity: &str) -> bool {
        self.ids.contains(identity)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_are_teachers() {
        let list = TeacherAllowList::new(["user_1", "user_2"]);
        assert!(list.is_teacher("user_1"));
        assert!(list.is_teacher("user_2"));
        assert!(!list.is_teacher("user_3"));
    }

    #[test]
    fn match_is_exact() {
        let list = TeacherAllowList::new(["user_1"]);
        assert!(!list.is_teacher("USER_1"));
        assert!(!list.is_teacher("user_1 "));
        assert!(!list.is_teacher(""));
    }

    #[test]
    fn empty_ids_are_dropped() {
        let list = TeacherAllowList::new(["", "user_1"]);
        assert_eq!(list.len(), 1);
        assert!(TeacherAllowList::default().is_empty());
    }
}
