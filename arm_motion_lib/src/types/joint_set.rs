use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{MotionError, MotionResult};

/// Ordered list of unique joint names.
///
/// The order defines the index alignment of every [`JointValues`](crate::JointValues)
/// built on top of it. Cloning is cheap, the names are shared.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct JointSet {
    names: Arc<[String]>,
}

impl JointSet {
    pub fn new<I, S>(names: I) -> MotionResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        for name in names {
            let name = name.into();
            if !seen.insert(name.clone()) {
                return Err(MotionError::DuplicateName(name));
            }
            collected.push(name);
        }
        Ok(Self {
            names: collected.into(),
        })
    }

    /// Parse a comma separated list such as `"joint1, joint2"`.
    pub fn parse(names: &str) -> MotionResult<Self> {
        Self::new(
            names
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty()),
        )
    }

    pub fn empty() -> Self {
        Self {
            names: Arc::from(Vec::new()),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn count(&self) -> usize {
        self.names.len()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn try_index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    pub fn index_of(&self, name: &str) -> MotionResult<usize> {
        self.try_index_of(name)
            .ok_or_else(|| MotionError::NameNotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.try_index_of(name).is_some()
    }

    pub fn add_prefix(&self, prefix: &str) -> Self {
        Self {
            names: self
                .names
                .iter()
                .map(|name| format!("{prefix}{name}"))
                .collect(),
        }
    }

    /// Every name of `self` is contained in `other`, order ignored.
    pub fn is_subset(&self, other: &JointSet) -> bool {
        self.iter().all(|name| other.contains(name))
    }

    pub fn is_superset(&self, other: &JointSet) -> bool {
        other.is_subset(self)
    }

    /// Same names, possibly in a different order.
    pub fn is_similar(&self, other: &JointSet) -> bool {
        self.count() == other.count() && self.is_subset(other)
    }

    /// Order preserving union: names of `self` first, then the names of
    /// `other` that are not yet present, in `other`'s order.
    pub fn union(&self, other: &JointSet) -> Self {
        self.union_all(std::iter::once(other))
    }

    pub fn union_all<'a, I>(&self, others: I) -> Self
    where
        I: IntoIterator<Item = &'a JointSet>,
    {
        let mut seen: HashSet<&str> = self.iter().collect();
        let mut names: Vec<String> = self.names.to_vec();
        for other in others {
            for name in other.iter() {
                if seen.insert(name) {
                    names.push(name.to_string());
                }
            }
        }
        Self {
            names: names.into(),
        }
    }
}

impl TryFrom<Vec<String>> for JointSet {
    type Error = MotionError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(names)
    }
}

impl From<JointSet> for Vec<String> {
    fn from(joint_set: JointSet) -> Self {
        joint_set.names.to_vec()
    }
}

impl<'a> IntoIterator for &'a JointSet {
    type Item = &'a str;
    type IntoIter = std::iter::Map<std::slice::Iter<'a, String>, fn(&String) -> &str>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter().map(String::as_str)
    }
}

impl fmt::Display for JointSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "JointSet[{}]", self.names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_comma_separated() {
        let joint_set = JointSet::parse("joint1, joint2 ,joint3").unwrap();
        assert_eq!(joint_set.names(), &["joint1", "joint2", "joint3"]);
        assert_eq!(joint_set.count(), 3);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = JointSet::new(["a", "b", "a"]).unwrap_err();
        assert_eq!(err, MotionError::DuplicateName("a".into()));
    }

    #[test]
    fn test_index_of() {
        let joint_set = JointSet::new(["a", "b"]).unwrap();
        assert_eq!(joint_set.index_of("b").unwrap(), 1);
        assert_eq!(joint_set.try_index_of("c"), None);
        assert_eq!(
            joint_set.index_of("c").unwrap_err(),
            MotionError::NameNotFound("c".into())
        );
    }

    #[test]
    fn test_union_keeps_first_operand_order() {
        let a = JointSet::new(["j2", "j1"]).unwrap();
        let b = JointSet::new(["j3", "j1", "j4"]).unwrap();
        let union = a.union(&b);
        assert_eq!(union.names(), &["j2", "j1", "j3", "j4"]);

        let c = JointSet::new(["j5", "j3"]).unwrap();
        let union_all = a.union_all([&b, &c]);
        assert_eq!(union_all.names(), &["j2", "j1", "j3", "j4", "j5"]);
    }

    #[test]
    fn test_subset_superset_similar() {
        let full = JointSet::parse("a,b,c").unwrap();
        let part = JointSet::parse("c,a").unwrap();
        let shuffled = JointSet::parse("c,b,a").unwrap();

        assert!(part.is_subset(&full));
        assert!(full.is_superset(&part));
        assert!(!part.is_similar(&full));
        assert!(shuffled.is_similar(&full));
        assert_ne!(shuffled, full);
    }

    #[test]
    fn test_add_prefix() {
        let joint_set = JointSet::parse("joint1, joint2").unwrap();
        let prefixed = joint_set.add_prefix("robot1_");
        assert_eq!(prefixed.names(), &["robot1_joint1", "robot1_joint2"]);
    }

    #[test]
    fn test_empty() {
        let joint_set = JointSet::empty();
        assert!(joint_set.is_empty());
        assert_eq!(JointSet::parse("").unwrap(), joint_set);
    }
}
