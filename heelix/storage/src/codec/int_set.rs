use std::collections::HashSet;

/// A set of integer ids that remembers first-insertion order.
///
/// Used to collapse the repeated entity references a legacy document may
/// carry before its links are re-serialised.
#[derive(Debug, Clone, Default)]
pub struct IntSet {
    seen: HashSet<i64>,
    order: Vec<i64>,
}

impl IntSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value`, returning `false` if it was already present.
    pub fn put(&mut self, value: i64) -> bool {
        if !self.seen.insert(value) {
            return false;
        }
        self.order.push(value);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.order.iter().copied()
    }
}

impl FromIterator<i64> for IntSet {
    fn from_iter<I: IntoIterator<Item = i64>>(iter: I) -> Self {
        let mut set = IntSet::new();
        for value in iter {
            set.put(value);
        }
        set
    }
}

impl From<IntSet> for Vec<i64> {
    fn from(set: IntSet) -> Self {
        set.order
    }
}
