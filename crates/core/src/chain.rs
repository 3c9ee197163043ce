//! Persistent append-only list shared between context copies.
//!
//! Pushing allocates one link; cloning bumps a reference count. Sibling
//! branches forked from the same context share every link they have in
//! common.

use std::sync::Arc;

struct Link<T> {
    value: T,
    next: Option<Arc<Link<T>>>,
}

pub(crate) struct Chain<T> {
    head: Option<Arc<Link<T>>>,
    len: usize,
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Chain { head: None, len: 0 }
    }

    pub fn push(&mut self, value: T) {
        let next = self.head.take();
        self.head = Some(Arc::new(Link { value, next }));
        self.len += 1;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Most recently pushed value.
    pub fn last(&self) -> Option<&T> {
        self.head.as_deref().map(|link| &link.value)
    }

    /// Newest first.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Oldest first.
    pub fn to_vec(&self) -> Vec<&T> {
        let mut values: Vec<&T> = self.iter().collect();
        values.reverse();
        values
    }
}

impl<T> Clone for Chain<T> {
    fn clone(&self) -> Self {
        Chain {
            head: self.head.clone(),
            len: self.len,
        }
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Chain::new()
    }
}

pub(crate) struct Iter<'a, T> {
    next: Option<&'a Link<T>>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let link = self.next?;
        self.next = link.next.as_deref();
        Some(&link.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_prefix_but_diverge() {
        let mut base = Chain::new();
        base.push(1);
        base.push(2);

        let mut left = base.clone();
        let mut right = base.clone();
        left.push(3);
        right.push(4);

        assert_eq!(left.to_vec(), vec![&1, &2, &3]);
        assert_eq!(right.to_vec(), vec![&1, &2, &4]);
        assert_eq!(base.len(), 2);
        assert_eq!(base.last(), Some(&2));
    }

    #[test]
    fn iter_is_newest_first() {
        let mut chain = Chain::new();
        for n in 0..4 {
            chain.push(n);
        }
        assert_eq!(chain.iter().copied().collect::<Vec<_>>(), vec![3, 2, 1, 0]);
    }
}
