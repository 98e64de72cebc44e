//! Index-based carousel over a non-empty list

/// Viewing state over `items`, always pointing at a valid index
#[derive(Debug, Clone, PartialEq)]
pub struct Carousel<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Carousel<T> {
    /// Start at the first item; `None` for an empty list
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items, index: 0 })
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> &T {
        &self.items[self.index]
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn can_prev(&self) -> bool {
        self.index > 0
    }

    pub fn can_next(&self) -> bool {
        self.index + 1 < self.items.len()
    }

    /// Move forward; returns whether the index changed
    pub fn next(&mut self) -> bool {
        if self.can_next() {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Move back; returns whether the index changed
    pub fn prev(&mut self) -> bool {
        if self.can_prev() {
            self.index -= 1;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_has_no_carousel() {
        assert!(Carousel::<u8>::new(Vec::new()).is_none());
    }

    #[test]
    fn test_prev_at_start_is_noop() {
        let mut c = Carousel::new(vec![1, 2, 3]).unwrap();
        assert!(!c.prev());
        assert_eq!(c.index(), 0);
    }

    #[test]
    fn test_next_at_end_is_noop() {
        let mut c = Carousel::new(vec![1, 2]).unwrap();
        assert!(c.next());
        assert!(!c.next());
        assert_eq!(c.index(), 1);
        assert_eq!(*c.current(), 2);
    }

    #[test]
    fn test_single_item_disables_both() {
        let c = Carousel::new(vec!["only"]).unwrap();
        assert!(!c.can_prev());
        assert!(!c.can_next());
    }

    #[test]
    fn test_walk_forward_and_back() {
        let mut c = Carousel::new(vec!['a', 'b', 'c']).unwrap();
        c.next();
        c.next();
        c.prev();
        assert_eq!(*c.current(), 'b');
        assert!(c.can_prev() && c.can_next());
    }
}
