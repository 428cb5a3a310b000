use crate::{
    errors::CursorListError,
    key::NodeKey,
    node::Node,
    traits::{List, ListCursor},
};
use std::{collections::HashMap, fmt, iter::FusedIterator};

/// A singly linked sequence addressed through a movable cursor.
///
/// The chain always ends in an empty terminal node (`tail`), so the cursor
/// can sit one past the last element. Insertion and removal shift values
/// through the cursor node instead of relinking around it, because there is
/// no back link to the predecessor.
#[derive(Debug, Clone)]
pub struct CursorList<T> {
    nodes: HashMap<NodeKey, Node<T>>,
    next_key: usize,
    head: NodeKey,
    tail: NodeKey,
    cursor: NodeKey,
    len: usize,
}

/// Iterator over values in chain order.
pub struct Iter<'a, T> {
    list: &'a CursorList<T>,
    at: NodeKey,
    remaining: usize,
}

/// Node keys from head to tail, both inclusive.
struct Chain<'a, T> {
    nodes: &'a HashMap<NodeKey, Node<T>>,
    at: Option<NodeKey>,
}

impl<T> Default for CursorList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> CursorList<T> {
    /// Create an empty list: a single terminal node that is head, tail and
    /// cursor at once.
    pub fn new() -> Self {
        let key = NodeKey::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(key, Node::terminal());

        Self {
            nodes,
            next_key: 1,
            head: key,
            tail: key,
            cursor: key,
            len: 0,
        }
    }

    /// Number of elements (the terminal node is not counted).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Is the cursor past the last element?
    pub fn is_at_end(&self) -> bool {
        self.cursor == self.tail
    }

    /// Insert `item` at the cursor.
    ///
    /// The value currently under the cursor moves into a fresh node linked
    /// right after the cursor node, and `item` takes its place. The cursor
    /// keeps pointing at the same node, which now holds `item`. If the
    /// cursor was on the terminal node, the fresh node becomes the new tail.
    pub fn insert(&mut self, item: T) {
        let cursor = self.cursor;
        let (value, next) = {
            let node = self.node_mut(cursor);
            (node.value.take(), node.next.take())
        };
        let pushed = self.alloc(Node { value, next });

        let node = self.node_mut(cursor);
        node.value = Some(item);
        node.next = Some(pushed);

        if self.tail == cursor {
            self.tail = pushed;
        }
        self.len += 1;
    }

    /// Append `item` after the last element without moving the cursor.
    pub fn append(&mut self, item: T) {
        let fresh = self.alloc(Node::terminal());
        let old_tail = self.tail;

        let node = self.node_mut(old_tail);
        node.value = Some(item);
        node.next = Some(fresh);

        self.tail = fresh;
        self.len += 1;
    }

    /// Remove the element under the cursor and return it.
    ///
    /// Returns `None` and leaves the list untouched when the cursor is on the
    /// terminal node. Otherwise the following value is pulled forward into
    /// the cursor node and the node it came from is unlinked.
    pub fn remove(&mut self) -> Option<T> {
        if self.cursor == self.tail {
            return None;
        }

        let cursor = self.cursor;
        debug_assert!(self.nodes[&cursor].is_live());
        let next = self.nodes[&cursor]
            .next
            .expect("non-terminal node links forward");
        let pulled = self.nodes.remove(&next).expect("chained node exists");

        if next == self.tail {
            self.tail = cursor;
        }

        let node = self.node_mut(cursor);
        let item = std::mem::replace(&mut node.value, pulled.value);
        node.next = pulled.next;

        self.len -= 1;
        item
    }

    /// Drop every element and reset to a single terminal node.
    pub fn clear(&mut self) {
        let dropped = self.len;
        self.nodes.clear();

        let key = self.alloc(Node::terminal());
        self.head = key;
        self.tail = key;
        self.cursor = key;
        self.len = 0;

        tracing::trace!(dropped, head = key.as_raw(), "cleared cursor list");
    }

    pub fn move_to_start(&mut self) {
        self.cursor = self.head;
    }

    pub fn move_to_end(&mut self) {
        self.cursor = self.tail;
    }

    /// Move the cursor one step towards the start.
    ///
    /// Scans from the head for the node linking to the cursor, so this is
    /// O(n). Returns `false` if the cursor is already at the head.
    pub fn previous(&mut self) -> bool {
        if self.cursor == self.head {
            return false;
        }

        let cursor = self.cursor;
        let prev = self
            .chain()
            .find(|key| self.nodes[key].next == Some(cursor))
            .expect("cursor lies on the chain");
        self.cursor = prev;
        true
    }

    /// Move the cursor one step towards the end. Returns `false` if the
    /// cursor is already on the terminal node.
    pub fn next(&mut self) -> bool {
        if self.cursor == self.tail {
            return false;
        }

        self.cursor = self.nodes[&self.cursor]
            .next
            .expect("non-terminal node links forward");
        true
    }

    /// Zero-based cursor position; equals `len()` at the end. O(n).
    pub fn current_position(&self) -> usize {
        self.chain()
            .position(|key| key == self.cursor)
            .expect("cursor lies on the chain")
    }

    /// Place the cursor `position` links after the head.
    ///
    /// `position == len()` is valid and lands on the terminal node. Anything
    /// further is rejected and the cursor stays where it was.
    pub fn move_current_to_position(&mut self, position: usize) -> Result<(), CursorListError> {
        if position > self.len {
            tracing::debug!(position, len = self.len, "rejected cursor move");
            return Err(CursorListError::PositionOutOfRange {
                position,
                len: self.len,
            });
        }

        self.cursor = self
            .chain()
            .nth(position)
            .expect("chain holds len + 1 nodes");
        Ok(())
    }

    /// Value under the cursor, or `None` when the cursor is at the end.
    pub fn get_value(&self) -> Option<&T> {
        self.nodes[&self.cursor].value.as_ref()
    }

    pub fn get_value_mut(&mut self) -> Option<&mut T> {
        let cursor = self.cursor;
        self.node_mut(cursor).value.as_mut()
    }

    /// Position of the first element equal to `item`. The cursor is not
    /// moved.
    pub fn find_value_position(&self, item: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.iter().position(|value| value == item)
    }

    /// Iterate values from head to tail.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            at: self.head,
            remaining: self.len,
        }
    }

    fn chain(&self) -> Chain<'_, T> {
        Chain {
            nodes: &self.nodes,
            at: Some(self.head),
        }
    }

    fn alloc(&mut self, node: Node<T>) -> NodeKey {
        let key = NodeKey::new(self.next_key);
        self.next_key += 1;
        self.nodes.insert(key, node);
        key
    }

    fn node_mut(&mut self, key: NodeKey) -> &mut Node<T> {
        self.nodes.get_mut(&key).expect("chained node exists")
    }
}

impl<T> List<T> for CursorList<T> {
    fn insert(&mut self, item: T) {
        CursorList::insert(self, item)
    }

    fn append(&mut self, item: T) {
        CursorList::append(self, item)
    }

    fn remove(&mut self) -> Option<T> {
        CursorList::remove(self)
    }

    fn clear(&mut self) {
        CursorList::clear(self)
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl<T> ListCursor<T> for CursorList<T> {
    fn move_to_start(&mut self) {
        CursorList::move_to_start(self)
    }

    fn move_to_end(&mut self) {
        CursorList::move_to_end(self)
    }

    fn previous(&mut self) -> bool {
        CursorList::previous(self)
    }

    fn next(&mut self) -> bool {
        CursorList::next(self)
    }

    fn current_position(&self) -> usize {
        CursorList::current_position(self)
    }

    fn move_current_to_position(&mut self, position: usize) -> Result<(), CursorListError> {
        CursorList::move_current_to_position(self, position)
    }

    fn get_value(&self) -> Option<&T> {
        CursorList::get_value(self)
    }
}

/// Renders `< 1 2 3 4 | 5 6 >`, with the bar just before the element under
/// the cursor.
impl<T: fmt::Display> fmt::Display for CursorList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("< ")?;
        for key in self.chain() {
            if key == self.cursor {
                f.write_str("| ")?;
            }
            if let Some(value) = &self.nodes[&key].value {
                write!(f, "{value} ")?;
            }
        }
        f.write_str(">")
    }
}

impl<T> FromIterator<T> for CursorList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

impl<T> Extend<T> for CursorList<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.append(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a CursorList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let list = self.list;
        let node = &list.nodes[&self.at];
        if let Some(next) = node.next {
            self.at = next;
        }
        self.remaining -= 1;
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<T> Iterator for Chain<'_, T> {
    type Item = NodeKey;

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.at?;
        self.at = self.nodes[&key].next;
        Some(key)
    }
}

#[cfg(test)]
impl<T> CursorList<T> {
    /// Panics if head, tail, cursor and len disagree with the arena.
    fn assert_invariants(&self) {
        let chain: Vec<NodeKey> = self.chain().collect();

        assert_eq!(chain.len(), self.len + 1, "chain must hold len + 1 nodes");
        assert_eq!(chain.first().copied(), Some(self.head));
        assert_eq!(chain.last().copied(), Some(self.tail));
        assert!(chain.contains(&self.cursor), "cursor must lie on the chain");
        assert_eq!(self.nodes.len(), chain.len(), "unlinked nodes must be reclaimed");

        let terminal = &self.nodes[&self.tail];
        assert!(!terminal.is_live() && terminal.next.is_none());
        for key in &chain[..self.len] {
            assert!(self.nodes[key].is_live(), "only the tail may be empty");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values<T: Clone>(list: &CursorList<T>) -> Vec<T> {
        list.iter().cloned().collect()
    }

    #[test]
    fn basic_usage() {
        let mut list = CursorList::new();
        list.append(1);
        list.append(2);
        list.append(3);

        assert_eq!(list.len(), 3);
        assert_eq!(list.to_string(), "< | 1 2 3 >");

        list.move_to_end();
        assert!(list.previous());
        assert!(list.previous());
        assert_eq!(list.current_position(), 1);

        list.insert(99);
        assert_eq!(values(&list), vec![1, 99, 2, 3]);
        assert_eq!(list.len(), 4);
        assert_eq!(list.get_value(), Some(&99));

        assert_eq!(list.remove(), Some(99));
        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.len(), 3);
        list.assert_invariants();
    }

    #[test]
    fn empty_list_is_inert() {
        let mut list: CursorList<i32> = CursorList::new();

        assert_eq!(list.remove(), None);
        assert_eq!(list.len(), 0);
        assert!(list.is_empty());
        assert!(!list.next());
        assert!(!list.previous());
        assert_eq!(list.get_value(), None);
        assert_eq!(list.to_string(), "< | >");
        list.assert_invariants();
    }

    #[test]
    fn render_splits_at_cursor() {
        let mut list: CursorList<i32> = (1..=6).collect();
        list.move_current_to_position(4).unwrap();
        assert_eq!(list.to_string(), "< 1 2 3 4 | 5 6 >");

        list.move_to_end();
        assert_eq!(list.to_string(), "< 1 2 3 4 5 6 | >");
        assert_eq!(list.current_position(), 6);
    }

    #[test]
    fn append_leaves_cursor_alone() {
        let mut list = CursorList::new();
        list.append('a');
        assert_eq!(list.current_position(), 0);
        assert_eq!(list.get_value(), Some(&'a'));

        list.move_to_end();
        list.append('b');
        // the old terminal node now holds 'b', and the cursor still points at it
        assert_eq!(list.get_value(), Some(&'b'));
        assert_eq!(list.current_position(), 1);
        assert_eq!(list.find_value_position(&'b'), Some(list.len() - 1));
        list.assert_invariants();
    }

    #[test]
    fn walking_forward_reaches_the_terminal() {
        let mut list: CursorList<u8> = [4, 5, 6].into_iter().collect();
        list.move_to_start();
        for _ in 0..list.len() {
            assert!(list.next());
        }
        assert!(!list.next());
        assert!(list.is_at_end());
        assert_eq!(list.get_value(), None);
    }

    #[test]
    fn insert_at_end_moves_tail() {
        let mut list: CursorList<i32> = [1, 2].into_iter().collect();
        list.move_to_end();
        list.insert(3);

        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.get_value(), Some(&3));
        assert_eq!(list.current_position(), 2);
        assert!(list.next());
        assert!(list.is_at_end());
        list.assert_invariants();
    }

    #[test]
    fn insert_then_remove_restores_sequence() {
        let original = vec![10, 20, 30, 40];
        for p in 0..=original.len() {
            let mut list: CursorList<i32> = original.iter().copied().collect();
            list.move_current_to_position(p).unwrap();

            list.insert(-1);
            assert_eq!(list.remove(), Some(-1));
            assert_eq!(values(&list), original);
            assert_eq!(list.len(), original.len());
            assert_eq!(list.current_position(), p);
            list.assert_invariants();
        }
    }

    #[test]
    fn remove_last_retargets_tail() {
        let mut list: CursorList<i32> = [1, 2, 3].into_iter().collect();
        list.move_current_to_position(2).unwrap();

        assert_eq!(list.remove(), Some(3));
        assert!(list.is_at_end());
        assert_eq!(list.remove(), None);
        assert_eq!(values(&list), vec![1, 2]);
        list.assert_invariants();
    }

    #[test]
    fn remove_everything_from_the_front() {
        let mut list: CursorList<i32> = (0..5).collect();
        let mut drained = Vec::new();
        while let Some(v) = list.remove() {
            drained.push(v);
        }
        assert_eq!(drained, vec![0, 1, 2, 3, 4]);
        assert!(list.is_empty());
        list.assert_invariants();
    }

    #[test]
    fn position_round_trips() {
        let mut list: CursorList<i32> = (0..7).collect();
        for p in 0..=list.len() {
            list.move_current_to_position(p).unwrap();
            assert_eq!(list.current_position(), p);
        }
    }

    #[test]
    fn position_past_end_is_rejected() {
        let mut list: CursorList<i32> = (0..3).collect();
        list.move_current_to_position(1).unwrap();

        let err = list.move_current_to_position(4).unwrap_err();
        assert_eq!(
            err,
            CursorListError::PositionOutOfRange {
                position: 4,
                len: 3
            }
        );
        assert_eq!(list.current_position(), 1);

        list.move_current_to_position(3).unwrap();
        assert!(list.is_at_end());
    }

    #[test]
    fn find_does_not_move_cursor() {
        let mut list: CursorList<i32> = [5, 8, 3].into_iter().collect();
        list.move_current_to_position(2).unwrap();

        let before = list.current_position();
        assert_eq!(list.find_value_position(&8), Some(1));
        assert_eq!(list.find_value_position(&42), None);
        assert_eq!(list.current_position(), before);
    }

    #[test]
    fn find_returns_first_match() {
        let list: CursorList<&str> = ["x", "y", "x"].into_iter().collect();
        assert_eq!(list.find_value_position(&"x"), Some(0));
    }

    #[test]
    fn clear_resets_to_empty() {
        let mut list: CursorList<String> = ["a", "b"].into_iter().map(String::from).collect();
        list.move_to_end();
        list.clear();

        assert!(list.is_empty());
        assert_eq!(list.current_position(), 0);
        assert!(list.is_at_end());
        assert_eq!(list.to_string(), "< | >");
        list.assert_invariants();

        list.append("c".to_string());
        assert_eq!(list.to_string(), "< | c >");
    }

    #[test]
    fn previous_at_head_fails() {
        let mut list: CursorList<i32> = (1..=3).collect();
        assert!(!list.previous());
        assert!(list.next());
        assert!(list.previous());
        assert_eq!(list.current_position(), 0);
    }

    #[test]
    fn get_value_mut_edits_in_place() {
        let mut list: CursorList<i32> = (1..=3).collect();
        list.next();
        if let Some(v) = list.get_value_mut() {
            *v *= 10;
        }
        assert_eq!(values(&list), vec![1, 20, 3]);

        list.move_to_end();
        assert!(list.get_value_mut().is_none());
    }

    #[test]
    fn clone_keeps_cursor() {
        let mut list: CursorList<i32> = (1..=4).collect();
        list.move_current_to_position(3).unwrap();

        let mut copy = list.clone();
        assert_eq!(copy.to_string(), list.to_string());

        copy.remove();
        assert_eq!(copy.len(), 3);
        assert_eq!(list.len(), 4);
        copy.assert_invariants();
    }

    #[test]
    fn iter_is_exact() {
        let mut list: CursorList<i32> = (0..4).collect();
        list.move_current_to_position(2).unwrap();
        list.insert(100);

        let mut it = list.iter();
        assert_eq!(it.len(), 5);
        it.next();
        assert_eq!(it.size_hint(), (4, Some(4)));
        assert_eq!((&list).into_iter().copied().collect::<Vec<_>>(), vec![0, 1, 100, 2, 3]);
    }

    #[test]
    fn usable_through_traits() {
        fn fill<L: List<u32> + ListCursor<u32>>(list: &mut L) {
            list.append(1);
            list.append(3);
            assert!(list.next());
            list.insert(2);
            list.move_to_start();
        }

        let mut list = CursorList::new();
        fill(&mut list);
        assert_eq!(List::len(&list), 3);
        assert_eq!(ListCursor::get_value(&list), Some(&1));
        assert_eq!(list.to_string(), "< | 1 2 3 >");
        assert!(ListCursor::move_current_to_position(&mut list, 9).is_err());
    }
}

// proptest doesn't run under miri with default config
#[cfg(all(not(miri), test))]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i16),
        Append(i16),
        Remove,
        Clear,
        Start,
        End,
        Previous,
        Next,
        MoveTo(usize),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => any::<i16>().prop_map(Op::Insert),
            3 => any::<i16>().prop_map(Op::Append),
            2 => Just(Op::Remove),
            1 => Just(Op::Clear),
            1 => Just(Op::Start),
            1 => Just(Op::End),
            2 => Just(Op::Previous),
            2 => Just(Op::Next),
            2 => (0usize..24).prop_map(Op::MoveTo),
        ]
    }

    /// Plain vector plus cursor index that the list must agree with.
    #[derive(Default)]
    struct Model {
        items: Vec<i16>,
        at: usize,
    }

    proptest! {
        #[test]
        fn matches_vec_model(ops in proptest::collection::vec(op(), 1..200)) {
            let mut list = CursorList::new();
            let mut model = Model::default();

            for op in &ops {
                match *op {
                    Op::Insert(v) => {
                        list.insert(v);
                        model.items.insert(model.at, v);
                    }
                    Op::Append(v) => {
                        list.append(v);
                        model.items.push(v);
                    }
                    Op::Remove => {
                        let expected = (model.at < model.items.len())
                            .then(|| model.items.remove(model.at));
                        prop_assert_eq!(list.remove(), expected);
                    }
                    Op::Clear => {
                        list.clear();
                        model = Model::default();
                    }
                    Op::Start => {
                        list.move_to_start();
                        model.at = 0;
                    }
                    Op::End => {
                        list.move_to_end();
                        model.at = model.items.len();
                    }
                    Op::Previous => {
                        let moved = model.at > 0;
                        if moved {
                            model.at -= 1;
                        }
                        prop_assert_eq!(list.previous(), moved);
                    }
                    Op::Next => {
                        let moved = model.at < model.items.len();
                        if moved {
                            model.at += 1;
                        }
                        prop_assert_eq!(list.next(), moved);
                    }
                    Op::MoveTo(p) => {
                        let ok = p <= model.items.len();
                        if ok {
                            model.at = p;
                        }
                        prop_assert_eq!(list.move_current_to_position(p).is_ok(), ok);
                    }
                }

                list.assert_invariants();
                prop_assert_eq!(list.len(), model.items.len());
                prop_assert_eq!(list.current_position(), model.at);
                prop_assert_eq!(list.get_value(), model.items.get(model.at));
                prop_assert_eq!(list.iter().copied().collect::<Vec<_>>(), model.items.clone());
            }
        }

        #[test]
        fn append_lands_last(items in proptest::collection::vec(any::<u8>(), 0..32), x in any::<u8>()) {
            let mut list: CursorList<u8> = items.iter().copied().filter(|v| *v != x).collect();
            let before = list.len();
            list.append(x);

            prop_assert_eq!(list.len(), before + 1);
            prop_assert_eq!(list.find_value_position(&x), Some(before));
            prop_assert_eq!(list.current_position(), 0);
        }
    }
}
