use crate::errors::CursorListError;

/// Mutation surface of a cursor-addressed sequence.
///
/// Position-relative operations act on whatever element the cursor
/// currently addresses; see [`ListCursor`] for moving it.
pub trait List<T> {
    /// Insert `item` at the cursor, shifting the addressed element one step
    /// towards the end. The cursor then addresses `item`.
    fn insert(&mut self, item: T);

    /// Add `item` after the last element. Does not move the cursor.
    fn append(&mut self, item: T);

    /// Remove and return the element at the cursor, or `None` when the
    /// cursor sits past the last element.
    fn remove(&mut self) -> Option<T>;

    fn clear(&mut self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cursor movement over a sequence. Positions run from `0` (first
/// element) to `len` (one past the last element).
pub trait ListCursor<T> {
    fn move_to_start(&mut self);

    fn move_to_end(&mut self);

    /// Step one element towards the start. Returns `false` if already there.
    fn previous(&mut self) -> bool;

    /// Step one element towards the end. Returns `false` if already there.
    fn next(&mut self) -> bool;

    fn current_position(&self) -> usize;

    fn move_current_to_position(&mut self, position: usize) -> Result<(), CursorListError>;

    /// Element under the cursor, `None` at the end.
    fn get_value(&self) -> Option<&T>;
}
