/// Identity of a node in the list's arena.
///
/// Keys are never reused while the list is alive, so comparing two keys
/// compares node identity, not position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeKey(usize);

impl NodeKey {
    pub(crate) fn new(raw: usize) -> Self {
        Self(raw)
    }

    /// Raw numeric identifier, for tracing output.
    pub(crate) fn as_raw(self) -> usize {
        self.0
    }
}
