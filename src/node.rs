use crate::key::NodeKey;

#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: Option<T>,
    pub(crate) next: Option<NodeKey>,
}

impl<T> Node<T> {
    /// The empty, link-less node that terminates every chain.
    pub(crate) fn terminal() -> Self {
        Self {
            value: None,
            next: None,
        }
    }

    /// Does this node carry a real element (i.e. it is not the terminal)?
    pub(crate) fn is_live(&self) -> bool {
        self.value.is_some()
    }
}
