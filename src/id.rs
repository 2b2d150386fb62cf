use std::fmt;

/// Identifies a GPU texture owned by the [`TextureManager`](crate::TextureManager).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub u64);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hands out texture ids in allocation order, starting at 1.
#[derive(Debug)]
pub(crate) struct TextureIdAllocator {
    next: u64,
}

impl TextureIdAllocator {
    pub(crate) fn new() -> Self {
        Self { next: 1 }
    }

    pub(crate) fn allocate(&mut self) -> TextureId {
        let id = TextureId(self.next);
        self.next += 1;
        id
    }
}

/// Handle to a render object inside the [`SceneGraph`](crate::scene::SceneGraph) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}
