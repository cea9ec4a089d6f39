/// Who wrote a bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn is_user(self) -> bool {
        self == Role::User
    }

    pub fn is_assistant(self) -> bool {
        self == Role::Assistant
    }
}

/// Stable handle to a bubble. Ids are never reused within a transcript, even
/// across a clear, so a stale handle can never address a newer bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BubbleId(u64);

impl BubbleId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

/// One rendered chat message in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bubble {
    pub id: BubbleId,
    pub role: Role,
    pub content: String,
    /// Image URLs attached after the text, in arrival order.
    pub images: Vec<String>,
    pub is_error: bool,
}

impl Bubble {
    pub(crate) fn new(id: BubbleId, role: Role, content: impl Into<String>) -> Self {
        Self {
            id,
            role,
            content: content.into(),
            images: Vec::new(),
            is_error: false,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role.is_user()
    }

    pub fn is_assistant(&self) -> bool {
        self.role.is_assistant()
    }

    pub fn has_images(&self) -> bool {
        !self.images.is_empty()
    }
}
