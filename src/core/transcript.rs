//! The visible transcript: an ordered list of bubbles plus the two transient
//! singletons (typing indicator and loader) that sit at its tail.

use crate::core::message::{Bubble, BubbleId, Role};

pub const IMAGE_LOADER_LABEL: &str = "Generating image...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Bubble(Bubble),
    Typing,
    Loader(String),
}

/// Append-only bubble list. Bubbles are never removed individually; only
/// [`Transcript::clear`] empties the list. At most one typing indicator and
/// at most one loader exist at any time.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    entries: Vec<Entry>,
    next_id: u64,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn bubbles(&self) -> impl Iterator<Item = &Bubble> {
        self.entries.iter().filter_map(|entry| match entry {
            Entry::Bubble(bubble) => Some(bubble),
            _ => None,
        })
    }

    pub fn bubble_count(&self) -> usize {
        self.bubbles().count()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn append(&mut self, role: Role, content: impl Into<String>) -> BubbleId {
        let id = BubbleId::new(self.next_id);
        self.next_id += 1;
        self.entries
            .push(Entry::Bubble(Bubble::new(id, role, content)));
        id
    }

    pub fn append_error(&mut self, role: Role, content: impl Into<String>) -> BubbleId {
        let id = self.append(role, content);
        if let Some(bubble) = self.bubble_mut(id) {
            bubble.is_error = true;
        }
        id
    }

    pub fn bubble(&self, id: BubbleId) -> Option<&Bubble> {
        self.bubbles().find(|bubble| bubble.id == id)
    }

    fn bubble_mut(&mut self, id: BubbleId) -> Option<&mut Bubble> {
        self.entries.iter_mut().rev().find_map(|entry| match entry {
            Entry::Bubble(bubble) if bubble.id == id => Some(bubble),
            _ => None,
        })
    }

    pub fn find_last(&self, role: Role) -> Option<&Bubble> {
        self.bubbles().filter(|bubble| bubble.role == role).last()
    }

    /// Attach an image to an existing bubble. Returns false when the bubble
    /// is gone (e.g. the transcript was cleared in the meantime).
    pub fn attach_image(&mut self, id: BubbleId, url: impl Into<String>) -> bool {
        match self.bubble_mut(id) {
            Some(bubble) => {
                bubble.images.push(url.into());
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Show the typing indicator, replacing any existing one.
    pub fn show_typing(&mut self) {
        self.remove_typing();
        self.entries.push(Entry::Typing);
    }

    pub fn remove_typing(&mut self) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| !matches!(entry, Entry::Typing));
        self.entries.len() != before
    }

    pub fn has_typing(&self) -> bool {
        self.entries
            .iter()
            .any(|entry| matches!(entry, Entry::Typing))
    }

    /// Show the loader with `label`, replacing any existing one.
    pub fn show_loader(&mut self, label: impl Into<String>) {
        self.remove_loader();
        self.entries.push(Entry::Loader(label.into()));
    }

    pub fn remove_loader(&mut self) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !matches!(entry, Entry::Loader(_)));
        self.entries.len() != before
    }

    pub fn loader_label(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            Entry::Loader(label) => Some(label.as_str()),
            _ => None,
        })
    }
}
