//! A per-session, bounded conversation log. Not safe for concurrent writers — an
//! individual `History` belongs to one logical conversation.

use std::collections::VecDeque;

use super::message::Message;

/// An ordered sequence of [`Message`]s with an optional maximum size. `max_size ==
/// 0` means unlimited. When bounded and an append would exceed the limit, the
/// oldest messages are evicted first.
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: VecDeque<Message>,
    max_size: usize,
}

impl History {
    pub fn new(max_size: usize) -> Self {
        History {
            messages: VecDeque::new(),
            max_size,
        }
    }

    pub fn unbounded() -> Self {
        History::new(0)
    }

    /// O(1) amortized; eviction of `k` oldest messages is O(k).
    pub fn append(&mut self, message: Message) {
        self.messages.push_back(message);
        if self.max_size > 0 {
            while self.messages.len() > self.max_size {
                self.messages.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.iter()
    }

    /// The last `n` messages, in append order. `n <= 0` returns an empty view.
    pub fn get_last(&self, n: i64) -> Vec<Message> {
        if n <= 0 {
            return Vec::new();
        }
        let n = n as usize;
        let skip = self.messages.len().saturating_sub(n);
        self.messages.iter().skip(skip).cloned().collect()
    }
}
