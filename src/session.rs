//! Conversation history for one agent.

/// One completed exchange. Immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    query: String,
    response: String,
}

impl ConversationTurn {
    pub fn new(query: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            response: response.into(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn response(&self) -> &str {
        &self.response
    }
}

/// Ordered turns of a single conversation.
///
/// Storage is unbounded; callers read only the tail through `recent_window`.
#[derive(Debug, Clone, Default)]
pub struct ConversationSession {
    turns: Vec<ConversationTurn>,
}

impl ConversationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed exchange.
    pub fn record(&mut self, query: impl Into<String>, response: impl Into<String>) {
        self.turns.push(ConversationTurn::new(query, response));
    }

    /// The last `n` turns, oldest first.
    pub fn recent_window(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_appends_in_order() {
        let mut session = ConversationSession::new();
        assert!(session.is_empty());

        session.record("q1", "r1");
        session.record("q2", "r2");

        assert_eq!(session.len(), 2);
        assert_eq!(session.turns()[0].query(), "q1");
        assert_eq!(session.turns()[1].response(), "r2");
    }

    #[test]
    fn test_recent_window() {
        let mut session = ConversationSession::new();
        for i in 0..7 {
            session.record(format!("q{i}"), format!("r{i}"));
        }

        let window = session.recent_window(5);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0].query(), "q2");
        assert_eq!(window[4].query(), "q6");

        // Storage itself is never truncated
        assert_eq!(session.len(), 7);
        assert_eq!(session.recent_window(100).len(), 7);
        assert!(session.recent_window(0).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut session = ConversationSession::new();
        session.record("q", "r");
        session.clear();
        assert!(session.is_empty());
        assert!(session.recent_window(5).is_empty());
    }
}
