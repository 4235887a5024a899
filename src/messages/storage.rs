use super::types::ChatTurn;
use parking_lot::RwLock;
use std::sync::Arc;

/// The caller's chat history. The session core never reads it.
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Arc<RwLock<Vec<ChatTurn>>>,
}

impl Transcript {
    pub fn new() -> Self {
        Self {
            turns: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn add(&self, turn: ChatTurn) {
        self.turns.write().push(turn);
    }

    pub fn get_all(&self) -> Vec<ChatTurn> {
        self.turns.read().clone()
    }

    pub fn clear(&self) {
        self.turns.write().clear();
    }

    pub fn len(&self) -> usize {
        self.turns.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.read().is_empty()
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Speaker;

    #[test]
    fn test_add_keeps_order() {
        let transcript = Transcript::new();
        transcript.add(ChatTurn::user("hi"));
        transcript.add(ChatTurn::new(Speaker::Agent, "Hello there"));
        transcript.add(ChatTurn::user("wave").with_speech(true));

        assert_eq!(transcript.len(), 3);
        let turns = transcript.get_all();
        assert_eq!(turns[1].text, "Hello there");
        assert_eq!(turns[1].speaker, Speaker::Agent);
        assert!(turns[2].is_speech);
    }

    #[test]
    fn test_clones_share_history() {
        let transcript = Transcript::new();
        let view = transcript.clone();
        transcript.add(ChatTurn::user("hi"));
        assert_eq!(view.len(), 1);
        view.clear();
        assert!(transcript.is_empty());
    }
}
