use crate::domain::Song;
use std::collections::VecDeque;

/// Single source of truth for "what plays next".
///
/// Pending songs live in FIFO order; everything that ever plays goes through
/// `pop_next_song`, which records it in the history first. History is
/// chronological play order, most recent last, and only shrinks on an
/// explicit `clear_history`.
#[derive(Default)]
pub struct PlayQueue {
    pending: VecDeque<Song>,
    history: Vec<Song>,
}

impl PlayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_song(&mut self, song: Song) {
        self.pending.push_back(song);
    }

    pub fn add_songs(&mut self, songs: impl IntoIterator<Item = Song>) {
        self.pending.extend(songs);
    }

    /// Replace the pending queue wholesale. History is untouched.
    pub fn set_queue(&mut self, songs: Vec<Song>) {
        self.pending = songs.into();
    }

    pub fn pop_next_song(&mut self) -> Option<Song> {
        let song = self.pending.pop_front()?;
        self.history.push(song.clone());
        Some(song)
    }

    pub fn peek_next_song(&self) -> Option<&Song> {
        self.pending.front()
    }

    /// Move a pending song to the head. No-op when it isn't queued.
    pub fn prioritize_song(&mut self, song: &Song) {
        if let Some(pos) = self.pending.iter().position(|s| s.id == song.id) {
            if let Some(found) = self.pending.remove(pos) {
                self.pending.push_front(found);
            }
        }
    }

    /// Swap a pending entry for a richer copy of itself (same id). Used
    /// when background resolution finishes for a song already in line.
    pub fn replace_song(&mut self, song: Song) -> bool {
        match self.pending.iter_mut().find(|s| s.id == song.id) {
            Some(slot) => {
                *slot = song;
                true
            }
            None => false,
        }
    }

    /// Pull the most recently played song back to the head of the queue.
    pub fn undo_last(&mut self) -> bool {
        match self.history.pop() {
            Some(song) => {
                self.pending.push_front(song);
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn last_played(&self) -> Option<&Song> {
        self.history.last()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Song> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn song(id: u64, title: &str) -> Song {
        Song {
            id,
            title: title.to_string(),
            is_ready: true,
            ..Default::default()
        }
    }

    #[test]
    fn pop_on_empty_leaves_history_alone() {
        let mut queue = PlayQueue::new();
        assert!(queue.pop_next_song().is_none());
        assert_eq!(queue.history_len(), 0);
    }

    #[test]
    fn pop_moves_head_to_history() {
        let mut queue = PlayQueue::new();
        queue.add_songs([song(1, "a"), song(2, "b")]);

        let popped = queue.pop_next_song().unwrap();
        assert_eq!(popped.id, 1);
        assert_eq!(queue.last_played().unwrap().id, 1);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn undo_then_pop_round_trips() {
        let mut queue = PlayQueue::new();
        queue.add_songs([song(1, "a"), song(2, "b")]);

        let played = queue.pop_next_song().unwrap();
        assert!(queue.undo_last());
        let again = queue.pop_next_song().unwrap();
        assert_eq!(played.id, again.id);
    }

    #[test]
    fn prioritize_keeps_every_entry() {
        let mut queue = PlayQueue::new();
        queue.add_songs([song(1, "a"), song(2, "b"), song(3, "c"), song(4, "d")]);

        queue.prioritize_song(&song(3, "c"));

        let order: Vec<u64> = queue.pending().map(|s| s.id).collect();
        assert_eq!(order, vec![3, 1, 2, 4]);
    }

    #[test]
    fn prioritize_missing_song_is_a_noop() {
        let mut queue = PlayQueue::new();
        queue.add_songs([song(1, "a"), song(2, "b")]);

        queue.prioritize_song(&song(99, "ghost"));

        let order: Vec<u64> = queue.pending().map(|s| s.id).collect();
        assert_eq!(order, vec![1, 2]);
    }

    #[test]
    fn clear_spares_history() {
        let mut queue = PlayQueue::new();
        queue.add_songs([song(1, "a"), song(2, "b")]);
        queue.pop_next_song();

        queue.clear();
        assert!(queue.is_empty());
        assert_eq!(queue.history_len(), 1);
    }

    #[test]
    fn pop_undo_prioritize_scenario() {
        let mut queue = PlayQueue::new();
        let a = song(1, "A");
        let b = song(2, "B");
        queue.add_songs([a.clone(), b.clone()]);

        let popped = queue.pop_next_song().unwrap();
        assert_eq!(popped.id, a.id);
        assert_eq!(queue.history_len(), 1);
        assert_eq!(queue.len(), 1);

        assert!(queue.undo_last());
        assert_eq!(queue.history_len(), 0);
        let order: Vec<u64> = queue.pending().map(|s| s.id).collect();
        assert_eq!(order, vec![a.id, b.id]);

        queue.prioritize_song(&b);
        let order: Vec<u64> = queue.pending().map(|s| s.id).collect();
        assert_eq!(order, vec![b.id, a.id]);
    }
}
