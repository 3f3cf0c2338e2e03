//! A parsed, read-only session: header metadata plus the ordered command log.

use crate::commands::Command;

/// Metadata a capture-format parser extracts from a session's header.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionHeader {
    /// Canvas width over height, fixed for the whole session.
    pub aspect_ratio: f32,
    pub title: Option<String>,
}
impl Default for SessionHeader {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            title: None,
        }
    }
}

/// The command log is fixed at construction. Commands are ordered by index and never mutated.
#[derive(Clone, Debug)]
pub struct Session {
    header: SessionHeader,
    commands: std::sync::Arc<[Command]>,
}
impl Session {
    #[must_use]
    pub fn new(header: SessionHeader, commands: impl Into<std::sync::Arc<[Command]>>) -> Self {
        Self {
            header,
            commands: commands.into(),
        }
    }
    #[must_use]
    pub fn header(&self) -> &SessionHeader {
        &self.header
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Command> {
        self.commands.get(index)
    }
    /// Every command, in log order.
    pub fn iter(&self) -> impl Iterator<Item = &Command> + '_ {
        self.commands.iter()
    }
    /// Commands in the inclusive range `[start, end]`, clamped to the log.
    pub fn range(&self, start: usize, end: usize) -> impl Iterator<Item = (usize, &Command)> + '_ {
        let end = end.min(self.len().saturating_sub(1));
        self.commands
            .iter()
            .enumerate()
            .skip(start)
            .take((end + 1).saturating_sub(start))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn range_is_inclusive_and_clamped() {
        let session = Session::new(
            SessionHeader::default(),
            vec![Command::draw_end(); 4],
        );
        let indices: Vec<_> = session.range(1, 2).map(|(idx, _)| idx).collect();
        assert_eq!(indices, [1, 2]);
        let indices: Vec<_> = session.range(2, 100).map(|(idx, _)| idx).collect();
        assert_eq!(indices, [2, 3]);
        assert_eq!(session.range(3, 1).count(), 0);
    }
    #[test]
    fn empty_range() {
        let session = Session::new(SessionHeader::default(), Vec::new());
        assert!(session.is_empty());
        assert_eq!(session.range(0, 0).count(), 0);
        assert_eq!(session.iter().count(), 0);
    }
    #[test]
    fn iter_follows_log_order() {
        let commands = vec![
            Command::draw(0.5, 0.5, 1.0),
            Command::unknown(7),
            Command::draw_end(),
        ];
        let session = Session::new(SessionHeader::default(), commands.clone());
        assert!(session.iter().eq(commands.iter()));
        assert_eq!(session.iter().nth(1), session.get(1));
    }
}
