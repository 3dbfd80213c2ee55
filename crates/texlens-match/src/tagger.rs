//! Stateful adapter between host notifications and [`recompute`].
//!
//! The host reports caret moves and layout changes; the tagger remembers
//! the caret as a version-anchored [`PositionRef`] and answers "tags
//! changed" so the host knows to ask again. Tags are always computed
//! against the buffer's current version, carrying the caret forward
//! through whatever edits happened since it was recorded.

use texlens_syntax::{PositionRef, Snapshot, TextBuffer, TextRange, VersionId};

use crate::{MatchConfig, MatchSet, Tag, recompute};

/// Tells the host that tags over `range` of `version` must be fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagsChanged {
    pub version: VersionId,
    pub range: TextRange,
}

impl TagsChanged {
    fn whole(snapshot: &Snapshot) -> Self {
        Self {
            version: snapshot.version(),
            range: snapshot.full_range(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BraceTagger {
    config: MatchConfig,
    caret: Option<PositionRef>,
}

impl BraceTagger {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            config,
            caret: None,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// The last caret the host reported.
    pub fn caret(&self) -> Option<PositionRef> {
        self.caret
    }

    /// Records a caret move.
    ///
    /// Reporting the caret the tagger already holds returns `None` and
    /// raises no notification.
    pub fn caret_moved(&mut self, caret: PositionRef, snapshot: &Snapshot) -> Option<TagsChanged> {
        if self.caret == Some(caret) {
            return None;
        }
        log::trace!("caret moved to {:?} in {}", caret.offset, caret.version);
        self.caret = Some(caret);
        Some(TagsChanged::whole(snapshot))
    }

    /// Records a relayout. Only a relayout onto a new version changes tags.
    pub fn layout_changed(
        &mut self,
        old_version: VersionId,
        snapshot: &Snapshot,
        caret: PositionRef,
    ) -> Option<TagsChanged> {
        if old_version == snapshot.version() {
            return None;
        }
        log::trace!("layout moved from {} to {}", old_version, snapshot.version());
        self.caret = Some(caret);
        Some(TagsChanged::whole(snapshot))
    }

    /// The matched pairs for the retained caret in the buffer's current
    /// version.
    pub fn matches(&self, buffer: &TextBuffer) -> MatchSet {
        let Some(caret) = self.caret else {
            return MatchSet::default();
        };
        let snapshot = buffer.current();
        match buffer.translate(caret, snapshot.version()) {
            Ok(position) => recompute(&snapshot, position.offset, &self.config),
            Err(err) => {
                log::debug!("dropping caret {:?}: {}", caret, err);
                MatchSet::default()
            }
        }
    }

    pub fn tags(&self, buffer: &TextBuffer) -> Vec<Tag> {
        self.matches(buffer).tags()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texlens_syntax::{Affinity, Edit, TextSize};

    fn ranges(tags: &[Tag]) -> Vec<(u32, u32)> {
        tags.iter()
            .map(|t| (u32::from(t.range.start()), u32::from(t.range.end())))
            .collect()
    }

    #[test]
    fn test_no_caret_no_tags() {
        let buffer = TextBuffer::new("(a)").unwrap();
        assert!(BraceTagger::default().tags(&buffer).is_empty());
    }

    #[test]
    fn test_caret_moved_notifies_once() {
        let buffer = TextBuffer::new("(a)").unwrap();
        let snapshot = buffer.current();
        let mut tagger = BraceTagger::default();
        let caret = snapshot.position(0.into(), Affinity::After);

        let changed = tagger.caret_moved(caret, &snapshot).unwrap();
        assert_eq!(changed.version, snapshot.version());
        assert_eq!(changed.range, snapshot.full_range());
        assert_eq!(tagger.caret_moved(caret, &snapshot), None);
        assert_eq!(ranges(&tagger.tags(&buffer)), vec![(0, 1), (2, 3)]);
    }

    #[test]
    fn test_layout_without_new_version_is_ignored() {
        let buffer = TextBuffer::new("(a)").unwrap();
        let snapshot = buffer.current();
        let mut tagger = BraceTagger::default();
        let caret = snapshot.position(0.into(), Affinity::After);
        assert_eq!(tagger.layout_changed(snapshot.version(), &snapshot, caret), None);
        assert_eq!(tagger.caret(), None);
    }

    #[test]
    fn test_caret_follows_insertions() {
        let mut buffer = TextBuffer::new("(a)").unwrap();
        let mut tagger = BraceTagger::default();
        let first = buffer.current();
        tagger.caret_moved(first.position(0.into(), Affinity::After), &first);

        buffer.apply(Edit::insert(0.into(), "xy ")).unwrap();
        assert_eq!(ranges(&tagger.tags(&buffer)), vec![(3, 4), (5, 6)]);
    }

    #[test]
    fn test_layout_change_replaces_caret() {
        let mut buffer = TextBuffer::new("(a)").unwrap();
        let mut tagger = BraceTagger::default();
        let old = buffer.current();
        tagger.caret_moved(old.position(0.into(), Affinity::After), &old);

        let new = buffer.apply(Edit::insert(3.into(), " [b]")).unwrap();
        let changed = tagger
            .layout_changed(old.version(), &new, new.position(4.into(), Affinity::After))
            .unwrap();
        assert_eq!(changed.version, new.version());
        assert_eq!(ranges(&tagger.tags(&buffer)), vec![(4, 5), (6, 7)]);
    }

    #[test]
    fn test_deleted_caret_yields_nothing() {
        let mut buffer = TextBuffer::new("(abc)").unwrap();
        let mut tagger = BraceTagger::default();
        let first = buffer.current();
        tagger.caret_moved(first.position(2.into(), Affinity::After), &first);

        buffer
            .apply(Edit::delete(TextRange::new(1.into(), 4.into())))
            .unwrap();
        assert!(tagger.matches(&buffer).is_empty());
        assert!(tagger.tags(&buffer).is_empty());
    }

    #[test]
    fn test_caret_from_unknown_version_yields_nothing() {
        let buffer = TextBuffer::new("(a)").unwrap();
        let snapshot = buffer.current();
        let mut tagger = BraceTagger::default();
        let stale = PositionRef::new(VersionId(7), TextSize::from(0), Affinity::After);
        tagger.caret_moved(stale, &snapshot);
        assert!(tagger.tags(&buffer).is_empty());
    }

    #[test]
    fn test_caret_past_its_version_yields_nothing() {
        let mut buffer = TextBuffer::new("(a)").unwrap();
        let snapshot = buffer.current();
        let mut tagger = BraceTagger::default();
        let far = PositionRef::new(snapshot.version(), TextSize::from(u32::MAX - 1), Affinity::After);
        tagger.caret_moved(far, &snapshot);

        buffer.apply(Edit::insert(0.into(), "xyz")).unwrap();
        assert!(tagger.tags(&buffer).is_empty());
    }

    #[test]
    fn test_config_is_applied() {
        let buffer = TextBuffer::new(r"\left(x\right)").unwrap();
        let snapshot = buffer.current();
        let mut tagger = BraceTagger::new(MatchConfig {
            inner: false,
            ..MatchConfig::default()
        });
        tagger.caret_moved(snapshot.position(2.into(), Affinity::After), &snapshot);
        assert!(tagger.tags(&buffer).is_empty());
        assert!(!tagger.config().inner);
    }
}
