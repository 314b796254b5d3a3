use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient message shown to the user. It dismisses itself after `ttl`
/// unless a newer notice replaces it first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub ttl: Duration,
}

impl Notice {
    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}

/// The notice currently on screen. Each posted notice gets a fresh id so a
/// stale dismiss timer cannot hide its replacement.
#[derive(Debug, Clone, Default)]
pub struct NoticeSlot {
    current: Option<Notice>,
    last_id: u64,
}

impl NoticeSlot {
    pub fn post(&mut self, kind: NoticeKind, message: String, ttl: Duration) -> Notice {
        self.last_id += 1;
        let notice = Notice {
            id: self.last_id,
            kind,
            message,
            ttl,
        };
        self.current = Some(notice.clone());
        notice
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        if self.current.as_ref().is_some_and(|notice| notice.id == id) {
            self.current = None;
            return true;
        }
        false
    }

    pub fn current(&self) -> Option<&Notice> {
        self.current.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_only_hides_matching_notice() {
        let mut slot = NoticeSlot::default();
        let first = slot.post(NoticeKind::Error, "boom".into(), Duration::from_secs(5));
        let second = slot.post(NoticeKind::Success, "saved".into(), Duration::from_secs(3));
        assert_ne!(first.id, second.id);

        assert!(!slot.dismiss(first.id));
        assert_eq!(slot.current().map(|n| n.id), Some(second.id));
        assert!(slot.dismiss(second.id));
        assert!(slot.current().is_none());
    }
}
