use tracing::{error, info};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A dismissible user-facing notification (toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub level: NoticeLevel,
    pub title: String,
    pub description: String,
}

/// Ordered queue of notifications waiting to be shown or dismissed.
#[derive(Debug, Default)]
pub struct NoticeBus {
    next_id: u64,
    notices: Vec<Notice>,
}

impl NoticeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(
        &mut self,
        level: NoticeLevel,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> u64 {
        self.next_id += 1;
        let notice = Notice {
            id: self.next_id,
            level,
            title: title.into(),
            description: description.into(),
        };
        match level {
            NoticeLevel::Info => info!(title = %notice.title, "{}", notice.description),
            NoticeLevel::Error => error!(title = %notice.title, "{}", notice.description),
        }
        self.notices.push(notice);
        self.next_id
    }

    pub fn error(&mut self, title: impl Into<String>, description: impl Into<String>) -> u64 {
        self.emit(NoticeLevel::Error, title, description)
    }

    /// Returns `true` if a notice with `id` was still pending.
    pub fn dismiss(&mut self, id: u64) -> bool {
        let before = self.notices.len();
        self.notices.retain(|n| n.id != id);
        self.notices.len() != before
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoticeBus, NoticeLevel};

    #[test]
    fn records_notices_in_order() {
        let mut bus = NoticeBus::new();
        bus.emit(NoticeLevel::Info, "loaded", "catalog.json");
        bus.error("failed", "boom");
        assert_eq!(bus.notices().len(), 2);
        assert_eq!(bus.notices()[1].level, NoticeLevel::Error);
        assert_eq!(bus.notices()[1].description, "boom");
    }

    #[test]
    fn dismiss_removes_only_that_notice() {
        let mut bus = NoticeBus::new();
        let a = bus.error("a", "");
        let b = bus.error("b", "");
        assert!(bus.dismiss(a));
        assert!(!bus.dismiss(a));
        assert_eq!(bus.notices().len(), 1);
        assert_eq!(bus.notices()[0].id, b);
    }

    #[test]
    fn drain_clears_notices() {
        let mut bus = NoticeBus::new();
        bus.error("k", "m");
        let drained = bus.drain();
        assert_eq!(drained.len(), 1);
        assert!(bus.notices().is_empty());
    }
}
