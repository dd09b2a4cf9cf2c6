use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter that marks which piece of async work is still wanted.
///
/// Starting new work calls [`Generation::advance`]; every token handed out
/// before that point turns stale. Work that finishes checks its token and
/// drops its result instead of publishing it.
#[derive(Debug, Clone, Default)]
pub struct Generation {
    current: Arc<AtomicU64>,
}

impl Generation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> u64 {
        self.current.load(Ordering::Acquire)
    }

    /// Invalidates all outstanding tokens and returns one for the new work.
    pub fn advance(&self) -> GenerationToken {
        let value = self.current.fetch_add(1, Ordering::AcqRel) + 1;
        GenerationToken {
            value,
            source: Arc::clone(&self.current),
        }
    }

    /// Token for the current generation, without superseding anything.
    pub fn token(&self) -> GenerationToken {
        GenerationToken {
            value: self.current(),
            source: Arc::clone(&self.current),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationToken {
    value: u64,
    source: Arc<AtomicU64>,
}

impl GenerationToken {
    pub fn value(&self) -> u64 {
        self.value
    }

    pub fn is_current(&self) -> bool {
        self.source.load(Ordering::Acquire) == self.value
    }

    pub fn is_stale(&self) -> bool {
        !self.is_current()
    }
}

#[cfg(test)]
mod tests {
    use super::Generation;

    #[test]
    fn advance_supersedes_older_tokens() {
        let g = Generation::new();
        let first = g.advance();
        assert!(first.is_current());

        let second = g.advance();
        assert!(first.is_stale());
        assert!(second.is_current());
        assert_eq!(second.value(), 2);
    }

    #[test]
    fn token_does_not_advance() {
        let g = Generation::new();
        let a = g.advance();
        let b = g.token();
        assert_eq!(a.value(), b.value());
        assert!(a.is_current());
    }

    #[test]
    fn clones_share_the_counter() {
        let g = Generation::new();
        let token = g.advance();
        g.clone().advance();
        assert!(token.is_stale());
        assert_eq!(g.current(), 2);
    }
}
