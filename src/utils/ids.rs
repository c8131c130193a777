use std::sync::atomic::{AtomicU64, Ordering};

use uuid::Uuid;

/// Källa för nya post-ID:n. Kontraktet kräver bara unikhet inom en
/// samling under applikationens livstid.
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// Standardgenerator: `<prefix>-<uuid v4>`
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, Uuid::new_v4().simple())
    }
}

/// Förutsägbara ID:n (`task-1`, `task-2`, ...), för tester och demo-data
#[derive(Debug, Default)]
pub struct SequentialIds {
    counter: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        format!("{}-{}", prefix, n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_uuid_ids_are_prefixed_and_unique() {
        let ids = UuidGenerator;
        let generated: HashSet<String> = (0..1000).map(|_| ids.next_id("task")).collect();
        assert_eq!(generated.len(), 1000);
        assert!(generated.iter().all(|id| id.starts_with("task-")));
    }

    #[test]
    fn test_sequential_ids() {
        let ids = SequentialIds::new();
        assert_eq!(ids.next_id("rfi"), "rfi-1");
        assert_eq!(ids.next_id("rfi"), "rfi-2");
    }
}
