//! Worker Pool Tests
//!
//! ## Test Scopes
//! - **Identity**: address-based ids and URL derivation.
//! - **Registration**: duplicates, ordering, availability checks.
//! - **Eviction**: removal is permanent until a fresh registration.

#[cfg(test)]
mod tests {
    use crate::error::CrackError;
    use crate::pool::service::WorkerPool;
    use crate::pool::types::{WorkerId, WorkerState};

    // ============================================================
    // WORKER ID
    // ============================================================

    #[test]
    fn test_worker_id_base_url() {
        assert_eq!(
            WorkerId::new("10.0.0.5:5099").base_url(),
            "http://10.0.0.5:5099"
        );
        assert_eq!(
            WorkerId::new("http://worker-1:5099/").base_url(),
            "http://worker-1:5099"
        );
    }

    #[test]
    fn test_worker_id_equality_and_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(WorkerId::new("a:1"));
        set.insert(WorkerId::new("a:1"));
        set.insert(WorkerId::new("b:1"));

        assert_eq!(set.len(), 2);
    }

    // ============================================================
    // REGISTRATION
    // ============================================================

    #[test]
    fn test_register_rejects_duplicates() {
        let pool = WorkerPool::new();

        assert!(pool.register(WorkerId::new("a:1")));
        assert!(!pool.register(WorkerId::new("a:1")));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn test_concurrent_duplicate_registration_admits_one() {
        let pool = WorkerPool::new();

        let admitted: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| scope.spawn(|| pool.register(WorkerId::new("a:1"))))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap() as usize)
                .sum()
        });

        assert_eq!(admitted, 1);
        assert_eq!(pool.members(), vec![WorkerId::new("a:1")]);
    }

    #[test]
    fn test_empty_pool_fails_validation() {
        let pool = WorkerPool::new();
        assert!(matches!(
            pool.validate_availability(),
            Err(CrackError::NoWorkersAvailable)
        ));

        pool.register(WorkerId::new("a:1"));
        assert!(pool.validate_availability().is_ok());
    }

    #[test]
    fn test_initialize_states_keeps_registration_order() {
        let pool = WorkerPool::new();
        for name in ["c:1", "a:1", "b:1"] {
            pool.register(WorkerId::new(name));
        }

        let states = pool.initialize_states();
        let ids: Vec<&str> = states.iter().map(|s| s.id.address()).collect();

        assert_eq!(ids, vec!["c:1", "a:1", "b:1"]);
        assert!(states.iter().all(|s| !s.busy));
    }

    #[test]
    fn test_get_available_filters_busy_workers() {
        let pool = WorkerPool::new();
        let states = vec![
            WorkerState {
                id: WorkerId::new("a:1"),
                busy: true,
            },
            WorkerState::new(WorkerId::new("b:1")),
        ];

        let available = pool.get_available(&states);
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, WorkerId::new("b:1"));
    }

    // ============================================================
    // EVICTION
    // ============================================================

    #[test]
    fn test_mark_failed_removes_permanently() {
        let pool = WorkerPool::new();
        let worker = WorkerId::new("a:1");
        pool.register(worker.clone());

        assert!(pool.mark_failed(&worker));
        assert!(!pool.contains(&worker));
        assert!(!pool.mark_failed(&worker), "second eviction is a no-op");
        assert!(pool.initialize_states().is_empty());

        // Only a new registration brings it back
        assert!(pool.register(worker.clone()));
        assert!(pool.contains(&worker));
    }
}
