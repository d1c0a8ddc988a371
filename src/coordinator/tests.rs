//! Coordinator Module Tests
//!
//! The worker side is replaced by `FakeRpc`, whose replies, probe results
//! and per-worker latencies are scripted per test.
//!
//! ## Test Scopes
//! - **Work sources**: chunk cursor coverage and re-queue ordering.
//! - **Latch**: set-once semantics.
//! - **Round loop**: racing, eviction, re-queueing and pool exhaustion.

#[cfg(test)]
mod tests {
    use crate::coordinator::coordinator::TaskCoordinator;
    use crate::coordinator::types::*;
    use crate::coordinator::work::*;
    use crate::error::CrackError;
    use crate::partition::alphabet::partition_alphabet;
    use crate::pool::service::WorkerPool;
    use crate::pool::types::WorkerId;
    use crate::rpc::client::{RequestRejected, WorkerRpc};
    use crate::rpc::protocol::*;
    use crate::worker::brute_force::run_brute_force;
    use crate::worker::credentials::CredentialStore;

    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::collections::{HashMap, HashSet};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    type ReplyFn = dyn Fn(&WorkerId, &WorkKind) -> anyhow::Result<WorkerReply> + Send + Sync;

    struct FakeRpc {
        reply: Box<ReplyFn>,
        unhealthy: HashSet<WorkerId>,
        delays: HashMap<WorkerId, Duration>,
        dispatches: Mutex<Vec<(WorkerId, WorkKind)>>,
    }

    impl FakeRpc {
        fn new(
            reply: impl Fn(&WorkerId, &WorkKind) -> anyhow::Result<WorkerReply> + Send + Sync + 'static,
        ) -> Self {
            Self {
                reply: Box::new(reply),
                unhealthy: HashSet::new(),
                delays: HashMap::new(),
                dispatches: Mutex::new(Vec::new()),
            }
        }

        fn unhealthy(mut self, worker: &WorkerId) -> Self {
            self.unhealthy.insert(worker.clone());
            self
        }

        fn delay(mut self, worker: &WorkerId, millis: u64) -> Self {
            self.delays
                .insert(worker.clone(), Duration::from_millis(millis));
            self
        }

        fn dispatches(&self) -> Vec<(WorkerId, WorkKind)> {
            self.dispatches.lock().unwrap().clone()
        }

        fn dispatched_to(&self, worker: &WorkerId) -> usize {
            self.dispatches()
                .iter()
                .filter(|(target, _)| target == worker)
                .count()
        }

        async fn answer(&self, worker: &WorkerId, kind: WorkKind) -> anyhow::Result<WorkerReply> {
            self.dispatches
                .lock()
                .unwrap()
                .push((worker.clone(), kind.clone()));
            if let Some(delay) = self.delays.get(worker) {
                tokio::time::sleep(*delay).await;
            }
            (self.reply)(worker, &kind)
        }
    }

    #[async_trait]
    impl WorkerRpc for FakeRpc {
        async fn assign_brute_force(
            &self,
            worker: &WorkerId,
            request: &BruteForceRequest,
        ) -> anyhow::Result<WorkerReply> {
            self.answer(worker, WorkKind::BruteForce(request.clone()))
                .await
        }

        async fn assign_dictionary_chunk(
            &self,
            worker: &WorkerId,
            request: &DictionaryRequest,
        ) -> anyhow::Result<WorkerReply> {
            self.answer(worker, WorkKind::Dictionary(request.clone()))
                .await
        }

        async fn health_check(&self, worker: &WorkerId) -> anyhow::Result<()> {
            if self.unhealthy.contains(worker) {
                return Err(anyhow!("connection refused"));
            }
            Ok(())
        }
    }

    fn pool_with(count: usize) -> (Arc<WorkerPool>, Vec<WorkerId>) {
        let pool = WorkerPool::new();
        let workers: Vec<WorkerId> = (1..=count)
            .map(|i| WorkerId::new(format!("10.0.0.{}:5099", i)))
            .collect();
        for worker in &workers {
            pool.register(worker.clone());
        }
        (pool, workers)
    }

    fn settings() -> CoordinatorSettings {
        CoordinatorSettings {
            health_timeout: Duration::from_millis(200),
            dispatch_timeout: Duration::from_secs(5),
            backoff: Duration::from_millis(10),
        }
    }

    fn coordinator(pool: &Arc<WorkerPool>, rpc: &Arc<FakeRpc>) -> TaskCoordinator {
        coordinator_with(pool, rpc, settings())
    }

    fn coordinator_with(
        pool: &Arc<WorkerPool>,
        rpc: &Arc<FakeRpc>,
        settings: CoordinatorSettings,
    ) -> TaskCoordinator {
        let rpc: Arc<dyn WorkerRpc> = rpc.clone();
        TaskCoordinator::new("test-job", pool.clone(), rpc, settings)
    }

    fn not_found(_: &WorkerId, _: &WorkKind) -> anyhow::Result<WorkerReply> {
        Ok(WorkerReply::NotFound {
            elapsed_ms: 2,
            calculation_ms: 1,
            budget_exhausted: false,
        })
    }

    fn portion_of(kind: &WorkKind) -> &str {
        match kind {
            WorkKind::BruteForce(request) => &request.portion,
            WorkKind::Dictionary(_) => panic!("expected a brute force unit"),
        }
    }

    fn lines_of(kind: &WorkKind) -> (u64, u64) {
        match kind {
            WorkKind::Dictionary(request) => (request.start_line, request.end_line),
            WorkKind::BruteForce(_) => panic!("expected a dictionary unit"),
        }
    }

    fn portions(alphabet: &str, workers: usize) -> PortionQueue {
        PortionQueue::new(
            "alice",
            2,
            partition_alphabet(alphabet, workers).unwrap(),
            None,
        )
    }

    // ============================================================
    // WORK SOURCES
    // ============================================================

    #[test]
    fn test_chunk_cursor_covers_corpus_exactly() {
        let mut cursor = ChunkCursor::new("alice", 25_000, 10_000);

        let mut ranges = Vec::new();
        while let Some(unit) = cursor.next_unit() {
            ranges.push(lines_of(&unit.kind));
        }

        assert_eq!(ranges, vec![(1, 10_000), (10_001, 20_000), (20_001, 25_000)]);
        assert!(!cursor.has_remaining());
    }

    #[test]
    fn test_chunk_cursor_on_empty_corpus() {
        let mut cursor = ChunkCursor::new("alice", 0, 10_000);

        assert!(!cursor.has_remaining());
        assert!(cursor.next_unit().is_none());
    }

    #[test]
    fn test_requeued_chunk_is_handed_out_first() {
        let mut cursor = ChunkCursor::new("alice", 30, 10);
        let first = cursor.next_unit().unwrap();

        cursor.requeue(first);

        assert_eq!(lines_of(&cursor.next_unit().unwrap().kind), (1, 10));
        assert_eq!(lines_of(&cursor.next_unit().unwrap().kind), (11, 20));
    }

    #[test]
    fn test_portion_queue_requeue() {
        let mut queue = portions("abcd", 2);
        assert_eq!(queue.len(), 2);

        let first = queue.next_unit().unwrap();
        queue.requeue(first);

        assert_eq!(portion_of(&queue.next_unit().unwrap().kind), "ab");
        assert_eq!(portion_of(&queue.next_unit().unwrap().kind), "cd");
        assert!(!queue.has_remaining());
    }

    // ============================================================
    // LATCH
    // ============================================================

    #[test]
    fn test_latch_is_set_once() {
        let latch = FoundLatch::new();
        let found = |value: &str| FoundPassword {
            value: value.to_string(),
            worker_id: WorkerId::new("w"),
            worker_elapsed_ms: 1,
            total_elapsed_ms: 2,
        };

        assert!(!latch.is_set());
        assert!(latch.try_set(found("first")));
        assert!(!latch.try_set(found("second")));
        assert_eq!(latch.get().map(|f| f.value.as_str()), Some("first"));
    }

    // ============================================================
    // ROUND LOOP
    // ============================================================

    #[tokio::test]
    async fn test_brute_force_race_finds_password() {
        // ARRANGE
        let (pool, workers) = pool_with(3);
        let credentials = CredentialStore::from_passwords([("alice", "bb")]);
        let rpc = Arc::new(FakeRpc::new(move |_, kind| {
            let WorkKind::BruteForce(request) = kind else {
                return Err(anyhow!("unexpected unit"));
            };
            let outcome = run_brute_force(request, &credentials)?;
            let calculation_ms = outcome.calculation.as_millis() as u64;
            Ok(match outcome.password {
                Some(password) => WorkerReply::Found {
                    password,
                    elapsed_ms: calculation_ms,
                    calculation_ms,
                },
                None => WorkerReply::NotFound {
                    elapsed_ms: calculation_ms,
                    calculation_ms,
                    budget_exhausted: false,
                },
            })
        }));
        let mut work = portions("abc", 3);

        // ACT
        let outcome = coordinator(&pool, &rpc).run(&mut work).await.unwrap();

        // ASSERT
        let found = outcome.found.expect("password should be found");
        assert_eq!(found.value, "bb");
        assert_eq!(found.worker_id, workers[1]);
        assert!(
            rpc.dispatches()
                .iter()
                .any(|(worker, kind)| worker == &workers[1] && portion_of(kind) == "b")
        );
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        // ARRANGE: every worker matches, the second one answers first
        let (pool, workers) = pool_with(3);
        let rpc = Arc::new(
            FakeRpc::new(|worker, _| {
                Ok(WorkerReply::Found {
                    password: format!("pw-{}", worker),
                    elapsed_ms: 1,
                    calculation_ms: 1,
                })
            })
            .delay(&workers[0], 150)
            .delay(&workers[1], 10)
            .delay(&workers[2], 80),
        );
        let mut work = portions("abc", 3);

        // ACT
        let outcome = coordinator(&pool, &rpc).run(&mut work).await.unwrap();

        // ASSERT
        let found = outcome.found.unwrap();
        assert_eq!(found.worker_id, workers[1]);
        assert_eq!(found.value, format!("pw-{}", workers[1]));
        assert_eq!(outcome.results.iter().filter(|r| r.success).count(), 1);
    }

    #[tokio::test]
    async fn test_probe_failure_evicts_worker() {
        // ARRANGE
        let (pool, workers) = pool_with(2);
        let rpc = Arc::new(FakeRpc::new(not_found).unhealthy(&workers[0]));
        let mut work = portions("abc", 3);

        // ACT
        let outcome = coordinator(&pool, &rpc).run(&mut work).await.unwrap();

        // ASSERT
        assert!(outcome.found.is_none());
        assert_eq!(rpc.dispatched_to(&workers[0]), 0);
        assert_eq!(rpc.dispatched_to(&workers[1]), 3);
        assert_eq!(outcome.evicted, vec![workers[0].clone()]);
        assert!(!pool.contains(&workers[0]));
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn test_dispatch_failure_requeues_unit() {
        // ARRANGE
        let (pool, workers) = pool_with(2);
        let broken = workers[0].clone();
        let rpc = Arc::new(
            FakeRpc::new(move |worker, kind| {
                if *worker == broken {
                    return Err(anyhow!("connection reset"));
                }
                not_found(worker, kind)
            })
            .delay(&workers[1], 30),
        );
        let mut work = portions("ab", 2);

        // ACT
        let outcome = coordinator(&pool, &rpc).run(&mut work).await.unwrap();

        // ASSERT: the failed worker is used once, its portion is redone elsewhere
        assert!(outcome.found.is_none());
        assert_eq!(rpc.dispatched_to(&workers[0]), 1);
        let mut redone: Vec<String> = rpc
            .dispatches()
            .iter()
            .filter(|(worker, _)| worker == &workers[1])
            .map(|(_, kind)| portion_of(kind).to_string())
            .collect();
        redone.sort();
        assert_eq!(redone, vec!["a", "b"]);
        assert!(!pool.contains(&workers[0]));

        let failed = outcome
            .results
            .iter()
            .find(|r| r.worker_id == workers[0])
            .unwrap();
        assert_eq!(failed.elapsed_ms, None);
    }

    #[tokio::test]
    async fn test_dispatch_timeout_evicts_and_requeues() {
        // ARRANGE: the first worker never answers within the dispatch timeout
        let (pool, workers) = pool_with(2);
        let rpc = Arc::new(
            FakeRpc::new(not_found)
                .delay(&workers[0], 10_000)
                .delay(&workers[1], 20),
        );
        let mut work = portions("ab", 2);
        let settings = CoordinatorSettings {
            dispatch_timeout: Duration::from_millis(100),
            ..settings()
        };

        // ACT
        let outcome = coordinator_with(&pool, &rpc, settings)
            .run(&mut work)
            .await
            .unwrap();

        // ASSERT
        assert!(outcome.found.is_none());
        assert_eq!(outcome.evicted, vec![workers[0].clone()]);
        assert_eq!(rpc.dispatched_to(&workers[0]), 1);
        assert_eq!(rpc.dispatched_to(&workers[1]), 2);
        assert_eq!(pool.len(), 1);
    }

    #[tokio::test]
    async fn test_dictionary_chunks_follow_idle_workers() {
        // ARRANGE: the second worker is slower, so the first takes round two
        let (pool, workers) = pool_with(2);
        let rpc = Arc::new(FakeRpc::new(not_found).delay(&workers[1], 50));
        let mut work = ChunkCursor::new("alice", 25_000, 10_000);

        // ACT
        let outcome = coordinator(&pool, &rpc).run(&mut work).await.unwrap();

        // ASSERT
        let dispatches: Vec<(WorkerId, (u64, u64))> = rpc
            .dispatches()
            .iter()
            .map(|(worker, kind)| (worker.clone(), lines_of(kind)))
            .collect();
        assert_eq!(
            dispatches,
            vec![
                (workers[0].clone(), (1, 10_000)),
                (workers[1].clone(), (10_001, 20_000)),
                (workers[0].clone(), (20_001, 25_000)),
            ]
        );
        assert!(outcome.found.is_none());
        assert_eq!(outcome.results.len(), 3);
    }

    #[tokio::test]
    async fn test_budget_exhausted_chunk_moves_on() {
        let (pool, _) = pool_with(1);
        let rpc = Arc::new(FakeRpc::new(|_, kind| {
            let (start, _) = lines_of(kind);
            if start == 1 {
                Ok(WorkerReply::NotFound {
                    elapsed_ms: 60_000,
                    calculation_ms: 60_000,
                    budget_exhausted: true,
                })
            } else {
                Ok(WorkerReply::Found {
                    password: "secret".to_string(),
                    elapsed_ms: 3,
                    calculation_ms: 2,
                })
            }
        }));
        let mut work = ChunkCursor::new("alice", 2_000_000, 1_000_000);

        let outcome = coordinator(&pool, &rpc).run(&mut work).await.unwrap();

        assert_eq!(outcome.found.map(|f| f.value), Some("secret".to_string()));
        assert_eq!(rpc.dispatches().len(), 2);
    }

    #[tokio::test]
    async fn test_every_worker_failing_drains_pool() {
        // ARRANGE
        let (pool, _) = pool_with(3);
        let rpc = Arc::new(FakeRpc::new(|_, _| Err(anyhow!("connection refused"))));
        let mut work = ChunkCursor::new("alice", 100, 10);

        // ACT
        let result = coordinator(&pool, &rpc).run(&mut work).await;

        // ASSERT
        assert!(matches!(result, Err(CrackError::NoWorkersAvailable)));
        assert!(pool.is_empty());
        assert_eq!(rpc.dispatches().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_pool_fails_fast() {
        let pool = WorkerPool::new();
        let rpc = Arc::new(FakeRpc::new(not_found));
        let mut work = portions("abc", 1);

        let result = coordinator(&pool, &rpc).run(&mut work).await;

        assert!(matches!(result, Err(CrackError::NoWorkersAvailable)));
        assert!(rpc.dispatches().is_empty());
    }

    #[tokio::test]
    async fn test_rejection_fails_job_without_eviction() {
        // ARRANGE
        let (pool, _) = pool_with(2);
        let rpc = Arc::new(FakeRpc::new(|worker, _| {
            Err(RequestRejected {
                worker: worker.clone(),
                status: 404,
                message: "Hash for user login 'alice' not found".to_string(),
            }
            .into())
        }));
        let mut work = portions("abc", 2);

        // ACT
        let result = coordinator(&pool, &rpc).run(&mut work).await;

        // ASSERT
        assert!(matches!(result, Err(CrackError::UnknownUser(user)) if user == "alice"));
        assert_eq!(pool.len(), 2);
    }
}
