// Worker pool:
// * delivery order equals index order whatever the completion order
// * first failure wins, sink sees nothing after it
// * source and sink failures abort the run
// * in-flight window is respected
// * broken sources and panicking tasks fail the run instead of hanging it

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;
    use std::time::Duration;

    use parachunk_core::compression::CodecError;
    use parachunk_core::stream::parallelism::ParallelismProfile;
    use parachunk_core::stream::worker_pool::{FailureCell, Indexed, ReorderBuffer, TaskPool};
    use parachunk_core::telemetry::Stage;
    use parachunk_core::types::{PipelineError, PipelineResult};

    #[derive(Debug)]
    struct Job(u64);

    impl Indexed for Job {
        fn index(&self) -> u64 {
            self.0
        }
    }

    fn jobs(n: u64) -> impl Iterator<Item = PipelineResult<Job>> + Send {
        (0..n).map(|i| Ok(Job(i)))
    }

    fn boom(index: u64) -> PipelineError {
        PipelineError::codec(
            index,
            Stage::Encode,
            CodecError::Encode { codec: "test", msg: "boom".into() },
        )
    }

    fn pool(workers: usize) -> TaskPool {
        TaskPool::new(ParallelismProfile::with_workers(workers))
    }

    // --- Ordering ---

    #[test]
    fn results_are_delivered_in_index_order() {
        let n = 32u64;
        let mut seen = Vec::new();

        let delivered = pool(4)
            .run(
                jobs(n),
                |job: Job| {
                    // Later indices finish first.
                    thread::sleep(Duration::from_micros((n - job.0) * 300));
                    Ok(job.0 * 10)
                },
                |v: u64| {
                    seen.push(v);
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(delivered, n);
        assert_eq!(seen, (0..n).map(|i| i * 10).collect::<Vec<_>>());
    }

    #[test]
    fn single_threaded_profile_runs_everything() {
        let mut seen = Vec::new();
        let pool = TaskPool::new(ParallelismProfile::single_threaded());
        pool.run(jobs(10), |job: Job| Ok(job.0), |v: u64| {
            seen.push(v);
            Ok(())
        })
        .unwrap();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn empty_source_delivers_nothing() {
        let delivered = pool(4)
            .run(jobs(0), |job: Job| Ok(job.0), |_v: u64| Ok(()))
            .unwrap();
        assert_eq!(delivered, 0);
    }

    // --- Failures ---

    #[test]
    fn first_failure_is_reported_and_later_results_discarded() {
        let mut seen = Vec::new();
        let res = pool(4).run(
            jobs(64),
            |job: Job| if job.0 == 5 { Err(boom(5)) } else { Ok(job.0) },
            |v: u64| {
                seen.push(v);
                Ok(())
            },
        );

        match res {
            Err(PipelineError::Codec { index: 5, stage: Stage::Encode, .. }) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        // Only a contiguous prefix before the failing chunk may have been written.
        assert!(seen.len() <= 5);
        assert_eq!(seen, (0..seen.len() as u64).collect::<Vec<_>>());
    }

    #[test]
    fn with_one_worker_the_earliest_failure_wins() {
        let mut seen = Vec::new();
        let res = pool(1).run(
            jobs(20),
            |job: Job| match job.0 {
                3 | 7 => Err(boom(job.0)),
                i => Ok(i),
            },
            |v: u64| {
                seen.push(v);
                Ok(())
            },
        );

        assert!(matches!(res, Err(PipelineError::Codec { index: 3, .. })));
        assert!(seen.len() <= 3);
    }

    #[test]
    fn source_error_aborts_the_run() {
        let source = (0..10u64).map(|i| {
            if i == 3 {
                Err(PipelineError::io(Stage::Read, io::Error::new(io::ErrorKind::Other, "read failed")))
            } else {
                Ok(Job(i))
            }
        });

        let mut seen = Vec::new();
        let res = pool(2).run(source, |job: Job| Ok(job.0), |v: u64| {
            seen.push(v);
            Ok(())
        });

        assert!(matches!(res, Err(PipelineError::Io { stage: Stage::Read, .. })));
        assert!(seen.len() <= 3);
    }

    #[test]
    fn sink_error_stops_delivery() {
        let mut seen = Vec::new();
        let res = pool(4).run(jobs(50), |job: Job| Ok(job.0), |v: u64| {
            if v == 2 {
                return Err(PipelineError::io(Stage::Write, io::Error::new(io::ErrorKind::Other, "disk full")));
            }
            seen.push(v);
            Ok(())
        });

        assert!(matches!(res, Err(PipelineError::Io { stage: Stage::Write, .. })));
        assert_eq!(seen, vec![0, 1]);
    }

    #[test]
    fn gap_in_source_fails_instead_of_hanging() {
        let source = [0u64, 1, 3, 4].into_iter().map(|i| Ok(Job(i)));
        let res = pool(2).run(source, |job: Job| Ok(job.0), |_v: u64| Ok(()));
        assert!(matches!(res, Err(PipelineError::Internal(_))));
    }

    #[test]
    fn panicking_task_fails_the_run() {
        let res = pool(2).run(
            jobs(8),
            |job: Job| {
                if job.0 == 4 {
                    panic!("task blew up");
                }
                Ok(job.0)
            },
            |_v: u64| Ok(()),
        );
        assert!(matches!(res, Err(PipelineError::Internal(_))));
    }

    #[test]
    fn zero_workers_is_a_config_error() {
        let pool = TaskPool::new(ParallelismProfile { workers: 0, inflight: 4 });
        let res = pool.run(jobs(1), |job: Job| Ok(job.0), |_v: u64| Ok(()));
        assert!(matches!(res, Err(PipelineError::Config(_))));
    }

    // --- Bounded in-flight window ---

    #[test]
    fn inflight_window_is_respected() {
        let profile = ParallelismProfile { workers: 4, inflight: 6 };
        let window = profile.inflight as u64;
        let pulled = AtomicU64::new(0);

        let source = (0..200u64).map(|i| {
            pulled.fetch_add(1, Ordering::SeqCst);
            Ok(Job(i))
        });

        let mut delivered = 0u64;
        TaskPool::new(profile)
            .run(
                source,
                |job: Job| {
                    if job.0 % 25 == 0 {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Ok(job.0)
                },
                |v: u64| {
                    assert_eq!(v, delivered);
                    let outstanding = pulled.load(Ordering::SeqCst) - delivered;
                    assert!(outstanding <= window, "{} chunks in flight, window {}", outstanding, window);
                    delivered += 1;
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(delivered, 200);
    }

    // --- Building blocks ---

    #[test]
    fn reorder_buffer_releases_only_in_order() {
        let mut table = ReorderBuffer::new();
        table.insert(2, "c").unwrap();
        table.insert(1, "b").unwrap();
        assert_eq!(table.pop_ready(), None);

        table.insert(0, "a").unwrap();
        assert_eq!(table.pop_ready(), Some("a"));
        assert_eq!(table.pop_ready(), Some("b"));
        assert_eq!(table.pop_ready(), Some("c"));
        assert_eq!(table.next_index(), 3);
        assert_eq!(table.parked(), 0);
    }

    #[test]
    fn reorder_buffer_slots_are_written_once() {
        let mut table = ReorderBuffer::new();
        table.insert(0, 1).unwrap();
        assert!(table.insert(0, 2).is_err());
        assert_eq!(table.pop_ready(), Some(1));
        // Already delivered.
        assert!(table.insert(0, 3).is_err());
    }

    #[test]
    fn failure_cell_keeps_the_first_error() {
        let cell = FailureCell::new();
        assert!(!cell.is_failed());
        assert!(cell.record(boom(1)));
        assert!(!cell.record(boom(2)));
        assert!(cell.is_failed());
        assert!(matches!(cell.into_inner(), Some(PipelineError::Codec { index: 1, .. })));
    }
}
