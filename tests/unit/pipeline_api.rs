use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;
use storepipe_rs::{BusySpinWaitStrategy, PipelineConfig, PipelineError, Processor, StageState};

#[cfg(test)]
mod tests {
    use super::*;

    // --- Construction and defaults ---

    #[test]
    fn test_default_capacity() {
        let processor = Processor::new(0u64);
        assert_eq!(processor.capacity(), 1024);
        processor.shutdown();
    }

    #[test]
    fn test_capacity_rounds_up_to_power_of_two() {
        let config = PipelineConfig {
            capacity: 100,
            ..PipelineConfig::default()
        };
        let processor = Processor::with_config(0u64, config);
        assert_eq!(processor.capacity(), 128);
        processor.shutdown();
    }

    #[test]
    fn test_busy_spin_on_both_stages() {
        let config = PipelineConfig {
            capacity: 64,
            ingress_wait: Arc::new(BusySpinWaitStrategy::new()),
            processing_wait: Arc::new(BusySpinWaitStrategy::new()),
        };
        let processor = Processor::with_config(0u64, config);

        for _ in 0..500 {
            processor.submit(|count| *count += 1).unwrap();
        }
        assert_eq!(processor.submit_and_await(|count| *count).unwrap(), 500);
        processor.shutdown();
    }

    // --- Submission and awaiting ---

    #[test]
    fn test_submit_and_await_returns_task_value() {
        let processor = Processor::new(String::from("state"));

        let length = processor.submit_and_await(|state| state.len()).unwrap();
        assert_eq!(length, 5);
        processor.shutdown();
    }

    #[test]
    fn test_await_sees_all_prior_submissions() {
        let processor = Processor::new(0u64);
        for _ in 0..100 {
            processor.submit(|count| *count += 1).unwrap();
        }

        assert_eq!(processor.submit_and_await(|count| *count).unwrap(), 100);
        processor.shutdown();
    }

    #[test]
    fn test_multi_producer_submissions_all_execute() {
        let processor = Arc::new(Processor::new(0u64));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let processor = Arc::clone(&processor);
                thread::spawn(move || {
                    for _ in 0..250 {
                        processor.submit(|count| *count += 1).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(processor.submit_and_await(|count| *count).unwrap(), 1000);
        processor.shutdown();
    }

    // --- Panic isolation ---

    #[test]
    fn test_panicking_command_is_reported_and_isolated() {
        let processor = Processor::new(0u64);
        processor.submit(|count| *count += 1).unwrap();

        let result: Result<u64, PipelineError> =
            processor.submit_and_await(|_| panic!("boom"));
        match result {
            Err(PipelineError::CommandPanicked { message }) => {
                assert!(message.contains("boom"), "unexpected payload: {message}");
            }
            other => panic!("expected a panic report, got {other:?}"),
        }
        assert_eq!(processor.fault_count(), 1);

        // The pipeline keeps executing after the fault.
        assert_eq!(processor.submit_and_await(|count| *count).unwrap(), 1);
        processor.shutdown();
    }

    // --- Drain barrier ---

    #[test]
    fn test_drain_flushes_the_backlog() {
        let processor = Processor::new(0u64);
        for _ in 0..500 {
            processor.submit(|count| *count += 1).unwrap();
        }

        processor.drain();

        assert_eq!(processor.pending_count(), 0);
        assert_eq!(processor.submit_and_await(|count| *count).unwrap(), 500);
        processor.shutdown();
    }

    // --- Shutdown lifecycle ---

    #[test]
    fn test_shutdown_rejects_new_submissions() {
        let processor = Processor::new(0u64);
        processor.shutdown();

        assert!(processor.is_shutdown());
        assert_eq!(
            processor.submit(|count| *count += 1),
            Err(PipelineError::Shutdown)
        );
        let awaited: Result<u64, PipelineError> = processor.submit_and_await(|count| *count);
        assert_eq!(awaited, Err(PipelineError::Shutdown));
    }

    #[test]
    fn test_shutdown_executes_the_accepted_backlog() {
        let executed = Arc::new(AtomicU64::new(0));
        let processor = Processor::new(());

        for _ in 0..200 {
            let executed = Arc::clone(&executed);
            processor
                .submit(move |_| {
                    executed.fetch_add(1, Ordering::Relaxed);
                })
                .unwrap();
        }
        processor.shutdown();

        assert_eq!(executed.load(Ordering::Relaxed), 200);
        assert_eq!(processor.pending_count(), 0);
    }

    #[test]
    fn test_stage_states_track_shutdown() {
        let processor = Processor::new(0u64);
        assert_eq!(
            processor.stage_states(),
            (StageState::Running, StageState::Running)
        );

        processor.shutdown();
        assert_eq!(
            processor.stage_states(),
            (StageState::Stopped, StageState::Stopped)
        );
    }

    #[test]
    fn test_drop_shuts_down_and_flushes() {
        let executed = Arc::new(AtomicU64::new(0));
        {
            let processor = Processor::new(());
            for _ in 0..200 {
                let executed = Arc::clone(&executed);
                processor
                    .submit(move |_| {
                        executed.fetch_add(1, Ordering::Relaxed);
                    })
                    .unwrap();
            }
        }

        assert_eq!(executed.load(Ordering::Relaxed), 200);
    }
}
