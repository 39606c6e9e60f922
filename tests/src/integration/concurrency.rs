//! # Concurrency
//!
//! Many submissions racing through real worker pools. Scans are
//! serialized by the registry, so a `Remove` element is consumed exactly
//! once no matter how many workers see its notification.

#[cfg(test)]
mod tests {
    use crate::support::{click_by, wait_until};
    use ix_core::{Interactable, InteractionDescriptor, Outcome};
    use ix_runtime::{
        HubConfig, InteractionHub, RayonWorkerPool, Submission, TokioWorkerPool,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn rayon_hub(threads: usize) -> anyhow::Result<Arc<InteractionHub>> {
        let hub = InteractionHub::builder()
            .config(HubConfig {
                worker_threads: threads,
                ..HubConfig::default()
            })
            .build()?;
        Ok(Arc::new(hub))
    }

    #[test]
    fn test_remove_consumed_once_under_contention() -> anyhow::Result<()> {
        let hub = rayon_hub(4)?;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let message = hub.register_element(hub.message());
        message.add_interaction(
            InteractionDescriptor::new(ix_core::DescriptorKind::Button, "claim"),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Remove)
            },
        )?;

        let submitters: Vec<_> = (0..8)
            .map(|t| {
                let hub = Arc::clone(&hub);
                thread::spawn(move || {
                    for i in 0..25 {
                        let submission = hub.submit(click_by("claim", t * 100 + i));
                        assert!(matches!(submission, Ok(Submission::Scheduled)));
                    }
                })
            })
            .collect();
        for submitter in submitters {
            submitter.join().expect("submitter thread");
        }

        assert!(wait_until(Duration::from_secs(5), || hub.registry().is_empty()));
        // Let any straggling scans finish; none may reach the handler.
        thread::sleep(Duration::from_millis(50));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_every_submission_reaches_keep_element() -> anyhow::Result<()> {
        let hub = rayon_hub(4)?;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let message = hub.register_element(hub.message());
        message.add_interaction(
            InteractionDescriptor::new(ix_core::DescriptorKind::Button, "tally"),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Keep)
            },
        )?;

        for i in 0..200 {
            hub.submit(click_by("tally", i))?;
        }

        assert!(wait_until(Duration::from_secs(5), || {
            calls.load(Ordering::SeqCst) == 200
        }));
        assert!(hub.registry().contains(&message.id()));
        Ok(())
    }

    #[test]
    fn test_registration_while_dispatching() -> anyhow::Result<()> {
        let hub = rayon_hub(2)?;
        let consumed = Arc::new(AtomicUsize::new(0));

        for i in 0..50 {
            let counter = Arc::clone(&consumed);
            let message = hub.register_element(hub.message());
            let id = format!("item-{i}");
            message.add_interaction(
                InteractionDescriptor::new(ix_core::DescriptorKind::Button, id.as_str()),
                move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Outcome::Remove)
                },
            )?;
            hub.submit(click_by(&id, 1))?;
        }

        assert!(wait_until(Duration::from_secs(5), || hub.registry().is_empty()));
        assert_eq!(consumed.load(Ordering::SeqCst), 50);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_tokio_pool_dispatch() -> anyhow::Result<()> {
        let hub = InteractionHub::builder()
            .worker_pool(Arc::new(TokioWorkerPool::current()?))
            .build()?;
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let message = hub.register_element(hub.message());
        message.add_interaction(
            InteractionDescriptor::new(ix_core::DescriptorKind::Button, "async"),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Keep)
            },
        )?;

        for i in 0..20 {
            hub.submit(click_by("async", i))?;
        }

        let mut waited = Duration::ZERO;
        while calls.load(Ordering::SeqCst) < 20 && waited < Duration::from_secs(5) {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += Duration::from_millis(10);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 20);
        Ok(())
    }
}
