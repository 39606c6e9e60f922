//! # Expiry
//!
//! Reaper boundaries against a manual clock, and the background reaper's
//! start/stop lifecycle on a real tokio runtime.

#[cfg(test)]
mod tests {
    use crate::support::{click_by, inline_hub};
    use ix_core::{
        CallbackError, Interactable, InteractionDescriptor, InteractiveForm, ManualTimeSource,
        Outcome, Timestamp,
    };
    use ix_runtime::{HubConfig, InlineWorkerPool, InteractionHub};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_element_scannable_until_boundary() {
        let (hub, clock) = inline_hub(1_000);
        let message = hub.register_element(hub.message().with_expiry(Duration::from_secs(10)));
        message
            .add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "ping"), |_| {
                Ok(Outcome::Keep)
            })
            .unwrap();

        clock.advance(Duration::from_millis(9_999));
        assert!(hub.sweep_now().evicted.is_empty());
        assert_eq!(hub.dispatch_now(&click_by("ping", 1)).outcome, Outcome::Keep);

        clock.advance(Duration::from_millis(1));
        assert_eq!(hub.sweep_now().evicted, vec![message.id()]);
        assert_eq!(
            hub.dispatch_now(&click_by("ping", 1)).outcome,
            Outcome::NotProcessed
        );
    }

    #[test]
    fn test_forms_reaped_on_hub_clock() {
        let (hub, clock) = inline_hub(1_000);
        let form = hub.register_element(
            hub.form("signup", |_| Ok(Outcome::Remove)).with_expiry(Duration::from_secs(1)),
        );
        let standalone = hub.register_element(
            InteractiveForm::with_time_source(hub.time_source().as_ref(), "feedback", |_| {
                Ok(Outcome::Remove)
            })
            .with_expiry(Duration::from_secs(1)),
        );
        let message = hub.register_element(hub.message().with_expiry(Duration::from_secs(1)));

        clock.advance(Duration::from_secs(3600));
        let report = hub.sweep_now();

        assert_eq!(report.evicted, vec![form.id(), standalone.id(), message.id()]);
        assert!(hub.registry().is_empty());
    }

    #[test]
    fn test_changing_expiry_moves_deadline_immediately() {
        let (hub, clock) = inline_hub(0);
        let message = hub.register_element(hub.message());

        clock.advance(Duration::from_secs(60));
        assert!(hub.sweep_now().evicted.is_empty());

        message.core().set_expiry(Duration::from_secs(30));
        assert_eq!(hub.sweep_now().evicted.len(), 1);
    }

    #[test]
    fn test_expiry_callbacks_isolated_and_counted() {
        let (hub, _) = inline_hub(0);
        let fired = Arc::new(AtomicUsize::new(0));
        let first = Arc::clone(&fired);
        let third = Arc::clone(&fired);

        hub.register_element(
            hub.message()
                .with_expiry(Duration::ZERO)
                .on_expiry(move || {
                    first.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
                .on_expiry(|| Err(CallbackError::failed("channel gone")))
                .on_expiry(move || {
                    third.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
        );

        let report = hub.sweep_now();

        assert_eq!(report.evicted.len(), 1);
        assert_eq!(report.callbacks_invoked, 3);
        assert_eq!(report.callback_failures, 1);
        assert_eq!(fired.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_zero_expiry_reaped_on_next_tick() {
        let clock = Arc::new(ManualTimeSource::new(Timestamp::from_millis(0)));
        let hub = InteractionHub::builder()
            .config(HubConfig {
                sweep_interval: Duration::from_millis(20),
                ..HubConfig::default()
            })
            .worker_pool(Arc::new(InlineWorkerPool))
            .time_source(clock.clone())
            .build()
            .unwrap();

        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        hub.register_element(hub.message().with_expiry(Duration::ZERO).on_expiry(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }));
        let survivor = hub.register_element(hub.message());

        hub.start_reaper().unwrap();

        let mut waited = Duration::ZERO;
        while hub.registry().len() > 1 && waited < Duration::from_secs(2) {
            tokio::time::sleep(Duration::from_millis(10)).await;
            waited += Duration::from_millis(10);
        }
        // A few more ticks must not fire the callbacks again.
        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(hub.registry().len(), 1);
        assert!(hub.registry().contains(&survivor.id()));
        assert_eq!(fired.load(Ordering::SeqCst), 1);

        hub.shutdown().await.unwrap();
        assert!(!hub.is_reaper_running());
    }

    #[tokio::test]
    async fn test_stopped_reaper_no_longer_sweeps() {
        let clock = Arc::new(ManualTimeSource::new(Timestamp::from_millis(0)));
        let hub = InteractionHub::builder()
            .config(HubConfig {
                sweep_interval: Duration::from_millis(10),
                ..HubConfig::default()
            })
            .worker_pool(Arc::new(InlineWorkerPool))
            .time_source(clock)
            .build()
            .unwrap();

        hub.start_reaper().unwrap();
        hub.shutdown().await.unwrap();

        hub.register_element(hub.message().with_expiry(Duration::ZERO));
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(hub.registry().len(), 1);
        assert_eq!(hub.sweep_now().evicted.len(), 1);
    }
}
