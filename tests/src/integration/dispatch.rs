//! # Dispatch
//!
//! First-match-wins routing across registered elements, and outcome
//! aggregation inside one message element.

#[cfg(test)]
mod tests {
    use crate::support::{click_by, inline_hub, user};
    use ix_core::{
        CallbackError, Interactable, InteractionContext, InteractionDescriptor, Outcome,
        OutcomeAggregation,
    };
    use ix_runtime::Submission;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counter() -> (Arc<AtomicUsize>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (Arc::clone(&calls), calls)
    }

    #[test]
    fn test_first_registered_match_wins() {
        let (hub, _) = inline_hub(0);
        let (a_calls, a_handle) = counter();
        let (b_calls, b_handle) = counter();

        let a = hub.register_element(hub.message());
        a.add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "go"), move |_| {
            a_handle.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::Remove)
        })
        .unwrap();
        let b = hub.register_element(hub.message());
        b.add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "go"), move |_| {
            b_handle.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::Remove)
        })
        .unwrap();

        let report = hub.dispatch_now(&click_by("go", 1));

        assert_eq!(report.consumed_by, Some(a.id()));
        assert_eq!(report.outcome, Outcome::Remove);
        assert_eq!(a_calls.load(Ordering::SeqCst), 1);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
        assert!(!hub.registry().contains(&a.id()));
        assert!(hub.registry().contains(&b.id()));

        // With A gone, B is next in line.
        let report = hub.dispatch_now(&click_by("go", 1));
        assert_eq!(report.consumed_by, Some(b.id()));
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_keep_retains_first_match() {
        let (hub, _) = inline_hub(0);
        let (calls, handle) = counter();
        let a = hub.register_element(hub.message());
        a.add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "vote"), move |_| {
            handle.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::Keep)
        })
        .unwrap();

        for _ in 0..3 {
            let report = hub.dispatch_now(&click_by("vote", 1));
            assert_eq!(report.outcome, Outcome::Keep);
            assert!(!report.evicted);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(hub.registry().len(), 1);
    }

    #[test]
    fn test_menu_submission_runs_every_selected_option() {
        let (hub, _) = inline_hub(0);
        let order = Arc::new(Mutex::new(Vec::new()));
        let message = hub.register_element(hub.message());

        for (value, outcome) in [("red", Outcome::Remove), ("blue", Outcome::Keep)] {
            let order = Arc::clone(&order);
            message
                .add_interaction(
                    InteractionDescriptor::new(ix_core::DescriptorKind::SelectOption, value),
                    move |_| {
                        order.lock().push(value);
                        Ok(outcome)
                    },
                )
                .unwrap();
        }

        let ctx = InteractionContext::menu_submit("colors", ["red", "blue"]).with_originator(user(1));
        let report = hub.dispatch_now(&ctx);

        assert_eq!(*order.lock(), vec!["red", "blue"]);
        // Last applicable handler decides under the default policy.
        assert_eq!(report.outcome, Outcome::Keep);
        assert!(hub.registry().contains(&message.id()));
    }

    #[test]
    fn test_most_terminal_policy_prefers_remove() {
        let (hub, _) = inline_hub(0);
        let message = hub.register_element(
            hub.message()
                .with_aggregation(OutcomeAggregation::MostTerminal),
        );
        for (value, outcome) in [("red", Outcome::Remove), ("blue", Outcome::Keep)] {
            message
                .add_interaction(
                    InteractionDescriptor::new(ix_core::DescriptorKind::SelectOption, value),
                    move |_| Ok(outcome),
                )
                .unwrap();
        }

        let ctx = InteractionContext::menu_submit("colors", ["blue", "red"]).with_originator(user(1));
        let report = hub.dispatch_now(&ctx);

        assert_eq!(report.outcome, Outcome::Remove);
        assert!(report.evicted);
        assert!(hub.registry().is_empty());
    }

    #[test]
    fn test_unselected_options_are_not_run() {
        let (hub, _) = inline_hub(0);
        let (green_calls, handle) = counter();
        let message = hub.register_element(hub.message());
        message
            .add_interaction(
                InteractionDescriptor::new(ix_core::DescriptorKind::SelectOption, "red"),
                |_| Ok(Outcome::Keep),
            )
            .unwrap();
        message
            .add_interaction(
                InteractionDescriptor::new(ix_core::DescriptorKind::SelectOption, "green"),
                move |_| {
                    handle.fetch_add(1, Ordering::SeqCst);
                    Ok(Outcome::Remove)
                },
            )
            .unwrap();

        let ctx = InteractionContext::menu_submit("colors", ["red"]).with_originator(user(1));

        assert_eq!(hub.dispatch_now(&ctx).outcome, Outcome::Keep);
        assert_eq!(green_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_remove_mid_scan_is_final() {
        let (hub, _) = inline_hub(0);
        let first = hub.register_element(hub.message());
        first
            .add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "close"), |_| {
                Ok(Outcome::Remove)
            })
            .unwrap();
        let tail = hub.register_element(hub.message());

        let report = hub.dispatch_now(&click_by("close", 1));
        assert!(report.evicted);

        // Neither later scans nor sweeps see the evicted element again.
        let again = hub.dispatch_now(&click_by("close", 1));
        assert_eq!(again.outcome, Outcome::NotProcessed);
        assert_eq!(again.offered, 1);
        assert!(hub.sweep_now().evicted.is_empty());
        assert_eq!(
            hub.registry().snapshot().iter().map(|e| e.id()).collect::<Vec<_>>(),
            vec![tail.id()]
        );
    }

    #[test]
    fn test_failing_handler_keeps_element_and_stops_scan() {
        let (hub, _) = inline_hub(0);
        let (behind_calls, handle) = counter();
        let broken = hub.register_element(hub.message());
        broken
            .add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "save"), |_| {
                Err(CallbackError::failed("storage unavailable"))
            })
            .unwrap();
        let behind = hub.register_element(hub.message());
        behind
            .add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "save"), move |_| {
                handle.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Remove)
            })
            .unwrap();

        let report = hub.dispatch_now(&click_by("save", 1));

        assert_eq!(report.outcome, Outcome::Keep);
        assert_eq!(report.consumed_by, Some(broken.id()));
        assert_eq!(behind_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_handler_can_register_follow_up_element() {
        let (hub, _) = inline_hub(0);
        let hub = Arc::new(hub);
        let step_one = hub.register_element(hub.message());

        let weak = Arc::downgrade(&hub);
        step_one
            .add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "next"), move |_| {
                if let Some(hub) = weak.upgrade() {
                    let step_two = hub.message();
                    step_two.add_interaction(
                        InteractionDescriptor::new(ix_core::DescriptorKind::Button, "finish"),
                        |_| Ok(Outcome::Remove),
                    )?;
                    hub.register_element(step_two);
                }
                Ok(Outcome::Remove)
            })
            .unwrap();

        assert_eq!(hub.dispatch_now(&click_by("next", 1)).outcome, Outcome::Remove);
        assert_eq!(hub.registry().len(), 1);
        assert_eq!(hub.dispatch_now(&click_by("finish", 1)).outcome, Outcome::Remove);
        assert!(hub.registry().is_empty());
    }

    #[test]
    fn test_handler_can_resubmit_on_inline_pool() {
        let (hub, _) = inline_hub(0);
        let hub = Arc::new(hub);
        let (b_calls, b_handle) = counter();

        let a = hub.register_element(hub.message());
        let weak = Arc::downgrade(&hub);
        a.add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "a"), move |_| {
            if let Some(hub) = weak.upgrade() {
                hub.submit(click_by("b", 1))
                    .map_err(|e| CallbackError::failed(e.to_string()))?;
            }
            Ok(Outcome::Keep)
        })
        .unwrap();
        let b = hub.register_element(hub.message());
        b.add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "b"), move |_| {
            b_handle.fetch_add(1, Ordering::SeqCst);
            Ok(Outcome::Remove)
        })
        .unwrap();

        let (done_tx, done_rx) = std::sync::mpsc::channel();
        let outer = Arc::clone(&hub);
        std::thread::spawn(move || {
            let _ = done_tx.send(outer.submit(click_by("a", 1)).is_ok());
        });

        let submitted = done_rx
            .recv_timeout(std::time::Duration::from_secs(3))
            .expect("re-entrant submit deadlocked");
        assert!(submitted);
        assert_eq!(b_calls.load(Ordering::SeqCst), 1);
        assert!(!hub.registry().contains(&b.id()));
        assert!(hub.registry().contains(&a.id()));
    }

    #[test]
    fn test_submission_prefilter() {
        let (hub, _) = inline_hub(0);
        let (calls, handle) = counter();
        let message = hub.register_element(hub.message());
        message
            .add_interaction(InteractionDescriptor::new(ix_core::DescriptorKind::Button, "ok"), move |_| {
                handle.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Keep)
            })
            .unwrap();

        let anonymous = InteractionContext::click("ok");
        let automated = InteractionContext::click("ok")
            .with_originator(ix_core::Originator::automated(ix_core::UserId(9)));

        assert!(matches!(hub.submit(anonymous).unwrap(), Submission::Dropped(_)));
        assert!(matches!(hub.submit(automated).unwrap(), Submission::Dropped(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(hub.submit(click_by("ok", 1)).unwrap(), Submission::Scheduled);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_dispatch_report_serializes() {
        let (hub, _) = inline_hub(0);
        let report = hub.dispatch_now(&click_by("nothing", 1));
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["outcome"], "not_processed");
        assert_eq!(json["offered"], 0);
    }
}
