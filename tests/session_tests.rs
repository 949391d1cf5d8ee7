//! Session behavior: restore, generation, polling, rotation and stale results.
//!
//! Tokio time is paused, so timers fire as soon as nothing else can run.

mod common;

use std::time::Duration;

use common::{Harness, NOW, SessionEventKind, message};
use rs_tempmail::domain::email::EmailState;
use rs_tempmail::session::render::{EMPTY_INBOX_TEXT, FETCH_ERROR_TEXT, GENERATION_ERROR_TEXT};
use rs_tempmail::session::{POLL_INTERVAL, ROTATION_PERIOD, SessionConfig, SessionEvent};
use rs_tempmail::store::repo::KeyValueStore;
use rs_tempmail::store::state::STATE_KEY;

const MINUTE_MS: i64 = 60_000;

fn saved(h: &Harness, address: &str, issued_at: i64) {
    h.state().save(address, issued_at).unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_restore_adopts_fresh_address() {
    let mut h = Harness::new(NOW);
    saved(&h, "Fresh@Tmp.dev", NOW - 10 * MINUTE_MS);

    assert!(h.session.restore());
    assert_eq!(h.session.current_address(), Some("Fresh@Tmp.dev"));
    assert_eq!(h.view().address.as_deref(), Some("Fresh@Tmp.dev"));
    assert!(h.session.is_polling());
    assert_eq!(
        h.session.rotation_delay(),
        Some(ROTATION_PERIOD - Duration::from_millis(10 * MINUTE_MS as u64))
    );

    // Polling starts with an immediate fetch against the lowercase address
    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.api.lookups(), vec!["fresh@tmp.dev".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn test_restore_rejects_expired_state() {
    for age in [ROTATION_PERIOD.as_millis() as i64, 2 * ROTATION_PERIOD.as_millis() as i64] {
        let mut h = Harness::new(NOW);
        saved(&h, "old@tmp.dev", NOW - age);

        assert!(!h.session.restore());
        assert_eq!(h.session.current_address(), None);
        assert!(!h.session.is_polling());
        assert_eq!(h.session.rotation_delay(), None);
        assert!(h.rx.try_recv().is_err());
    }
}

#[tokio::test(start_paused = true)]
async fn test_restore_missing_or_corrupt_state() {
    let mut h = Harness::new(NOW);
    assert!(!h.session.restore());

    h.kv.set(STATE_KEY, "{\"email\": 42").unwrap();
    assert!(!h.session.restore());

    h.kv.set(STATE_KEY, r#"{"email":"","timestamp":1760436000000}"#).unwrap();
    assert!(!h.session.restore());
    assert_eq!(h.session.current_address(), None);
}

#[tokio::test(start_paused = true)]
async fn test_restore_future_timestamp_gets_full_period() {
    let mut h = Harness::new(NOW);
    saved(&h, "skewed@tmp.dev", NOW + 5 * MINUTE_MS);

    assert!(h.session.restore());
    assert_eq!(h.session.rotation_delay(), Some(ROTATION_PERIOD));
}

#[tokio::test(start_paused = true)]
async fn test_restore_with_huge_rotation_period() {
    let config = SessionConfig {
        poll_interval: POLL_INTERVAL,
        rotation_period: Duration::from_secs(u64::MAX),
    };
    let mut h = Harness::with_config(NOW, config);
    saved(&h, "long@tmp.dev", NOW - 10 * MINUTE_MS);

    assert!(h.session.restore());
    assert!(h.session.rotation_delay().is_some());

    // Polling keeps going
    h.run_until(SessionEventKind::Fetched).await;
    h.run_until(SessionEventKind::PollTick).await;
    assert!(h.session.is_polling());
}

#[tokio::test(start_paused = true)]
async fn test_cleared_state_is_not_restored() {
    let mut h = Harness::new(NOW);
    saved(&h, "gone@tmp.dev", NOW - MINUTE_MS);
    h.state().clear().unwrap();

    assert!(!h.session.restore());
    assert_eq!(h.session.current_address(), None);
}

#[tokio::test(start_paused = true)]
async fn test_generate_resets_count_and_list() {
    let mut h = Harness::new(NOW);
    saved(&h, "old@tmp.dev", NOW - MINUTE_MS);
    h.api.set_inbox("old@tmp.dev", vec![message("a@x.io", "one"), message("b@x.io", "two")]);

    assert!(h.session.restore());
    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.session.message_count(), 2);
    assert_eq!(h.view().cards().len(), 2);

    h.api.queue_address("New@Tmp.dev");
    h.session.generate();
    assert!(h.session.is_generating());
    h.run_until(SessionEventKind::Generated).await;

    assert!(!h.session.is_generating());
    assert_eq!(h.session.current_address(), Some("New@Tmp.dev"));
    assert_eq!(h.session.message_count(), 0);
    assert_eq!(h.view().counter.as_deref(), Some("0 messages"));
    assert_eq!(h.view().notice(), Some(EMPTY_INBOX_TEXT));
    assert!(h.view().cards().is_empty());
    assert_eq!(h.session.rotation_delay(), Some(ROTATION_PERIOD));
    assert_eq!(h.state().load(), Some(EmailState::new("New@Tmp.dev", NOW)));

    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.api.lookups().last().map(String::as_str), Some("new@tmp.dev"));
}

#[tokio::test(start_paused = true)]
async fn test_generation_failure_keeps_prior_address() {
    let mut h = Harness::new(NOW);
    saved(&h, "keep@tmp.dev", NOW - MINUTE_MS);
    assert!(h.session.restore());
    h.run_until(SessionEventKind::Fetched).await;

    h.api.queue_generation_failure();
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;

    assert_eq!(h.session.current_address(), Some("keep@tmp.dev"));
    assert_eq!(h.view().address.as_deref(), Some(GENERATION_ERROR_TEXT));
    assert!(h.session.is_polling());
    assert_eq!(h.state().load().unwrap().email, "keep@tmp.dev");
}

#[tokio::test(start_paused = true)]
async fn test_generation_failure_without_address() {
    let mut h = Harness::new(NOW);
    h.api.queue_generation_failure();
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;

    assert_eq!(h.session.current_address(), None);
    assert!(!h.session.is_polling());
    assert_eq!(h.session.rotation_delay(), None);
    assert_eq!(h.view().address.as_deref(), Some(GENERATION_ERROR_TEXT));
}

#[tokio::test(start_paused = true)]
async fn test_generate_ignored_while_in_flight() {
    let mut h = Harness::new(NOW);
    h.api.queue_address("first@tmp.dev");
    h.api.queue_address("second@tmp.dev");

    h.session.generate();
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;
    h.run_until(SessionEventKind::Fetched).await;
    tokio::task::yield_now().await;

    assert_eq!(h.session.current_address(), Some("first@tmp.dev"));
    assert!(h.rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_empty_inbox_shows_empty_state() {
    let mut h = Harness::new(NOW);
    h.api.queue_address("empty@tmp.dev");
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;
    h.run_until(SessionEventKind::Fetched).await;

    assert_eq!(h.view().notice(), Some(EMPTY_INBOX_TEXT));
    assert_eq!(h.view().counter.as_deref(), Some("0 messages"));
}

#[tokio::test(start_paused = true)]
async fn test_single_message_counter_is_singular() {
    let mut h = Harness::new(NOW);
    h.api.set_inbox("one@tmp.dev", vec![message("Sender <s@x.io>", "Hello")]);
    h.api.queue_address("one@tmp.dev");
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;
    h.run_until(SessionEventKind::Fetched).await;

    assert_eq!(h.view().counter.as_deref(), Some("1 message"));
    let cards = h.view().cards();
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].from, "s@x.io");
    assert_eq!(cards[0].subject, "Hello");
    assert_eq!(cards[0].body, "Body of Hello");
}

#[tokio::test(start_paused = true)]
async fn test_server_order_is_kept() {
    let mut h = Harness::new(NOW);
    h.api.set_inbox(
        "order@tmp.dev",
        vec![
            message("a@x.io", "newest"),
            message("b@x.io", "middle"),
            message("c@x.io", "oldest"),
        ],
    );
    h.api.queue_address("order@tmp.dev");
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;
    h.run_until(SessionEventKind::Fetched).await;

    let subjects: Vec<&str> = h.view().cards().iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["newest", "middle", "oldest"]);
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_keeps_count_and_polling() {
    let mut h = Harness::new(NOW);
    h.api.set_inbox("err@tmp.dev", vec![message("a@x.io", "one"), message("b@x.io", "two")]);
    h.api.queue_address("err@tmp.dev");
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;
    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.session.message_count(), 2);

    h.api.fail_fetches(true);
    h.session.fetch_once();
    h.run_until(SessionEventKind::Fetched).await;

    assert_eq!(h.session.message_count(), 2);
    assert_eq!(h.view().counter.as_deref(), Some("2 messages"));
    assert_eq!(h.view().notice(), Some(FETCH_ERROR_TEXT));
    assert!(h.session.is_polling());

    // The next scheduled tick still fetches
    h.api.fail_fetches(false);
    h.run_until(SessionEventKind::PollTick).await;
    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.view().cards().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_restarting_polling_keeps_one_timer() {
    let mut h = Harness::new(NOW);
    saved(&h, "poll@tmp.dev", NOW - MINUTE_MS);
    assert!(h.session.restore());
    h.session.start_polling();
    h.session.start_polling();
    h.session.start_polling();

    // One poll period and a half: a single live timer ticks exactly once
    tokio::time::sleep(Duration::from_secs(45)).await;

    let mut ticks = 0;
    let mut fetches = 0;
    while let Ok(ev) = h.rx.try_recv() {
        match SessionEventKind::of(&ev) {
            SessionEventKind::PollTick => ticks += 1,
            SessionEventKind::Fetched => fetches += 1,
            _ => {}
        }
    }
    assert_eq!(ticks, 1);
    assert_eq!(fetches, 4);
}

#[tokio::test(start_paused = true)]
async fn test_stop_polling_is_idempotent() {
    let mut h = Harness::new(NOW);
    h.session.stop_polling();
    assert!(!h.session.is_polling());

    saved(&h, "stop@tmp.dev", NOW - MINUTE_MS);
    assert!(h.session.restore());
    h.session.stop_polling();
    h.session.stop_polling();
    assert!(!h.session.is_polling());

    tokio::time::sleep(Duration::from_secs(120)).await;
    while let Ok(ev) = h.rx.try_recv() {
        assert_ne!(SessionEventKind::of(&ev), SessionEventKind::PollTick);
    }
}

#[tokio::test(start_paused = true)]
async fn test_stale_results_are_discarded() {
    let mut h = Harness::new(NOW);
    h.api.set_inbox("a@tmp.dev", vec![message("x@x.io", "for a"), message("y@x.io", "also a")]);
    h.api.queue_address("a@tmp.dev");
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;

    // Hold back the listing for `a` while the address rotates to `b`
    let in_flight = h.rx.recv().await.unwrap();
    assert_eq!(SessionEventKind::of(&in_flight), SessionEventKind::Fetched);

    h.session.handle(SessionEvent::Generated(Ok("b@tmp.dev".to_string())));
    assert_eq!(h.session.current_address(), Some("b@tmp.dev"));

    h.session.handle(in_flight);
    assert_eq!(h.session.message_count(), 0);
    assert_eq!(h.view().notice(), Some(EMPTY_INBOX_TEXT));

    h.session.handle(SessionEvent::PollTick {
        address: "a@tmp.dev".to_string(),
    });
    h.run_until(SessionEventKind::Fetched).await;
    tokio::task::yield_now().await;
    assert!(!h.api.lookups().iter().skip(1).any(|l| l == "a@tmp.dev"));
}

#[tokio::test(start_paused = true)]
async fn test_rotation_generates_after_period() {
    let mut h = Harness::new(NOW);
    h.api.queue_address("first@tmp.dev");
    h.api.queue_address("second@tmp.dev");

    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;
    let armed_at = tokio::time::Instant::now();

    h.run_until(SessionEventKind::RotationDue).await;
    let waited = armed_at.elapsed();
    assert!(waited >= ROTATION_PERIOD && waited < ROTATION_PERIOD + Duration::from_secs(1));

    h.run_until(SessionEventKind::Generated).await;
    assert_eq!(h.session.current_address(), Some("second@tmp.dev"));
    assert_eq!(h.state().load().unwrap().email, "second@tmp.dev");
    assert_eq!(h.session.rotation_delay(), Some(ROTATION_PERIOD));
}

#[tokio::test(start_paused = true)]
async fn test_restored_rotation_fires_at_remaining_time() {
    let mut h = Harness::new(NOW);
    saved(&h, "late@tmp.dev", NOW - 59 * MINUTE_MS);
    h.api.queue_address("next@tmp.dev");

    let start = tokio::time::Instant::now();
    assert!(h.session.restore());
    h.run_until(SessionEventKind::RotationDue).await;
    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(60) && waited < Duration::from_secs(61));

    h.run_until(SessionEventKind::Generated).await;
    assert_eq!(h.session.current_address(), Some("next@tmp.dev"));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_rotation_is_ignored() {
    let mut h = Harness::new(NOW);
    saved(&h, "r@tmp.dev", NOW - MINUTE_MS);
    assert!(h.session.restore());

    h.session.handle(SessionEvent::RotationDue { epoch: 0 });
    assert!(!h.session.is_generating());
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_cancels_both_timers() {
    let mut h = Harness::new(NOW);
    saved(&h, "bye@tmp.dev", NOW - MINUTE_MS);
    assert!(h.session.restore());

    h.session.shutdown();
    assert!(!h.session.is_polling());
    assert_eq!(h.session.rotation_delay(), None);

    tokio::time::sleep(ROTATION_PERIOD * 2).await;
    while let Ok(ev) = h.rx.try_recv() {
        let kind = SessionEventKind::of(&ev);
        assert!(kind != SessionEventKind::PollTick && kind != SessionEventKind::RotationDue);
    }
}

#[tokio::test(start_paused = true)]
async fn test_new_arrivals_are_announced() {
    let mut h = Harness::new(NOW);
    h.api.set_inbox("new@tmp.dev", vec![message("a@x.io", "first")]);
    h.api.queue_address("new@tmp.dev");
    h.session.generate();
    h.run_until(SessionEventKind::Generated).await;
    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.view().announced.len(), 1);

    h.api.set_inbox("new@tmp.dev", vec![message("b@x.io", "second"), message("a@x.io", "first")]);
    h.session.fetch_once();
    h.run_until(SessionEventKind::Fetched).await;

    let subjects: Vec<&str> = h.view().announced.iter().map(|c| c.subject.as_str()).collect();
    assert_eq!(subjects, vec!["first", "second"]);

    // Same listing again: nothing new
    h.session.fetch_once();
    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.view().announced.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_restored_listing_is_not_announced() {
    let mut h = Harness::new(NOW);
    saved(&h, "back@tmp.dev", NOW - MINUTE_MS);
    h.api.set_inbox("back@tmp.dev", vec![message("a@x.io", "seen before")]);

    assert!(h.session.restore());
    h.run_until(SessionEventKind::Fetched).await;
    assert_eq!(h.view().cards().len(), 1);
    assert!(h.view().announced.is_empty());
}
