#![forbid(unsafe_code)]

//! End-to-end reveal flow in virtual time.
//!
//! Every test drives [`AppModel`] through [`ProgramSimulator`] with a
//! [`ManualClock`] that moves together with simulated time, against an
//! in-memory backend.
//!
//! # Invariants
//!
//! 1. The gate unlocks at most once and the unlock navigation happens
//!    exactly once, whatever ticks arrive afterwards.
//! 2. No gate timer runs after unlock or after a failed config fetch, and a
//!    failed fetch is never retried.
//! 3. The candle hands off to Card exactly once, exactly 3000 ms after the
//!    first blow, and never after its screen was left.
//! 4. A return context reaches only the destination of a cross edge.
//! 5. Empty or failed content degrades the screen without panicking.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use keepsake_app::app::{AppConfig, AppModel, AppMsg, GATE_TICK_ID};
use keepsake_app::navigation::{NavParams, NavigationState, ReturnContext, ScreenId, Trigger};
use keepsake_app::screens::cake::CANDLE_TIMER_BASE;
use keepsake_core::ManualClock;
use keepsake_core::event::{Event, KeyCode, KeyEvent};
use keepsake_runtime::ProgramSimulator;
use keepsake_store::{ContentItem, FetchError, MemoryStore, PHOTOS_FOLDER};
use keepsake_widgets::GateState;
use pretty_assertions::assert_eq;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 19, 18, 0, 0).unwrap()
}

struct Harness {
    sim: ProgramSimulator<AppModel>,
    store: Arc<MemoryStore>,
}

impl Harness {
    fn new(store: MemoryStore, start: NavigationState) -> Self {
        Self::build(store, start, false)
    }

    fn deferred(store: MemoryStore, start: NavigationState) -> Self {
        Self::build(store, start, true)
    }

    fn build(store: MemoryStore, start: NavigationState, defer: bool) -> Self {
        let clock = ManualClock::new(epoch());
        let store = Arc::new(store);
        let config = AppConfig {
            start,
            seed: Some(7),
            ..AppConfig::default()
        };
        let model = AppModel::new(store.clone(), Arc::new(clock.clone()), config);
        let mut sim = ProgramSimulator::new(model).with_clock(clock);
        sim.defer_tasks(defer);
        sim.init();
        Self { sim, store }
    }

    fn at(screen: ScreenId) -> NavigationState {
        NavigationState::at(screen)
    }

    fn app(&self) -> &AppModel {
        self.sim.model()
    }

    fn press(&mut self, code: KeyCode) {
        self.sim.inject_event(Event::Key(KeyEvent::new(code)));
    }

    fn char(&mut self, c: char) {
        self.press(KeyCode::Char(c));
    }

    fn screen_text(&mut self) -> String {
        self.sim.capture_frame(100, 40).text()
    }
}

fn reasons(n: usize) -> Vec<ContentItem> {
    (1..=n)
        .map(|i| ContentItem::reason(i.to_string(), format!("reason number {i}"), "✨"))
        .collect()
}

fn photos() -> Vec<ContentItem> {
    vec![
        ContentItem::photo("https://example.test/photos/beach.jpg"),
        ContentItem::photo("https://example.test/photos/cafe.jpg"),
    ]
}

// --- Time gate ---

#[test]
fn past_target_unlocks_immediately_and_navigates_once() {
    let store = MemoryStore::new().with_unlock(epoch() - TimeDelta::seconds(1));
    let mut h = Harness::new(store, NavigationState::default());

    assert_eq!(h.app().current(), ScreenId::Welcome);
    assert!(h.app().gate().is_unlocked());
    assert_eq!(h.app().navigation_log(), &[(ScreenId::Home, ScreenId::Welcome)]);
    assert!(h.sim.subscription_ids().is_empty());

    // Stray ticks after unlock change nothing.
    for _ in 0..3 {
        h.sim.send(AppMsg::GateTick);
    }
    h.sim.advance(Duration::from_secs(10));
    assert_eq!(h.app().current(), ScreenId::Welcome);
    assert_eq!(h.app().navigation_log().len(), 1);
}

#[test]
fn five_second_target_unlocks_after_five_ticks() {
    let store = MemoryStore::new().with_unlock(epoch() + TimeDelta::seconds(5));
    let mut h = Harness::new(store, NavigationState::default());

    assert_eq!(h.app().current(), ScreenId::Home);
    assert_eq!(h.app().gate().state(), &GateState::Counting(Duration::from_secs(5)));
    assert_eq!(h.sim.subscription_ids(), vec![GATE_TICK_ID]);

    h.sim.advance(Duration::from_secs(4));
    assert_eq!(h.app().current(), ScreenId::Home);
    assert_eq!(h.app().gate().countdown().seconds, 1);
    assert!(h.screen_text().contains("00 Minutes  01 Seconds"));

    h.sim.advance(Duration::from_secs(1));
    assert_eq!(h.app().current(), ScreenId::Welcome);
    assert!(h.app().gate().countdown().is_zero());
    assert!(!h.sim.subscription_ids().contains(&GATE_TICK_ID));

    h.sim.advance(Duration::from_secs(30));
    assert_eq!(h.app().navigation_log(), &[(ScreenId::Home, ScreenId::Welcome)]);
}

#[test]
fn countdown_renders_days_hours_minutes_seconds() {
    let remaining = 2 * 86_400 + 3 * 3_600 + 4 * 60 + 5;
    let store = MemoryStore::new().with_unlock(epoch() + TimeDelta::seconds(remaining));
    let mut h = Harness::new(store, NavigationState::default());
    assert!(h.screen_text().contains("  2 Days  03 Hours  04 Minutes  05 Seconds"));
    h.sim.advance(Duration::from_secs(65));
    assert!(h.screen_text().contains("  2 Days  03 Hours  03 Minutes  00 Seconds"));
}

#[test]
fn failing_config_never_starts_the_timer_or_retries() {
    let store = MemoryStore::new().failing("backend offline");
    let mut h = Harness::new(store, NavigationState::default());

    assert!(matches!(
        h.app().gate().state(),
        GateState::Failed(FetchError::FetchFailure(_))
    ));
    assert!(h.sim.subscription_ids().is_empty());
    h.sim.advance(Duration::from_secs(60));
    assert_eq!(h.store.fetch_count(), 1);
    assert_eq!(h.app().current(), ScreenId::Home);
    let text = h.screen_text();
    assert!(text.contains(FetchError::FetchFailure(String::new()).user_message()));
}

#[test]
fn missing_config_is_reported() {
    let mut h = Harness::new(MemoryStore::new(), NavigationState::default());
    assert_eq!(
        h.app().gate().state(),
        &GateState::Failed(FetchError::ConfigMissing)
    );
    assert!(h.screen_text().contains(FetchError::ConfigMissing.user_message()));
}

#[test]
fn home_shows_loading_until_config_arrives() {
    let store = MemoryStore::new().with_unlock(epoch() + TimeDelta::hours(1));
    let mut h = Harness::deferred(store, NavigationState::default());
    assert_eq!(h.sim.pending_task_count(), 1);
    assert!(h.screen_text().contains("Connecting to surprise..."));
    assert_eq!(h.sim.run_pending_tasks(), 1);
    assert!(h.screen_text().contains("01 Hours"));
}

#[test]
fn keys_cannot_leave_home() {
    let store = MemoryStore::new().with_unlock(epoch() + TimeDelta::hours(1));
    let mut h = Harness::new(store, NavigationState::default());
    h.press(KeyCode::Enter);
    h.char('n');
    h.sim.send(AppMsg::Navigate {
        to: ScreenId::Welcome,
        params: NavParams::default(),
        trigger: Trigger::User,
    });
    assert_eq!(h.app().current(), ScreenId::Home);
}

// --- Candle ---

#[test]
fn blowing_twice_schedules_one_hand_off_at_3000ms() {
    let mut h = Harness::new(MemoryStore::new(), Harness::at(ScreenId::Cake));
    let mount = h.app().mount();

    h.char('b');
    h.char('b');
    assert!(h.screen_text().contains("Your wish is on its way..."));
    assert_eq!(h.sim.logs().len(), 1);
    assert_eq!(h.sim.subscription_ids(), vec![CANDLE_TIMER_BASE + mount]);

    h.sim.advance(Duration::from_millis(2999));
    assert_eq!(h.app().current(), ScreenId::Cake);

    h.sim.advance(Duration::from_millis(1));
    assert_eq!(h.app().current(), ScreenId::Card);
    assert_eq!(h.app().navigation_log(), &[(ScreenId::Cake, ScreenId::Card)]);

    h.sim.advance(Duration::from_secs(10));
    assert_eq!(h.app().navigation_log().len(), 1);
}

#[test]
fn leaving_cake_early_cancels_the_hand_off() {
    let mut h = Harness::new(MemoryStore::new(), Harness::at(ScreenId::Cake));
    let cake_mount = h.app().mount();
    h.char('b');
    h.sim.advance(Duration::from_millis(1000));

    // A direct route change tears the Cake screen down.
    h.sim.send(AppMsg::Navigate {
        to: ScreenId::Card,
        params: NavParams::default(),
        trigger: Trigger::User,
    });
    assert_eq!(h.app().current(), ScreenId::Card);
    assert!(h.sim.subscription_ids().is_empty());

    // Continue on; the old timer must not pull us back to Card.
    h.press(KeyCode::Enter);
    assert_eq!(h.app().current(), ScreenId::Reasons);
    h.sim.advance(Duration::from_secs(5));
    h.sim.send(AppMsg::ScreenTimer { mount: cake_mount });
    assert_eq!(h.app().current(), ScreenId::Reasons);
    assert_eq!(
        h.app().navigation_log(),
        &[
            (ScreenId::Cake, ScreenId::Card),
            (ScreenId::Card, ScreenId::Reasons)
        ]
    );
}

#[test]
fn quitting_during_the_delay_stops_everything() {
    let mut h = Harness::new(MemoryStore::new(), Harness::at(ScreenId::Cake));
    h.char('b');
    h.char('q');
    assert!(!h.sim.is_running());
    h.sim.advance(Duration::from_secs(5));
    assert_eq!(h.app().current(), ScreenId::Cake);
}

// --- Navigation and return context ---

#[test]
fn full_story_in_order() {
    let store = MemoryStore::new()
        .with_unlock(epoch() + TimeDelta::seconds(2))
        .with_reasons(reasons(3))
        .with_media(PHOTOS_FOLDER, photos());
    let mut h = Harness::new(store, NavigationState::default());

    h.sim.advance(Duration::from_secs(2));
    h.press(KeyCode::Enter); // Welcome -> Cake
    h.char('b');
    h.sim.advance(Duration::from_secs(3)); // Cake -> Card
    h.char('o');
    assert!(h.screen_text().contains("My love,"));
    h.press(KeyCode::Enter); // Card -> Reasons
    h.press(KeyCode::Enter); // Reasons -> Memories
    h.char('n'); // Memories -> Final
    h.press(KeyCode::Enter); // Final -> Dashboard

    assert_eq!(
        h.app().navigation_log(),
        &[
            (ScreenId::Home, ScreenId::Welcome),
            (ScreenId::Welcome, ScreenId::Cake),
            (ScreenId::Cake, ScreenId::Card),
            (ScreenId::Card, ScreenId::Reasons),
            (ScreenId::Reasons, ScreenId::Memories),
            (ScreenId::Memories, ScreenId::Final),
            (ScreenId::Final, ScreenId::Dashboard),
        ]
    );
    assert_eq!(h.app().nav(), NavigationState::at(ScreenId::Dashboard));
}

#[test]
fn dashboard_to_memories_carries_context_and_final_drops_it() {
    let store = MemoryStore::new()
        .with_reasons(reasons(3))
        .with_media(PHOTOS_FOLDER, photos());
    let mut h = Harness::new(store, Harness::at(ScreenId::Dashboard));

    h.char('m');
    assert_eq!(h.app().current(), ScreenId::Memories);
    assert_eq!(h.app().nav().return_context, Some(ReturnContext::Dashboard));
    assert_eq!(h.app().nav().route(), "/memories?from=dashboard");
    assert!(h.screen_text().contains("[r] Return to Dashboard"));

    h.char('n');
    assert_eq!(h.app().current(), ScreenId::Final);
    assert_eq!(h.app().nav().return_context, None);
    assert!(!h.screen_text().contains("Return to Dashboard"));
}

#[test]
fn letter_tile_context_does_not_follow_linear_edges() {
    let mut h = Harness::new(MemoryStore::new(), Harness::at(ScreenId::Dashboard));
    h.char('l');
    assert_eq!(h.app().nav().route(), "/card?from=dashboard");
    assert!(h.screen_text().contains("[r] Return to Dashboard"));

    h.press(KeyCode::Enter);
    assert_eq!(h.app().nav(), NavigationState::at(ScreenId::Reasons));
}

#[test]
fn return_control_goes_back_to_dashboard() {
    let mut h = Harness::new(MemoryStore::new(), Harness::at(ScreenId::Dashboard));
    h.char('m');
    h.char('r');
    assert_eq!(h.app().nav(), NavigationState::at(ScreenId::Dashboard));
}

#[test]
fn return_control_absent_on_linear_entry() {
    let mut h = Harness::new(MemoryStore::new(), Harness::at(ScreenId::Memories));
    h.char('r');
    assert_eq!(h.app().current(), ScreenId::Memories);
    assert!(h.app().navigation_log().is_empty());
}

// --- Content ---

#[test]
fn empty_reasons_disable_the_control() {
    let mut h = Harness::new(MemoryStore::new(), Harness::at(ScreenId::Dashboard));
    h.char('s');
    let text = h.screen_text();
    assert!(text.contains("Show me a reason (unavailable)"));
    assert!(text.contains("Click the button to see a reason!"));
    assert!(text.contains(FetchError::EmptyContent.user_message()));
}

#[test]
fn random_reason_comes_from_the_list() {
    let store = MemoryStore::new().with_reasons(reasons(4));
    let mut h = Harness::new(store, Harness::at(ScreenId::Dashboard));
    h.char('s');
    let text = h.screen_text();
    assert!(!text.contains("Click the button to see a reason!"));
    assert!((1..=4).any(|i| text.contains(&format!("✨ reason number {i}"))));
}

#[test]
fn reasons_screen_caps_the_list() {
    let store = MemoryStore::new().with_reasons(reasons(12));
    let mut h = Harness::deferred(store, Harness::at(ScreenId::Reasons));
    assert!(h.screen_text().contains("Loading reasons..."));
    h.sim.run_pending_tasks();
    let text = h.screen_text();
    assert!(text.contains("10. ✨ reason number 10"));
    assert!(!text.contains("reason number 11"));
}

#[test]
fn stale_content_is_dropped_after_navigation() {
    let store = MemoryStore::new()
        .with_reasons(reasons(2))
        .with_media(PHOTOS_FOLDER, photos());
    let mut h = Harness::deferred(store, Harness::at(ScreenId::Reasons));
    h.press(KeyCode::Enter);
    assert_eq!(h.app().current(), ScreenId::Memories);
    assert_eq!(h.sim.run_pending_tasks(), 2);
    let text = h.screen_text();
    assert!(text.contains("beach.jpg"));
    assert!(!text.contains("reason number"));
}

#[test]
fn gallery_viewer_replaces_the_shown_photo() {
    let store = MemoryStore::new().with_media(PHOTOS_FOLDER, photos());
    let mut h = Harness::new(store, Harness::at(ScreenId::Memories));
    h.press(KeyCode::Enter);
    assert!(h.screen_text().contains("[ https://example.test/photos/beach.jpg ]"));
    h.press(KeyCode::Escape);
    h.press(KeyCode::Right);
    h.press(KeyCode::Enter);
    let text = h.screen_text();
    assert!(text.contains("[ https://example.test/photos/cafe.jpg ]"));
    assert!(!text.contains("[ https://example.test/photos/beach.jpg ]"));
}

#[test]
fn failed_gallery_shows_message() {
    let store = MemoryStore::new().failing("storage down");
    let mut h = Harness::new(store, Harness::at(ScreenId::Memories));
    h.press(KeyCode::Enter);
    let text = h.screen_text();
    assert!(text.contains(FetchError::FetchFailure(String::new()).user_message()));
    assert!(!text.contains("[ "));
}
