#![forbid(unsafe_code)]

//! The reveal flow against a JSON document on disk.

use std::fs;
use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use keepsake_app::app::{AppConfig, AppModel};
use keepsake_app::navigation::{NavigationState, ScreenId};
use keepsake_core::ManualClock;
use keepsake_core::event::{Event, KeyCode, KeyEvent};
use keepsake_runtime::ProgramSimulator;
use keepsake_store::JsonFileStore;
use tempfile::TempDir;

const DOCUMENT: &str = r#"{
  "settings": { "config": { "unlockTime": "2025-11-19T23:30:03+05:30" } },
  "reasons": [
    { "id": "r1", "text": "The way you hum while cooking", "icon": "🎶" },
    { "id": "r2", "text": "Your terrible puns" }
  ],
  "media": { "photos": ["https://example.test/photos/first-date.jpg"] }
}"#;

fn simulator(dir: &TempDir, start: NavigationState) -> ProgramSimulator<AppModel> {
    let path = dir.path().join("keepsake.json");
    fs::write(&path, DOCUMENT).unwrap();
    let clock = ManualClock::new(Utc.with_ymd_and_hms(2025, 11, 19, 18, 0, 0).unwrap());
    let model = AppModel::new(
        Arc::new(JsonFileStore::new(path)),
        Arc::new(clock.clone()),
        AppConfig {
            start,
            seed: Some(1),
            ..AppConfig::default()
        },
    );
    let mut sim = ProgramSimulator::new(model).with_clock(clock);
    sim.init();
    sim
}

#[test]
fn unlock_time_with_offset_is_compared_in_utc() {
    let dir = TempDir::new().unwrap();
    let mut sim = simulator(&dir, NavigationState::default());
    assert_eq!(sim.model().current(), ScreenId::Home);
    sim.advance(Duration::from_secs(2));
    assert_eq!(sim.model().current(), ScreenId::Home);
    sim.advance(Duration::from_secs(1));
    assert_eq!(sim.model().current(), ScreenId::Welcome);
}

#[test]
fn reasons_fill_in_default_icon() {
    let dir = TempDir::new().unwrap();
    let mut sim = simulator(&dir, NavigationState::at(ScreenId::Reasons));
    let frame = sim.capture_frame(100, 30);
    assert!(frame.contains(" 1. 🎶 The way you hum while cooking"));
    assert!(frame.contains(" 2. ❤️ Your terrible puns"));
}

#[test]
fn memories_lists_the_photos_folder() {
    let dir = TempDir::new().unwrap();
    let mut sim = simulator(&dir, NavigationState::at(ScreenId::Memories));
    sim.inject_event(Event::Key(KeyEvent::new(KeyCode::Enter)));
    assert!(
        sim.capture_frame(100, 30)
            .contains("[ https://example.test/photos/first-date.jpg ]")
    );
}
