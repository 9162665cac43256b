use super::*;

use shared::error::WriteError;

use crate::{
    map::{HeadlessMap, MapOptions},
    memory::InMemoryVenueStore,
};

fn venue(id: &str, name: &str, lat: Option<f64>, lng: Option<f64>) -> Venue {
    Venue {
        id: VenueId::new(id),
        name: name.to_string(),
        address: format!("{name} utca 1"),
        hours: "12:00 - 00:00".to_string(),
        lat,
        lng,
    }
}

fn sample_venues() -> Vec<Venue> {
    vec![
        venue("v1", "Kocsma", Some(47.5), Some(21.6)),
        venue("v2", "Sorozo", Some(47.53), Some(21.62)),
        venue("v3", "Nowhere", None, None),
        venue("v4", "Null Island", Some(0.0), Some(0.0)),
    ]
}

async fn mounted(venues: Vec<Venue>) -> (InMemoryVenueStore, MapSession, HeadlessMap) {
    let settings = MapSettings::default();
    let store = InMemoryVenueStore::with_venues(venues);
    let mut map = HeadlessMap::new(MapOptions::from_settings(&settings));
    let mut session = MapSession::from_settings(&settings);
    let initial = session.mount(&mut map);
    drive(&store, &mut session, &mut map, initial)
        .await
        .expect("initial load");
    (store, session, map)
}

fn pump(session: &mut MapSession, map: &mut HeadlessMap) {
    for event in map.take_events() {
        session.handle_map_event(event, map);
    }
}

fn marker_of(session: &MapSession, id: &str) -> crate::map::MarkerId {
    session
        .markers()
        .marker_for(&VenueId::new(id))
        .expect("marker")
}

#[tokio::test]
async fn initial_load_renders_only_placeable_venues() {
    let (_store, session, map) = mounted(sample_venues()).await;

    assert_eq!(session.fetch_status(), FetchStatus::Loaded);
    assert_eq!(session.venues().len(), 4);
    assert_eq!(session.marker_count(), 2);
    assert_eq!(map.marker_count(), 2);
    assert!(
        session.markers().marker_for(&VenueId::new("v4")).is_none(),
        "0/0 coordinates are treated as missing"
    );
}

#[tokio::test]
async fn empty_store_and_failed_fetch_are_distinguishable() {
    let (_store, session, _map) = mounted(Vec::new()).await;
    assert_eq!(session.fetch_status(), FetchStatus::Loaded);
    assert!(session.venues().is_empty());

    let settings = MapSettings::default();
    let store = InMemoryVenueStore::new();
    store.fail_fetches(Some("offline")).await;
    let mut map = HeadlessMap::new(MapOptions::from_settings(&settings));
    let mut session = MapSession::from_settings(&settings);
    let initial = session.mount(&mut map);

    let err = drive(&store, &mut session, &mut map, initial)
        .await
        .expect_err("fetch fails");
    assert!(matches!(err, StoreError::Fetch(_)));
    assert_eq!(session.fetch_status(), FetchStatus::Failed);
    assert!(session.venues().is_empty());
    assert!(session.take_alerts().is_empty(), "fetch failures are not alerts");
}

#[tokio::test]
async fn failed_refresh_after_delete_empties_list_and_markers() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v1"), &mut map);
    let command = session
        .request_delete(&VenueId::new("v1"), &mut |_: &str| true)
        .expect("confirmed");

    let outcome = execute(&store, command).await;
    let refresh = session
        .apply_outcome(outcome, &mut map)
        .expect("refresh follows delete");
    store.fail_fetches(Some("offline")).await;
    let outcome = execute(&store, refresh).await;
    assert!(session.apply_outcome(outcome, &mut map).is_none());

    assert_eq!(session.fetch_status(), FetchStatus::Failed);
    assert!(session.venues().is_empty());
    assert!(session.venue(&VenueId::new("v1")).is_none());
    assert_eq!(session.marker_count(), 0);
    assert_eq!(map.marker_count(), 0);
    assert!(session.selection().is_none());
    assert!(session.take_alerts().is_empty());
}

#[tokio::test]
async fn failed_refresh_drops_stale_selection() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v2"), &mut map);
    store.fail_fetches(Some("offline")).await;

    let err = drive(&store, &mut session, &mut map, StoreCommand::Refresh)
        .await
        .expect_err("fetch fails");
    assert!(matches!(err, StoreError::Fetch(_)));
    assert!(session.selection().is_none());
    assert!(!session.start_editing());

    store.fail_fetches(None).await;
    drive(&store, &mut session, &mut map, StoreCommand::Refresh)
        .await
        .expect("recovered");
    assert_eq!(session.fetch_status(), FetchStatus::Loaded);
    assert_eq!(map.marker_count(), 2);
}

#[tokio::test]
async fn placing_click_after_marker_selection_closes_the_detail_panel() {
    let (_store, mut session, mut map) = mounted(sample_venues()).await;
    session.toggle_add();
    let event = map
        .click_marker(marker_of(&session, "v1"))
        .expect("listening marker");
    session.handle_map_event(event, &mut map);
    assert_eq!(session.selection().map(|v| v.id.as_str()), Some("v1"));

    let click = map.click(LngLat::new(21.0, 47.0));
    session.handle_map_event(click, &mut map);

    assert_eq!(session.mode().label(), "creating");
    assert!(session.selection().is_none());
}

#[tokio::test]
async fn add_flow_places_draft_and_saves_composed_hours() {
    let (store, mut session, mut map) = mounted(Vec::new()).await;

    assert!(session.toggle_add());
    assert_eq!(session.mode(), &Mode::Placing);

    let click = map.click(LngLat::new(21.0, 47.0));
    session.handle_map_event(click, &mut map);

    let draft = session.mode().draft().expect("draft");
    assert_eq!(draft.editing, None);
    assert_eq!(draft.location, Some(LngLat::new(21.0, 47.0)));
    assert_eq!(draft.form.hours_start, "12:00");
    assert_eq!(draft.form.hours_end, "00:00");
    assert!(!session.mode().is_placing());

    session.form_mut().expect("form").name = "Pub X".to_string();
    let command = session.submit_draft().expect("valid draft");
    drive(&store, &mut session, &mut map, command)
        .await
        .expect("save");

    let stored = store.venues().await;
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].name, "Pub X");
    assert_eq!(stored[0].hours, "12:00 - 00:00");
    assert_eq!(stored[0].location(), Some(LngLat::new(21.0, 47.0)));

    assert_eq!(session.mode(), &Mode::Idle);
    assert!(session.selection().is_none());
    assert_eq!(session.venues().len(), 1, "list re-fetched after save");
    assert_eq!(session.marker_count(), 1);
    assert_eq!(store.calls().await.list, 2);
}

#[tokio::test]
async fn editing_a_saved_venue_reconstructs_its_form() {
    let (store, mut session, mut map) = mounted(Vec::new()).await;
    session.toggle_add();
    let click = map.click(LngLat::new(21.0, 47.0));
    session.handle_map_event(click, &mut map);
    session.form_mut().expect("form").name = "Pub X".to_string();
    let command = session.submit_draft().expect("valid");
    drive(&store, &mut session, &mut map, command).await.expect("save");

    let id = session.venues()[0].id.clone();
    assert!(session.select(&id, &mut map));
    assert!(session.start_editing());

    assert!(session.selection().is_none());
    assert_eq!(session.mode().editing_id(), Some(&id));
    let draft = session.mode().draft().expect("draft");
    assert_eq!(draft.form.name, "Pub X");
    assert_eq!(draft.form.hours_start, "12:00");
    assert_eq!(draft.form.hours_end, "00:00");
    assert_eq!(draft.location, Some(LngLat::new(21.0, 47.0)));
}

#[tokio::test]
async fn marker_click_selects_and_focuses_at_zoom_16() {
    let (_store, mut session, mut map) = mounted(sample_venues()).await;
    let marker = marker_of(&session, "v1");

    let event = map.click_marker(marker).expect("marker listens for clicks");
    session.handle_map_event(event, &mut map);

    let selected = session.selection().expect("selected");
    assert_eq!(selected.name, "Kocsma");
    assert_eq!(selected.address, "Kocsma utca 1");
    assert_eq!(selected.hours, "12:00 - 00:00");

    let flight = map.last_flight().expect("flight");
    assert_eq!(flight.center, LngLat::new(21.6, 47.5));
    assert_eq!(flight.zoom, 16.0);

    pump(&mut session, &mut map);
    assert_eq!(session.viewport().center, LngLat::new(21.6, 47.5));
    assert_eq!(
        session.readout(),
        "Longitude: 21.6000 | Latitude: 47.5000 | Zoom: 16.00"
    );
}

#[tokio::test]
async fn marker_click_while_placing_never_places_a_draft() {
    let (_store, mut session, mut map) = mounted(sample_venues()).await;
    session.toggle_add();

    let event = map
        .click_marker(marker_of(&session, "v2"))
        .expect("listening marker");
    session.handle_map_event(event, &mut map);

    assert!(session.mode().draft().is_none());
    assert_eq!(session.selection().map(|v| v.id.as_str()), Some("v2"));
}

#[tokio::test]
async fn selecting_closes_an_open_form() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.toggle_add();
    let click = map.click(LngLat::new(21.0, 47.0));
    session.handle_map_event(click, &mut map);
    assert!(session.mode().draft().is_some());

    session.select(&VenueId::new("v2"), &mut map);

    assert_eq!(session.mode(), &Mode::Idle);
    assert_eq!(store.calls().await.writes(), 0);
}

#[tokio::test]
async fn user_pan_is_mirrored_without_commanding_the_widget() {
    let (_store, mut session, mut map) = mounted(Vec::new()).await;

    let event = map.pan(LngLat::new(19.04, 47.49), 11.5);
    session.handle_map_event(event, &mut map);

    assert_eq!(session.viewport().center, LngLat::new(19.04, 47.49));
    assert_eq!(session.viewport().zoom, 11.5);
    assert!(map.flights().is_empty());
}

#[tokio::test]
async fn reset_flies_home_and_clears_selection() {
    let (_store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v1"), &mut map);

    session.reset_view(&mut map);

    assert!(session.selection().is_none());
    let flight = map.last_flight().expect("flight");
    assert_eq!(flight.center, LngLat::new(21.62601, 47.53184));
    assert_eq!(flight.zoom, 14.01);
}

#[tokio::test]
async fn switching_between_editing_and_placing_discards_draft_without_store_calls() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v1"), &mut map);
    session.start_editing();
    session.form_mut().expect("form").name = "Changed".into();

    assert!(session.toggle_add());
    assert_eq!(session.mode(), &Mode::Placing);
    assert!(session.mode().editing_id().is_none());

    let click = map.click(LngLat::new(21.0, 47.0));
    session.handle_map_event(click, &mut map);
    assert_eq!(session.mode().draft().expect("draft").form.name, "");

    session.cancel_draft();
    assert_eq!(session.mode(), &Mode::Idle);
    assert_eq!(store.calls().await.writes(), 0);
    assert_eq!(store.venues().await[0].name, "Kocsma");
}

#[tokio::test]
async fn edit_save_updates_fields_but_not_coordinates() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v1"), &mut map);
    session.start_editing();
    {
        let form = session.form_mut().expect("form");
        form.name = "  Kocsma Uj  ".into();
        form.hours_start = "16:00".into();
        form.hours_end = "02:00".into();
    }

    let command = session.submit_draft().expect("valid");
    match &command {
        StoreCommand::Update { id, fields } => {
            assert_eq!(id.as_str(), "v1");
            assert_eq!(fields.location, None);
            assert_eq!(fields.name, "Kocsma Uj");
        }
        other => panic!("unexpected command: {other:?}"),
    }
    drive(&store, &mut session, &mut map, command).await.expect("save");

    let updated = session.venue(&VenueId::new("v1")).expect("venue").clone();
    assert_eq!(updated.hours, "16:00 - 02:00");
    assert_eq!(updated.location(), Some(LngLat::new(21.6, 47.5)));
    assert_eq!(session.mode(), &Mode::Idle);
}

#[tokio::test]
async fn submit_requires_name_and_location() {
    let (_store, mut session, mut map) = mounted(sample_venues()).await;
    assert_eq!(session.submit_draft(), Err(SubmitError::NoDraft));

    session.toggle_add();
    let click = map.click(LngLat::new(21.0, 47.0));
    session.handle_map_event(click, &mut map);
    session.form_mut().expect("form").name = "   ".into();
    assert_eq!(session.submit_draft(), Err(SubmitError::EmptyName));

    session.select(&VenueId::new("v3"), &mut map);
    session.start_editing();
    assert_eq!(session.submit_draft(), Err(SubmitError::MissingLocation));
}

#[tokio::test]
async fn failed_save_keeps_the_draft_for_retry() {
    let (store, mut session, mut map) = mounted(Vec::new()).await;
    session.toggle_add();
    let click = map.click(LngLat::new(21.0, 47.0));
    session.handle_map_event(click, &mut map);
    session.form_mut().expect("form").name = "Pub X".into();
    store.fail_writes(Some("permission denied")).await;

    let command = session.submit_draft().expect("valid");
    let err = drive(&store, &mut session, &mut map, command.clone())
        .await
        .expect_err("write fails");
    assert!(matches!(err, StoreError::Write(WriteError::Transport { .. })));

    let draft = session.mode().draft().expect("draft still open");
    assert_eq!(draft.form.name, "Pub X");
    assert!(session.take_alerts().is_empty());

    store.fail_writes(None).await;
    drive(&store, &mut session, &mut map, command).await.expect("retry");
    assert_eq!(session.venues().len(), 1);
}

#[tokio::test]
async fn declined_delete_issues_no_store_call() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v1"), &mut map);

    let mut prompts = Vec::new();
    let command = session.request_delete(&VenueId::new("v1"), &mut |prompt: &str| {
        prompts.push(prompt.to_string());
        false
    });

    assert!(command.is_none());
    assert_eq!(prompts, vec!["Are you sure you want to delete \"Kocsma\"?"]);
    assert_eq!(session.selection().map(|v| v.id.as_str()), Some("v1"));
    assert_eq!(store.calls().await.delete, 0);
}

#[tokio::test]
async fn confirmed_delete_clears_selection_and_removes_marker() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v1"), &mut map);
    let doomed = marker_of(&session, "v1");
    let survivor_at = LngLat::new(21.62, 47.53);

    let command = session
        .request_delete(&VenueId::new("v1"), &mut |_: &str| true)
        .expect("confirmed");
    drive(&store, &mut session, &mut map, command).await.expect("delete");

    assert!(session.selection().is_none());
    assert!(session.venue(&VenueId::new("v1")).is_none());
    assert_eq!(map.marker_count(), 1);
    assert_eq!(map.listener_count(doomed), 0);
    assert!(map.marker_at(survivor_at).is_some());
}

#[tokio::test]
async fn failed_delete_raises_alert_and_keeps_state() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.select(&VenueId::new("v1"), &mut map);
    store.fail_writes(Some("unavailable")).await;

    let command = session
        .request_delete(&VenueId::new("v1"), &mut |_: &str| true)
        .expect("confirmed");
    assert!(drive(&store, &mut session, &mut map, command).await.is_err());

    let alerts = session.take_alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("unavailable"), "{}", alerts[0]);
    assert_eq!(session.selection().map(|v| v.id.as_str()), Some("v1"));
    assert_eq!(session.venues().len(), 4);
}

#[tokio::test]
async fn deleting_the_last_venue_removes_the_last_marker() {
    let (store, mut session, mut map) =
        mounted(vec![venue("only", "Only", Some(47.5), Some(21.6))]).await;
    assert_eq!(map.marker_count(), 1);

    let command = session
        .request_delete(&VenueId::new("only"), &mut |_: &str| true)
        .expect("confirmed");
    drive(&store, &mut session, &mut map, command).await.expect("delete");

    assert_eq!(map.marker_count(), 0);
    assert_eq!(session.marker_count(), 0);
}

#[tokio::test]
async fn repeated_refreshes_keep_one_listener_per_marker() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    for _ in 0..3 {
        drive(&store, &mut session, &mut map, StoreCommand::Refresh)
            .await
            .expect("refresh");
    }

    assert_eq!(map.marker_count(), 2);
    for (marker, _) in map.markers() {
        assert_eq!(map.listener_count(marker), 1);
    }
}

#[tokio::test]
async fn outcomes_after_unmount_are_dropped() {
    let (store, mut session, mut map) = mounted(sample_venues()).await;
    session.unmount(&mut map);
    assert!(map.is_destroyed());
    assert_eq!(map.marker_count(), 0);

    let outcome = execute(&store, StoreCommand::Refresh).await;
    assert!(session.apply_outcome(outcome, &mut map).is_none());
    assert_eq!(map.marker_count(), 0);
    assert!(!session.is_mounted());
}
