use std::sync::Once;

use search_core::{
    translate_query, update, AppState, BlobRef, Effect, GridEvent, Msg, ToolbarEvent,
    HOME_LOCATION,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(page_logging::initialize_for_tests);
}

fn submit(state: AppState, input: &str) -> (AppState, Vec<Effect>) {
    let (state, _) = update(state, Msg::SearchInputChanged(input.to_string()));
    update(state, Msg::SearchSubmitted)
}

fn refs(values: &[&str]) -> Vec<BlobRef> {
    values.iter().copied().map(BlobRef::from).collect()
}

#[test]
fn submit_wraps_dispatch_in_disable_enable() {
    init_logging();
    let (mut state, effects) = submit(AppState::new(), "tag:vacation");

    assert_eq!(
        effects,
        vec![
            Effect::SetSearchControlsEnabled(false),
            Effect::ShowWithAttr {
                request_id: 1,
                request: translate_query("tag:vacation"),
            },
            Effect::SetSearchControlsEnabled(true),
        ]
    );
    let view = state.view();
    assert_eq!(view.last_search, Some(translate_query("tag:vacation")));
    assert!(state.consume_dirty());
}

#[test]
fn back_to_back_submits_both_dispatch() {
    init_logging();
    let (state, first) = submit(AppState::new(), "sunset");
    let (_state, second) = update(state, Msg::SearchSubmitted);

    assert_eq!(first.len(), 3);
    assert_eq!(second.len(), 3);
    assert!(matches!(
        second[1],
        Effect::ShowWithAttr { request_id: 2, .. }
    ));
}

#[test]
fn latest_results_populate_grid() {
    init_logging();
    let (state, _) = submit(AppState::new(), "sunset");
    let items = refs(&["sha224-aa", "sha224-bb"]);

    let (state, effects) = update(
        state,
        Msg::SearchResults {
            request_id: 1,
            result: Ok(items.clone()),
        },
    );

    assert_eq!(
        effects,
        vec![Effect::PopulateGrid {
            items: items.clone()
        }]
    );
    assert_eq!(state.view().results, items);
    assert_eq!(state.view().search_error, None);
}

#[test]
fn stale_results_are_dropped() {
    init_logging();
    let (state, _) = submit(AppState::new(), "first");
    let (state, _) = submit(state, "second");

    let (state, effects) = update(
        state,
        Msg::SearchResults {
            request_id: 1,
            result: Ok(refs(&["sha224-old"])),
        },
    );

    assert!(effects.is_empty());
    assert!(state.view().results.is_empty());
}

#[test]
fn failed_search_keeps_previous_results() {
    init_logging();
    let (state, _) = submit(AppState::new(), "first");
    let (state, _) = update(
        state,
        Msg::SearchResults {
            request_id: 1,
            result: Ok(refs(&["sha224-kept"])),
        },
    );
    let (state, _) = submit(state, "second");
    let (state, effects) = update(
        state,
        Msg::SearchResults {
            request_id: 2,
            result: Err("http status 500".to_string()),
        },
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.results, refs(&["sha224-kept"]));
    assert_eq!(view.search_error.as_deref(), Some("http status 500"));
}

#[test]
fn toolbar_events_map_to_grid_effects() {
    init_logging();
    let state = AppState::new();

    let (state, effects) = update(state, Msg::Toolbar(ToolbarEvent::Bigger));
    assert_eq!(effects, vec![Effect::GridBigger]);

    let (state, effects) = update(state, Msg::Toolbar(ToolbarEvent::Smaller));
    assert_eq!(effects, vec![Effect::GridSmaller]);

    let (state, effects) = update(state, Msg::Toolbar(ToolbarEvent::Roots));
    assert_eq!(effects, vec![Effect::ShowRoots { request_id: 1 }]);
    assert_eq!(state.view().last_search, None);

    let (_state, effects) = update(state, Msg::Toolbar(ToolbarEvent::Home));
    assert_eq!(
        effects,
        vec![Effect::OpenHome {
            location: HOME_LOCATION.to_string()
        }]
    );
}

#[test]
fn chosen_items_update_checked_count() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::Grid(GridEvent::ItemsChosen(refs(&["sha224-a", "sha224-b"]))),
    );

    assert_eq!(effects, vec![Effect::SetCheckedCount(2)]);
    assert_eq!(state.view().checked_count, 2);

    let (state, effects) = update(state, Msg::Grid(GridEvent::ItemsChosen(Vec::new())));
    assert_eq!(effects, vec![Effect::SetCheckedCount(0)]);
    assert_eq!(state.view().checked_count, 0);
}
