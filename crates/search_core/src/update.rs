use crate::{
    translate_query, AppState, ClaimResult, Effect, GridEvent, JobId, Msg, SetCreationOutcome,
    ToolbarEvent,
};

/// Where the Home toolbar button navigates.
pub const HOME_LOCATION: &str = "./index.html";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::SearchInputChanged(text) => {
            state.set_search_text(text);
            Vec::new()
        }
        Msg::SearchSubmitted => submit_search(&mut state),
        Msg::Toolbar(event) => toolbar(&mut state, event),
        Msg::Grid(GridEvent::ItemsChosen(checked)) => {
            let count = checked.len();
            state.set_checked(checked);
            vec![Effect::SetCheckedCount(count)]
        }
        Msg::SearchResults { request_id, result } => {
            if !state.is_latest_request(request_id) {
                return (state, Vec::new());
            }
            match result {
                Ok(items) => {
                    state.apply_results(items.clone());
                    vec![Effect::PopulateGrid { items }]
                }
                Err(error) => {
                    state.apply_search_error(error);
                    Vec::new()
                }
            }
        }
        Msg::PermanodeCreated { job_id, result } => permanode_created(&mut state, job_id, result),
        Msg::ClaimSettled {
            job_id,
            claim_index,
            result,
        } => claim_settled(&mut state, job_id, claim_index, result),
    };

    (state, effects)
}

// The controls are disabled and re-enabled around a dispatch that only
// enqueues the query; they are enabled again before any result arrives, so
// this does not prevent a second submission while a search is in flight.
fn submit_search(state: &mut AppState) -> Vec<Effect> {
    let request = translate_query(state.search_text());
    let request_id = state.begin_search(Some(request.clone()));
    vec![
        Effect::SetSearchControlsEnabled(false),
        Effect::ShowWithAttr {
            request_id,
            request,
        },
        Effect::SetSearchControlsEnabled(true),
    ]
}

fn toolbar(state: &mut AppState, event: ToolbarEvent) -> Vec<Effect> {
    match event {
        ToolbarEvent::Bigger => vec![Effect::GridBigger],
        ToolbarEvent::Smaller => vec![Effect::GridSmaller],
        ToolbarEvent::Roots => {
            let request_id = state.begin_search(None);
            vec![Effect::ShowRoots { request_id }]
        }
        ToolbarEvent::Home => vec![Effect::OpenHome {
            location: HOME_LOCATION.to_string(),
        }],
        ToolbarEvent::CreateSetFromChecked => {
            let job_id = state.start_job();
            vec![Effect::CreatePermanode { job_id }]
        }
    }
}

fn permanode_created(
    state: &mut AppState,
    job_id: JobId,
    result: Result<crate::BlobRef, String>,
) -> Vec<Effect> {
    let Some(job) = state.job_mut(job_id) else {
        return Vec::new();
    };
    match result {
        Ok(permanode) => match job.attach_permanode(permanode.clone()) {
            Some(claims) => vec![Effect::AddAttributeClaims {
                job_id,
                permanode,
                claims,
            }],
            None => Vec::new(),
        },
        Err(reason) => match job.fail_permanode(reason) {
            Some(outcome) => finalize(state, job_id, outcome),
            None => Vec::new(),
        },
    }
}

fn claim_settled(
    state: &mut AppState,
    job_id: JobId,
    claim_index: usize,
    result: ClaimResult,
) -> Vec<Effect> {
    let Some(job) = state.job_mut(job_id) else {
        return Vec::new();
    };
    match job.settle(claim_index, result) {
        Some(outcome) => finalize(state, job_id, outcome),
        None => Vec::new(),
    }
}

// Runs once per job. A complete set clears the selection; an incomplete one
// keeps it so the same items can be retried.
fn finalize(state: &mut AppState, job_id: JobId, outcome: SetCreationOutcome) -> Vec<Effect> {
    let created = outcome.is_created();
    state.finish_job(job_id, outcome);
    if !created {
        return Vec::new();
    }
    state.clear_checked();
    vec![
        Effect::UnselectAll,
        Effect::SetCheckedCount(state.checked().len()),
    ]
}
