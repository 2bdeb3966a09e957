use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use page_logging::{page_debug, page_info, page_warn};
use search_core::{
    AttributeClaim, BlobRef, ClaimResult, Effect, Msg, SearchRequest, MAX_IN_RESPONSE,
};
use search_engine::{AttrQuery, ClaimRequest, EngineEvent, EngineHandle};

use super::widgets::Widgets;

pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    /// Starts forwarding engine events to `msg_tx` as page messages.
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine };
        runner.spawn_event_loop(msg_tx);
        runner
    }

    /// Applies effects in order. Server work is only enqueued here.
    pub fn run(&self, effects: Vec<Effect>, widgets: &mut Widgets) {
        for effect in effects {
            match effect {
                Effect::SetSearchControlsEnabled(enabled) => widgets.form.set_enabled(enabled),
                Effect::ShowWithAttr {
                    request_id,
                    request,
                } => {
                    page_info!(
                        "ShowWithAttr request_id={} attr={:?} value_len={} fuzzy={}",
                        request_id,
                        request.attribute_name(),
                        request.value.len(),
                        request.fuzzy
                    );
                    self.engine.search(request_id, attr_query(&request));
                }
                Effect::ShowRoots { request_id } => {
                    page_info!("ShowRoots request_id={}", request_id);
                    self.engine
                        .search(request_id, AttrQuery::roots(MAX_IN_RESPONSE));
                }
                Effect::PopulateGrid { items } => widgets.grid.populate(items),
                Effect::GridBigger => widgets.grid.bigger(),
                Effect::GridSmaller => widgets.grid.smaller(),
                Effect::UnselectAll => widgets.grid.unselect_all(),
                Effect::SetCheckedCount(count) => widgets.toolbar.set_checked_count(count),
                Effect::OpenHome { location } => {
                    page_info!("Navigate to {}", location);
                    widgets.navigation = Some(location);
                }
                Effect::CreatePermanode { job_id } => {
                    page_info!("CreatePermanode job_id={}", job_id);
                    self.engine.create_permanode(job_id);
                }
                Effect::AddAttributeClaims {
                    job_id,
                    permanode,
                    claims,
                } => {
                    page_debug!(
                        "AddAttributeClaims job_id={} permanode={} claims={}",
                        job_id,
                        permanode,
                        claims.len()
                    );
                    self.engine.add_claims(
                        job_id,
                        permanode.as_str(),
                        claims.into_iter().map(claim_request).collect(),
                    );
                }
            }
        }
    }

    pub fn shutdown(&self) {
        self.engine.shutdown();
    }

    fn spawn_event_loop(&self, msg_tx: mpsc::Sender<Msg>) {
        let engine = self.engine.clone();
        thread::spawn(move || {
            while !engine.is_shut_down() {
                let Some(event) = engine.recv_timeout(Duration::from_millis(50)) else {
                    continue;
                };
                if msg_tx.send(engine_event_msg(event)).is_err() {
                    break;
                }
            }
        });
    }
}

fn attr_query(request: &SearchRequest) -> AttrQuery {
    AttrQuery {
        attribute: request.attribute_name().to_string(),
        value: request.value.clone(),
        fuzzy: request.fuzzy,
        max: request.limit,
    }
}

fn claim_request(claim: AttributeClaim) -> ClaimRequest {
    ClaimRequest {
        attribute: claim.attribute,
        value: claim.value,
    }
}

fn engine_event_msg(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::SearchCompleted { request_id, result } => Msg::SearchResults {
            request_id,
            result: result
                .map(|found| found.into_iter().map(BlobRef::from).collect())
                .map_err(|err| err.to_string()),
        },
        EngineEvent::PermanodeCreated { job_id, result } => Msg::PermanodeCreated {
            job_id,
            result: result.map(BlobRef::from).map_err(|err| err.to_string()),
        },
        EngineEvent::ClaimSettled {
            job_id,
            claim_index,
            result,
        } => Msg::ClaimSettled {
            job_id,
            claim_index,
            result: match result {
                Ok(_) => ClaimResult::Attached,
                Err(err) => {
                    page_warn!("Job {} claim {} failed: {}", job_id, claim_index, err);
                    ClaimResult::Failed(err.to_string())
                }
            },
        },
    }
}
