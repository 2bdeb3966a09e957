use std::sync::mpsc;

use page_logging::page_info;
use search_core::{update, AppState, AppViewModel, Msg};
use search_engine::EngineHandle;

use super::effects::EffectRunner;
use super::events::Subscription;
use super::widgets::{FormEvent, Widgets};

/// Lifecycle driven by whoever owns the component.
pub trait Component {
    /// Called once the component is on screen; wires up child events.
    fn enter_document(&mut self);
    /// Called when the component leaves the screen; drops child listeners.
    fn exit_document(&mut self);
    /// Releases everything, including in-flight server work.
    fn dispose(&mut self);
}

/// The permanode search page: search form, toolbar and results grid.
pub struct SearchPage {
    state: AppState,
    widgets: Widgets,
    runner: EffectRunner,
    msg_tx: mpsc::Sender<Msg>,
    msg_rx: mpsc::Receiver<Msg>,
    subscriptions: Vec<Subscription>,
    disposed: bool,
}

impl SearchPage {
    pub fn new(engine: EngineHandle) -> Self {
        let (msg_tx, msg_rx) = mpsc::channel();
        let runner = EffectRunner::new(engine, msg_tx.clone());
        Self {
            state: AppState::new(),
            widgets: Widgets::default(),
            runner,
            msg_tx,
            msg_rx,
            subscriptions: Vec::new(),
            disposed: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        self.state.view()
    }

    pub fn widgets(&self) -> &Widgets {
        &self.widgets
    }

    pub fn widgets_mut(&mut self) -> &mut Widgets {
        &mut self.widgets
    }

    pub fn is_in_document(&self) -> bool {
        !self.subscriptions.is_empty()
    }

    /// Applies every queued message. Returns the view if it changed.
    pub fn process_pending_messages(&mut self) -> Option<AppViewModel> {
        let inbox: Vec<Msg> = self.msg_rx.try_iter().collect();
        let mut changed = false;
        for msg in inbox {
            changed |= self.dispatch_msg(msg);
        }
        changed.then(|| self.state.view())
    }

    fn dispatch_msg(&mut self, msg: Msg) -> bool {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;
        let had_effects = !effects.is_empty();
        self.runner.run(effects, &mut self.widgets);
        was_dirty || had_effects
    }
}

impl Component for SearchPage {
    fn enter_document(&mut self) {
        if self.disposed || self.is_in_document() {
            return;
        }

        let tx = self.msg_tx.clone();
        self.subscriptions
            .push(self.widgets.toolbar.events.subscribe(move |event| {
                let _ = tx.send(Msg::Toolbar(*event));
            }));

        let tx = self.msg_tx.clone();
        self.subscriptions
            .push(self.widgets.grid.events.subscribe(move |event| {
                let _ = tx.send(Msg::Grid(event.clone()));
            }));

        let tx = self.msg_tx.clone();
        self.subscriptions
            .push(self.widgets.form.events.subscribe(move |event| {
                let msg = match event {
                    FormEvent::Changed(text) => Msg::SearchInputChanged(text.clone()),
                    FormEvent::Submitted => Msg::SearchSubmitted,
                };
                let _ = tx.send(msg);
            }));

        page_info!("Search page entered document");
    }

    fn exit_document(&mut self) {
        self.subscriptions.clear();
    }

    fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.exit_document();
        self.runner.shutdown();
        self.disposed = true;
        page_info!("Search page disposed");
    }
}

impl Drop for SearchPage {
    fn drop(&mut self) {
        self.dispose();
    }
}
