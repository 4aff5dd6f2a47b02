use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use rosella_shared::render::render_frame;
use rosella_shared::{
    EntityStore, Player, PollOutcome, Poller, Projector, RenderStyle, Scheduler, TaskId, WorldPos,
};

use crate::canvas::CanvasSurface;
use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH, CLAIMS_FEED_URL, PLAYERS_FEED_URL, POLL_INTERVAL_MS};
use crate::feed::HttpFeedSource;
use crate::render_loop::PerformanceClock;

/// Ties the store to the network and the screen: one call to `tick` per
/// animation frame runs whatever the scheduler says is due.
pub struct MapController {
    store: Rc<RefCell<EntityStore>>,
    scheduler: Scheduler<PerformanceClock>,
    poll_task: TaskId,
    render_task: TaskId,
    poller: Poller,
    source: Rc<HttpFeedSource>,
    projector: Projector,
    style: RenderStyle,
    players: RwSignal<Vec<Player>>,
    pulse_requests: RwSignal<Vec<WorldPos>>,
    show_claims: RwSignal<bool>,
}

impl MapController {
    pub fn new(
        store: Rc<RefCell<EntityStore>>,
        players: RwSignal<Vec<Player>>,
        pulse_requests: RwSignal<Vec<WorldPos>>,
        show_claims: RwSignal<bool>,
    ) -> Self {
        let mut scheduler = Scheduler::new(PerformanceClock::new());
        let poll_task = scheduler.every(POLL_INTERVAL_MS);
        let render_task = scheduler.every_frame();
        Self {
            store,
            scheduler,
            poll_task,
            render_task,
            poller: Poller::new(CLAIMS_FEED_URL.is_some()),
            source: Rc::new(HttpFeedSource {
                players_url: PLAYERS_FEED_URL,
                claims_url: CLAIMS_FEED_URL,
            }),
            projector: Projector::new(f64::from(CANVAS_WIDTH), f64::from(CANVAS_HEIGHT)),
            style: RenderStyle::default(),
            players,
            pulse_requests,
            show_claims,
        }
    }

    pub fn tick(&mut self, surface: &CanvasSurface) {
        self.drain_pulse_requests();
        for task in self.scheduler.due() {
            if task == self.poll_task {
                self.spawn_poll();
            } else if task == self.render_task {
                self.render(surface);
            }
        }
    }

    fn drain_pulse_requests(&self) {
        if self.pulse_requests.with_untracked(Vec::is_empty) {
            return;
        }
        let requests = self
            .pulse_requests
            .try_update(std::mem::take)
            .unwrap_or_default();
        let mut store = self.store.borrow_mut();
        for origin in requests {
            store.push_pulse(origin);
        }
    }

    /// Polls are not cancelled; if two overlap, the later completion wins.
    fn spawn_poll(&self) {
        let store = Rc::clone(&self.store);
        let source = Rc::clone(&self.source);
        let poller = self.poller;
        let players = self.players;
        wasm_bindgen_futures::spawn_local(async move {
            let result = poller.poll_once(&*source).await;
            let outcome = store.borrow_mut().apply_poll(result);
            match outcome {
                PollOutcome::Applied {
                    players: online,
                    claims,
                } => {
                    let store = store.borrow();
                    if store.generation() == 1 {
                        web_sys::console::info_1(
                            &format!("First feed poll applied: {online} players, {claims} claims")
                                .into(),
                        );
                    }
                    players.set(store.players().to_vec());
                }
                PollOutcome::Retained {
                    error,
                    players: kept,
                    ..
                } => {
                    web_sys::console::warn_1(
                        &format!("Feed poll failed, keeping {kept} players: {error}").into(),
                    );
                }
            }
        });
    }

    fn render(&self, surface: &CanvasSurface) {
        let style = RenderStyle {
            show_claims: self.show_claims.get_untracked(),
            ..self.style
        };
        let frame = render_frame(
            &mut self.store.borrow_mut(),
            &self.projector,
            surface,
            &style,
        );
        surface.draw(&frame);
    }
}
