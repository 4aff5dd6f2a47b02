use std::cell::RefCell;

use gloo_storage::Storage;
use leptos::prelude::*;
use rosella_shared::{Player, WorldPos};

use crate::canvas::MapCanvas;
use crate::config::SETTINGS_KEY;
use crate::player_list::PlayerList;

/// Online players of the latest applied poll, in feed order.
#[derive(Clone, Copy)]
pub(crate) struct OnlinePlayers(pub RwSignal<Vec<Player>>);
/// Pulse origins queued by the player list, drained by the frame loop.
#[derive(Clone, Copy)]
pub(crate) struct PulseRequests(pub RwSignal<Vec<WorldPos>>);
#[derive(Clone, Copy)]
pub(crate) struct ShowClaims(pub RwSignal<bool>);

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

#[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    show_claims: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self { show_claims: true }
    }
}

/// Root application component. Provides global reactive signals via context.
#[component]
pub fn App() -> impl IntoView {
    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();
    let players: RwSignal<Vec<Player>> = RwSignal::new(Vec::new());
    let pulse_requests: RwSignal<Vec<WorldPos>> = RwSignal::new(Vec::new());
    let show_claims: RwSignal<bool> = RwSignal::new(saved.show_claims);

    provide_context(OnlinePlayers(players));
    provide_context(PulseRequests(pulse_requests));
    provide_context(ShowClaims(show_claims));

    // Persist settings on change
    Effect::new(move || {
        let settings = Settings {
            show_claims: show_claims.get(),
        };
        let _ = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings);
    });

    // Keyboard shortcuts
    Effect::new(move || {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::*;

        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                if e.ctrl_key() || e.meta_key() || e.alt_key() {
                    return;
                }
                let target_tag = e
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
                    .map(|el| el.tag_name())
                    .unwrap_or_default();
                if target_tag == "INPUT" || target_tag == "TEXTAREA" {
                    return;
                }
                match e.key().as_str() {
                    "c" | "C" => show_claims.update(|v| *v = !*v),
                    _ => {}
                }
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    view! {
        <div class="rosella-map" style="display: flex; gap: 16px; align-items: flex-start;">
            <MapCanvas />
            <PlayerList />
        </div>
    }
}
