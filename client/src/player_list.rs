use leptos::prelude::*;
use rosella_shared::Rgb;
use rosella_shared::colors::hex_css;

use crate::app::{OnlinePlayers, PulseRequests};

pub(crate) fn entry_style(color: Rgb) -> String {
    format!("border-left: 5px solid {}; cursor: pointer;", hex_css(color))
}

/// One entry per online player, rebuilt whenever a poll lands. Clicking an
/// entry pings that player's position on the map.
#[component]
pub fn PlayerList() -> impl IntoView {
    let OnlinePlayers(players) = expect_context();
    let PulseRequests(pulse_requests) = expect_context();

    view! {
        <ul class="player-list">
            {move || {
                players
                    .get()
                    .into_iter()
                    .map(|player| {
                        let origin = player.position;
                        view! {
                            <li
                                style=entry_style(player.color)
                                on:click=move |_| pulse_requests.update(|queue| queue.push(origin))
                            >
                                {player.name}
                            </li>
                        }
                    })
                    .collect_view()
            }}
        </ul>
    }
}
