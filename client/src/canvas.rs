use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::Rc;

use leptos::prelude::*;
use rosella_shared::colors::{BLACK, hex_css, rgba_css};
use rosella_shared::{
    CanvasPos, DrawOp, EntityStore, Fill, Frame, Projector, TextMeasure, hit_player,
};
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, PointerEvent,
};

use crate::app::{OnlinePlayers, PulseRequests, ShowClaims};
use crate::config::{CANVAS_HEIGHT, CANVAS_WIDTH, MAP_ASSET_SRC};
use crate::controller::MapController;
use crate::render_loop::FrameLoop;

type BackgroundSlot = Rc<RefCell<Option<HtmlImageElement>>>;

thread_local! {
    static FRAME_LOOP: RefCell<Option<FrameLoop>> = const { RefCell::new(None) };
}

/// CSS color for a fill; opaque fills use the `#rrggbb` spelling.
pub(crate) fn fill_css(fill: Fill) -> String {
    if fill.alpha >= 1.0 {
        hex_css(fill.rgb)
    } else {
        rgba_css(fill.rgb, fill.alpha.max(0.0))
    }
}

/// Replays frames onto a 2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    background: BackgroundSlot,
}

impl CanvasSurface {
    fn new(ctx: CanvasRenderingContext2d, background: BackgroundSlot) -> Self {
        Self { ctx, background }
    }

    pub fn draw(&self, frame: &Frame) {
        for op in &frame.ops {
            self.draw_op(op);
        }
    }

    fn draw_op(&self, op: &DrawOp) {
        let ctx = &self.ctx;
        match op {
            DrawOp::Clear { width, height } => ctx.clear_rect(0.0, 0.0, *width, *height),
            DrawOp::Background { width, height } => {
                // Drawn once decoded; until then the map sits on a blank canvas.
                if let Some(image) = self.background.borrow().as_ref() {
                    ctx.draw_image_with_html_image_element_and_dw_and_dh(
                        image, 0.0, 0.0, *width, *height,
                    )
                    .ok();
                }
            }
            DrawOp::Circle {
                x,
                y,
                radius,
                fill,
                stroke,
            } => {
                ctx.begin_path();
                ctx.arc(*x, *y, radius.max(0.0), 0.0, TAU).ok();
                ctx.set_fill_style_str(&fill_css(*fill));
                ctx.fill();
                if *stroke {
                    ctx.set_line_width(1.0);
                    ctx.set_stroke_style_str(&hex_css(BLACK));
                    ctx.stroke();
                }
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                fill,
            } => {
                ctx.set_fill_style_str(&fill_css(*fill));
                ctx.fill_rect(*x, *y, *width, *height);
            }
            DrawOp::Text {
                x,
                y,
                text,
                font,
                fill,
            } => {
                ctx.set_font(font);
                ctx.set_fill_style_str(&fill_css(*fill));
                ctx.fill_text(text, *x, *y).ok();
            }
            DrawOp::Sprite { x, y, sprite } => {
                ctx.save();
                ctx.translate(*x, *y).ok();
                ctx.begin_path();
                ctx.rect(0.0, 0.0, sprite.width, sprite.height);
                ctx.clip();
                for inner in &sprite.ops {
                    self.draw_op(inner);
                }
                ctx.restore();
            }
        }
    }
}

impl TextMeasure for CanvasSurface {
    fn text_width(&self, font: &str, text: &str) -> f64 {
        self.ctx.save();
        self.ctx.set_font(font);
        let width = self.ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0);
        self.ctx.restore();
        width
    }
}

fn load_background(slot: BackgroundSlot) {
    wasm_bindgen_futures::spawn_local(async move {
        let Ok(image) = HtmlImageElement::new() else {
            web_sys::console::warn_1(&"Failed to create map image element.".into());
            return;
        };
        image.set_src(MAP_ASSET_SRC);
        match wasm_bindgen_futures::JsFuture::from(image.decode()).await {
            Ok(_) => *slot.borrow_mut() = Some(image),
            Err(err) => {
                web_sys::console::warn_1(
                    &format!("Failed to decode map image {MAP_ASSET_SRC}: {err:?}").into(),
                );
            }
        }
    });
}

/// Fixed-size map canvas. Owns the entity store and drives the frame loop.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let OnlinePlayers(players) = expect_context();
    let PulseRequests(pulse_requests) = expect_context();
    let ShowClaims(show_claims) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let store = Rc::new(RefCell::new(EntityStore::new()));
    let background: BackgroundSlot = Rc::new(RefCell::new(None));
    load_background(background.clone());

    Effect::new({
        let store = store.clone();
        move || {
            let Some(canvas_el) = canvas_ref.get() else {
                return;
            };
            let canvas: &HtmlCanvasElement = &canvas_el;
            let Some(ctx) = canvas
                .get_context("2d")
                .ok()
                .flatten()
                .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            else {
                web_sys::console::warn_1(&"Canvas 2D context unavailable.".into());
                return;
            };

            let surface = CanvasSurface::new(ctx, background.clone());
            let mut controller =
                MapController::new(store.clone(), players, pulse_requests, show_claims);
            let frame_loop = FrameLoop::start(move || controller.tick(&surface));
            FRAME_LOOP.with(|slot| {
                // Replacing drops (and cancels) any previous loop.
                *slot.borrow_mut() = Some(frame_loop);
            });
        }
    });

    on_cleanup(|| {
        FRAME_LOOP.with(|slot| slot.borrow_mut().take());
    });

    let on_pointer_move = {
        let store = store.clone();
        move |e: PointerEvent| {
            store
                .borrow_mut()
                .set_cursor(CanvasPos::new(e.offset_x() as f64, e.offset_y() as f64));
        }
    };

    // Clicking a marker pings it, same as its player-list entry.
    let projector = Projector::new(f64::from(CANVAS_WIDTH), f64::from(CANVAS_HEIGHT));
    let on_click = move |e: MouseEvent| {
        let click = CanvasPos::new(e.offset_x() as f64, e.offset_y() as f64);
        let hit = hit_player(click, store.borrow().players(), &projector).map(|p| p.position);
        if let Some(origin) = hit {
            pulse_requests.update(|queue| queue.push(origin));
        }
    };

    view! {
        <canvas
            node_ref=canvas_ref
            width=CANVAS_WIDTH.to_string()
            height=CANVAS_HEIGHT.to_string()
            on:pointermove=on_pointer_move
            on:click=on_click
            style="display: block;"
        />
    }
}
