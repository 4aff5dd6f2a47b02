use crate::entity::Player;
use crate::projection::{CanvasPos, PULSE_ANCHOR, Projector, WorldOffset};
use crate::sprite::{DrawOp, Fill, TextMeasure, pulse_sprite, tooltip_sprite};
use crate::store::EntityStore;

pub const MARKER_RADIUS: f64 = 5.0;
/// Cursor distance, in pixels, under which a player's name tag shows.
pub const TOOLTIP_RADIUS: f64 = 20.0;
pub const CLAIM_RADIUS: f64 = 25.0;
pub const CLAIM_ALPHA: f64 = 0.25;

/// Per-layer drawing knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStyle {
    pub claim_offset: WorldOffset,
    pub pulse_offset: WorldOffset,
    pub show_claims: bool,
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            claim_offset: WorldOffset::default(),
            pulse_offset: PULSE_ANCHOR,
            show_claims: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Proximity {
    pub player_index: usize,
    pub distance: f64,
}

/// Ordered display list for one render tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub width: f64,
    pub height: f64,
    pub ops: Vec<DrawOp>,
}

/// Player whose projected marker is nearest the cursor. Ties keep the earlier
/// player.
pub fn closest_player(
    cursor: CanvasPos,
    players: &[Player],
    projector: &Projector,
) -> Option<Proximity> {
    players
        .iter()
        .enumerate()
        .map(|(player_index, player)| Proximity {
            player_index,
            distance: cursor.distance_to(projector.world_to_canvas(player.position)),
        })
        .fold(None, |best: Option<Proximity>, candidate| match best {
            Some(best) if best.distance <= candidate.distance => Some(best),
            _ => Some(candidate),
        })
}

/// Player under a click at `cursor`: the nearest marker, if it is within
/// [`TOOLTIP_RADIUS`].
pub fn hit_player<'a>(
    cursor: CanvasPos,
    players: &'a [Player],
    projector: &Projector,
) -> Option<&'a Player> {
    closest_player(cursor, players, projector)
        .filter(|hit| hit.distance < TOOLTIP_RADIUS)
        .and_then(|hit| players.get(hit.player_index))
}

/// Build the frame for the current store contents and age pulses by one tick.
///
/// Layers, bottom to top: background, player markers, name tags, claim radii,
/// pulses. Every player within [`TOOLTIP_RADIUS`] of the cursor gets a tag.
pub fn render_frame(
    store: &mut EntityStore,
    projector: &Projector,
    measure: &dyn TextMeasure,
    style: &RenderStyle,
) -> Frame {
    let (width, height) = (projector.width, projector.height);
    let cursor = store.cursor();
    let mut ops = vec![
        DrawOp::Clear { width, height },
        DrawOp::Background { width, height },
    ];

    let projected: Vec<CanvasPos> = store
        .players()
        .iter()
        .map(|player| projector.world_to_canvas(player.position))
        .collect();
    let closest = closest_player(cursor, store.players(), projector);

    for (player, pos) in store.players().iter().zip(&projected) {
        ops.push(DrawOp::Circle {
            x: pos.x,
            y: pos.y,
            radius: MARKER_RADIUS,
            fill: Fill::opaque(player.color),
            stroke: true,
        });
    }

    for (player, pos) in store.players().iter().zip(&projected) {
        if cursor.distance_to(*pos) < TOOLTIP_RADIUS && closest.is_some() {
            ops.push(DrawOp::Sprite {
                x: cursor.x,
                y: cursor.y,
                sprite: tooltip_sprite(&player.name, player.color, measure),
            });
        }
    }

    if style.show_claims {
        for claim in store.claims() {
            let pos = projector.world_to_canvas_offset(claim.position, style.claim_offset);
            ops.push(DrawOp::Circle {
                x: pos.x,
                y: pos.y,
                radius: CLAIM_RADIUS,
                fill: Fill::translucent(claim.color, CLAIM_ALPHA),
                stroke: true,
            });
        }
    }

    for pulse in store.pulses() {
        let Some(sprite) = pulse_sprite(pulse.frame) else {
            continue;
        };
        let pos = projector.world_to_canvas_offset(pulse.origin, style.pulse_offset);
        ops.push(DrawOp::Sprite {
            x: pos.x,
            y: pos.y,
            sprite,
        });
    }
    store.advance_pulses();

    Frame {
        width,
        height,
        ops,
    }
}

#[cfg(test)]
mod tests {
    use super::{CLAIM_ALPHA, Frame, RenderStyle, closest_player, hit_player, render_frame};
    use crate::colors::{PLAYER_PALETTE, palette_color};
    use crate::entity::{Claim, LastSeen, Player, WorldPos};
    use crate::projection::{CanvasPos, Projector};
    use crate::sprite::tests::FixedWidth;
    use crate::sprite::{DrawOp, PULSE_LIFETIME};
    use crate::store::{EntityStore, FeedSnapshot};

    const PROJECTOR: Projector = Projector::new(750.0, 750.0);

    /// Player whose marker lands on canvas `(cx, cy)` of [`PROJECTOR`].
    fn player_at(id: &str, index: usize, cx: f64, cy: f64) -> Player {
        let (x, z) = PROJECTOR.canvas_to_world(CanvasPos::new(cx, cy));
        Player {
            id: id.to_string(),
            name: id.to_string(),
            color: palette_color(index),
            position: WorldPos::new(x, 64.0, z),
            last_seen: LastSeen::Number(1.0),
        }
    }

    fn store_with(players: Vec<Player>, claims: Vec<Claim>) -> EntityStore {
        let mut store = EntityStore::new();
        store.replace(FeedSnapshot { players, claims });
        store
    }

    fn render(store: &mut EntityStore) -> Frame {
        render_frame(store, &PROJECTOR, &FixedWidth, &RenderStyle::default())
    }

    fn tooltip_names(frame: &Frame) -> Vec<String> {
        frame
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Sprite { sprite, .. } => sprite.ops.iter().find_map(|inner| match inner {
                    DrawOp::Text { text, .. } => Some(text.clone()),
                    _ => None,
                }),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn layers_are_drawn_in_fixed_order() {
        let owner = player_at("a", 0, 100.0, 100.0);
        let claim = Claim {
            id: "c".to_string(),
            owner: "a".to_string(),
            position: WorldPos::default(),
            color: owner.color,
            range: None,
            last_seen: None,
        };
        let mut store = store_with(vec![owner], vec![claim]);
        store.set_cursor(CanvasPos::new(105.0, 100.0));
        store.push_pulse(WorldPos::default());

        let frame = render(&mut store);
        let kinds: Vec<&str> = frame
            .ops
            .iter()
            .map(|op| match op {
                DrawOp::Clear { .. } => "clear",
                DrawOp::Background { .. } => "background",
                DrawOp::Circle { radius, .. } if *radius == 5.0 => "marker",
                DrawOp::Circle { .. } => "claim",
                DrawOp::Sprite { sprite, .. } if sprite.width == 75.0 => "pulse",
                DrawOp::Sprite { .. } => "tooltip",
                other => panic!("unexpected top-level op {other:?}"),
            })
            .collect();
        assert_eq!(
            kinds,
            ["clear", "background", "marker", "tooltip", "claim", "pulse"]
        );
    }

    #[test]
    fn markers_sit_on_projected_positions() {
        let mut store = store_with(vec![player_at("a", 1, 200.0, 300.0)], vec![]);
        let frame = render(&mut store);
        let DrawOp::Circle { x, y, fill, stroke, .. } = &frame.ops[2] else {
            panic!("expected marker, got {:?}", frame.ops[2]);
        };
        assert!((x - 200.0).abs() < 1e-9);
        assert!((y - 300.0).abs() < 1e-9);
        assert_eq!(fill.rgb, PLAYER_PALETTE[1]);
        assert_eq!(fill.alpha, 1.0);
        assert!(*stroke);
    }

    #[test]
    fn tooltip_triggers_strictly_inside_twenty_pixels() {
        // World origin projects exactly onto the center (375, 375).
        let mut center = player_at("near", 0, 0.0, 0.0);
        center.position = WorldPos::new(0.0, 64.0, 0.0);
        let mut store = store_with(vec![center], vec![]);

        store.set_cursor(CanvasPos::new(394.0, 375.0));
        assert_eq!(tooltip_names(&render(&mut store)), ["near"]);

        store.set_cursor(CanvasPos::new(395.0, 375.0));
        assert!(tooltip_names(&render(&mut store)).is_empty());

        store.set_cursor(CanvasPos::new(387.0, 391.0));
        assert!(tooltip_names(&render(&mut store)).is_empty());
    }

    #[test]
    fn every_player_in_range_gets_a_tooltip_at_the_cursor() {
        let mut store = store_with(
            vec![
                player_at("a", 0, 300.0, 300.0),
                player_at("b", 1, 310.0, 300.0),
                player_at("far", 2, 600.0, 600.0),
            ],
            vec![],
        );
        store.set_cursor(CanvasPos::new(305.0, 300.0));
        let frame = render(&mut store);

        assert_eq!(tooltip_names(&frame), ["a", "b"]);
        for op in &frame.ops {
            if let DrawOp::Sprite { x, y, .. } = op {
                assert_eq!((*x, *y), (305.0, 300.0));
            }
        }
    }

    #[test]
    fn tooltip_border_uses_player_color() {
        let mut store = store_with(vec![player_at("a", 2, 50.0, 50.0)], vec![]);
        store.set_cursor(CanvasPos::new(50.0, 50.0));
        let frame = render(&mut store);
        let DrawOp::Sprite { sprite, .. } = &frame.ops[3] else {
            panic!("expected tooltip sprite");
        };
        let DrawOp::Rect { fill, .. } = &sprite.ops[1] else {
            panic!("expected border edge");
        };
        assert_eq!(fill.rgb, PLAYER_PALETTE[2]);
    }

    #[test]
    fn claims_are_translucent_and_can_be_hidden() {
        let claim = Claim {
            id: "c".to_string(),
            owner: "a".to_string(),
            position: WorldPos::default(),
            color: PLAYER_PALETTE[0],
            range: Some(50.0),
            last_seen: None,
        };
        let mut store = store_with(vec![], vec![claim]);

        let frame = render(&mut store);
        assert!(matches!(
            frame.ops[2],
            DrawOp::Circle { x, y, radius, fill, .. }
                if x == 375.0 && y == 375.0 && radius == 25.0 && fill.alpha == CLAIM_ALPHA
        ));

        let hidden = RenderStyle {
            show_claims: false,
            ..RenderStyle::default()
        };
        let frame = render_frame(&mut store, &PROJECTOR, &FixedWidth, &hidden);
        assert_eq!(frame.ops.len(), 2);
    }

    #[test]
    fn rendering_ages_pulses_until_they_expire() {
        let mut store = store_with(vec![], vec![]);
        store.push_pulse(WorldPos::new(145.0, 0.0, -145.0));

        let first = render(&mut store);
        assert!(matches!(
            first.ops[2],
            DrawOp::Sprite { x, y, .. } if x == 375.0 && y == 375.0
        ));
        assert_eq!(store.pulses()[0].frame, 1);

        for _ in 1..=PULSE_LIFETIME {
            let frame = render(&mut store);
            assert_eq!(frame.ops.len(), 3);
        }
        assert!(store.pulses().is_empty());
        assert_eq!(render(&mut store).ops.len(), 2);
    }

    #[test]
    fn closest_player_prefers_nearest_marker() {
        let players = vec![
            player_at("a", 0, 100.0, 100.0),
            player_at("b", 1, 200.0, 200.0),
        ];
        let nearest = closest_player(CanvasPos::new(190.0, 200.0), &players, &PROJECTOR)
            .expect("players present");
        assert_eq!(nearest.player_index, 1);
        assert!((nearest.distance - 10.0).abs() < 1e-9);
        assert!(closest_player(CanvasPos::new(0.0, 0.0), &[], &PROJECTOR).is_none());
    }

    #[test]
    fn clicks_hit_the_nearest_marker_within_range() {
        let players = vec![
            player_at("a", 0, 100.0, 100.0),
            player_at("b", 1, 110.0, 100.0),
        ];
        let hit = hit_player(CanvasPos::new(107.0, 100.0), &players, &PROJECTOR)
            .expect("click lands near b");
        assert_eq!(hit.id, "b");
        assert!(hit_player(CanvasPos::new(100.0, 140.0), &players, &PROJECTOR).is_none());
        assert!(hit_player(CanvasPos::new(100.0, 100.0), &[], &PROJECTOR).is_none());
    }
}
