use crate::entity::{Claim, Player, WorldPos};
use crate::feed::FeedError;
use crate::projection::CanvasPos;
use crate::sprite::PULSE_LIFETIME;

/// Transient ring marking a clicked player's location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub origin: WorldPos,
    pub frame: u32,
}

/// One successful poll cycle's output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedSnapshot {
    pub players: Vec<Player>,
    pub claims: Vec<Claim>,
}

/// What `apply_poll` did with a poll result.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Applied {
        players: usize,
        claims: usize,
    },
    /// Poll failed; the previous lists were left in place.
    Retained {
        error: FeedError,
        players: usize,
        claims: usize,
    },
}

/// Live entity lists plus cursor. Player and claim lists are only ever
/// replaced wholesale.
#[derive(Debug, Default)]
pub struct EntityStore {
    players: Vec<Player>,
    claims: Vec<Claim>,
    pulses: Vec<Pulse>,
    cursor: CanvasPos,
    generation: u64,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn pulses(&self) -> &[Pulse] {
        &self.pulses
    }

    pub fn cursor(&self) -> CanvasPos {
        self.cursor
    }

    pub fn set_cursor(&mut self, cursor: CanvasPos) {
        self.cursor = cursor;
    }

    /// Number of snapshots applied so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn replace(&mut self, snapshot: FeedSnapshot) {
        self.players = snapshot.players;
        self.claims = snapshot.claims;
        self.generation += 1;
    }

    pub fn apply_poll(&mut self, result: Result<FeedSnapshot, FeedError>) -> PollOutcome {
        match result {
            Ok(snapshot) => {
                self.replace(snapshot);
                PollOutcome::Applied {
                    players: self.players.len(),
                    claims: self.claims.len(),
                }
            }
            Err(error) => PollOutcome::Retained {
                error,
                players: self.players.len(),
                claims: self.claims.len(),
            },
        }
    }

    pub fn push_pulse(&mut self, origin: WorldPos) {
        self.pulses.push(Pulse { origin, frame: 0 });
    }

    /// Age every pulse by one tick and drop the expired ones.
    pub fn advance_pulses(&mut self) {
        for pulse in &mut self.pulses {
            pulse.frame += 1;
        }
        self.pulses.retain(|pulse| pulse.frame <= PULSE_LIFETIME);
    }
}

#[cfg(test)]
mod tests {
    use super::{EntityStore, FeedSnapshot, PollOutcome};
    use crate::colors::palette_color;
    use crate::entity::{Claim, LastSeen, Player, WorldPos};
    use crate::feed::FeedError;
    use crate::projection::CanvasPos;

    fn player(id: &str) -> Player {
        Player {
            id: id.to_string(),
            name: id.to_uppercase(),
            color: palette_color(0),
            position: WorldPos::default(),
            last_seen: LastSeen::Number(1.0),
        }
    }

    fn claim(id: &str, owner: &str) -> Claim {
        Claim {
            id: id.to_string(),
            owner: owner.to_string(),
            position: WorldPos::default(),
            color: palette_color(0),
            range: None,
            last_seen: None,
        }
    }

    #[test]
    fn store_starts_empty_with_cursor_at_origin() {
        let store = EntityStore::new();
        assert!(store.players().is_empty());
        assert!(store.claims().is_empty());
        assert!(store.pulses().is_empty());
        assert_eq!(store.cursor(), CanvasPos::new(0.0, 0.0));
        assert_eq!(store.generation(), 0);
    }

    #[test]
    fn replace_swaps_lists_wholesale() {
        let mut store = EntityStore::new();
        store.replace(FeedSnapshot {
            players: vec![player("a"), player("b")],
            claims: vec![claim("c1", "a")],
        });
        store.replace(FeedSnapshot {
            players: vec![player("c")],
            claims: vec![],
        });

        let ids: Vec<&str> = store.players().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["c"]);
        assert!(store.claims().is_empty());
        assert_eq!(store.generation(), 2);
    }

    #[test]
    fn failed_poll_retains_previous_snapshot() {
        let mut store = EntityStore::new();
        let applied = store.apply_poll(Ok(FeedSnapshot {
            players: vec![player("a")],
            claims: vec![claim("c1", "a")],
        }));
        assert_eq!(applied, PollOutcome::Applied { players: 1, claims: 1 });

        let retained = store.apply_poll(Err(FeedError::Status(502)));
        assert_eq!(
            retained,
            PollOutcome::Retained {
                error: FeedError::Status(502),
                players: 1,
                claims: 1,
            }
        );
        assert_eq!(store.players()[0].id, "a");
        assert_eq!(store.claims()[0].id, "c1");
        assert_eq!(store.generation(), 1);
    }

    #[test]
    fn pulse_is_removed_after_exactly_301_ticks() {
        let mut store = EntityStore::new();
        store.push_pulse(WorldPos::new(10.0, 0.0, 20.0));
        assert_eq!(store.pulses()[0].frame, 0);

        for _ in 0..300 {
            store.advance_pulses();
        }
        assert_eq!(store.pulses().len(), 1);
        assert_eq!(store.pulses()[0].frame, 300);

        store.advance_pulses();
        assert!(store.pulses().is_empty());
    }

    #[test]
    fn pulses_age_independently() {
        let mut store = EntityStore::new();
        store.push_pulse(WorldPos::default());
        for _ in 0..150 {
            store.advance_pulses();
        }
        store.push_pulse(WorldPos::new(1.0, 0.0, 1.0));

        let frames: Vec<u32> = store.pulses().iter().map(|p| p.frame).collect();
        assert_eq!(frames, [150, 0]);
    }

    #[test]
    fn poll_does_not_touch_pulses_or_cursor() {
        let mut store = EntityStore::new();
        store.set_cursor(CanvasPos::new(12.0, 34.0));
        store.push_pulse(WorldPos::default());
        store.replace(FeedSnapshot::default());
        assert_eq!(store.cursor(), CanvasPos::new(12.0, 34.0));
        assert_eq!(store.pulses().len(), 1);
    }
}
