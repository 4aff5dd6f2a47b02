use std::cell::Cell;
use std::rc::Rc;

/// Monotonic millisecond clock.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now_ms(&self) -> f64 {
        (**self).now_ms()
    }
}

/// Hand-driven clock for tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<f64>,
}

impl ManualClock {
    pub fn new(start_ms: f64) -> Self {
        Self {
            now: Cell::new(start_ms),
        }
    }

    pub fn set(&self, ms: f64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: f64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(usize);

#[derive(Debug)]
enum Cadence {
    EveryFrame,
    Every {
        interval_ms: f64,
        last_fired: Option<f64>,
    },
}

/// Answers "which tasks run now" for interval and per-frame tasks. The
/// caller drives it once per animation frame.
pub struct Scheduler<C: Clock> {
    clock: C,
    tasks: Vec<Cadence>,
}

impl<C: Clock> Scheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            tasks: Vec::new(),
        }
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn every(&mut self, interval_ms: f64) -> TaskId {
        self.push(Cadence::Every {
            interval_ms: interval_ms.max(0.0),
            last_fired: None,
        })
    }

    pub fn every_frame(&mut self) -> TaskId {
        self.push(Cadence::EveryFrame)
    }

    fn push(&mut self, cadence: Cadence) -> TaskId {
        self.tasks.push(cadence);
        TaskId(self.tasks.len() - 1)
    }

    /// Tasks due at the current clock reading, in registration order. Interval
    /// tasks fire on the first call and then once `interval_ms` has elapsed
    /// since they last fired; missed intervals are not replayed.
    pub fn due(&mut self) -> Vec<TaskId> {
        let now = self.clock.now_ms();
        let mut due = Vec::new();
        for (index, task) in self.tasks.iter_mut().enumerate() {
            let fire = match task {
                Cadence::EveryFrame => true,
                Cadence::Every {
                    interval_ms,
                    last_fired,
                } => {
                    let fire = last_fired.is_none_or(|last| now - last >= *interval_ms);
                    if fire {
                        *last_fired = Some(now);
                    }
                    fire
                }
            };
            if fire {
                due.push(TaskId(index));
            }
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::{Clock, ManualClock, Scheduler};

    #[test]
    fn frame_tasks_fire_on_every_call() {
        let clock = Rc::new(ManualClock::new(0.0));
        let mut scheduler = Scheduler::new(Rc::clone(&clock));
        let frame = scheduler.every_frame();

        for _ in 0..5 {
            assert_eq!(scheduler.due(), [frame]);
            clock.advance(16.0);
        }
    }

    #[test]
    fn interval_task_fires_immediately_then_on_schedule() {
        let clock = Rc::new(ManualClock::new(500.0));
        let mut scheduler = Scheduler::new(Rc::clone(&clock));
        let poll = scheduler.every(1000.0);

        assert_eq!(scheduler.due(), [poll]);
        clock.advance(999.0);
        assert!(scheduler.due().is_empty());
        clock.advance(1.0);
        assert_eq!(scheduler.due(), [poll]);
        clock.advance(16.0);
        assert!(scheduler.due().is_empty());
    }

    #[test]
    fn missed_intervals_fire_once() {
        let clock = Rc::new(ManualClock::new(0.0));
        let mut scheduler = Scheduler::new(Rc::clone(&clock));
        let poll = scheduler.every(1000.0);
        assert_eq!(scheduler.due(), [poll]);

        clock.advance(5500.0);
        assert_eq!(scheduler.due(), [poll]);
        assert!(scheduler.due().is_empty());

        clock.advance(999.0);
        assert!(scheduler.due().is_empty());
        clock.advance(1.0);
        assert_eq!(scheduler.due(), [poll]);
    }

    #[test]
    fn mixed_tasks_report_in_registration_order() {
        let clock = Rc::new(ManualClock::new(0.0));
        let mut scheduler = Scheduler::new(Rc::clone(&clock));
        let poll = scheduler.every(1000.0);
        let render = scheduler.every_frame();

        assert_eq!(scheduler.due(), [poll, render]);
        clock.advance(16.0);
        assert_eq!(scheduler.due(), [render]);
        clock.set(1016.0);
        assert_eq!(scheduler.due(), [poll, render]);
        assert_eq!(scheduler.clock().now_ms(), 1016.0);
    }
}
