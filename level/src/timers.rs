use std::time::Duration;

/// Cosmetic follow-ups the orchestrator schedules after a delay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DeferredAction {
    /// Restores the regular camera framing once the camera has settled on the player.
    ReleaseCameraFraming,
    /// Plays the "in" transition after the testbed has been set up.
    TransitionIn,
}

#[derive(Clone, Copy, Debug)]
struct ScheduledAction {
    remaining: Duration,
    action: DeferredAction,
}

/// Fire-and-forget timers advanced by the frame driver.
///
/// Timers are never cancelled. Actions that become due in the same advance
/// are returned in the order they were scheduled.
#[derive(Clone, Debug, Default)]
pub struct Timers {
    pending: Vec<ScheduledAction>,
}

impl Timers {
    /// Creates an empty timer list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that have not fired yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Returns `true` when no timer is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Actions still waiting, in scheduling order.
    pub fn pending(&self) -> impl Iterator<Item = DeferredAction> + '_ {
        self.pending.iter().map(|scheduled| scheduled.action)
    }

    /// Queues `action` to fire once `delay` has elapsed.
    pub fn schedule(&mut self, delay: Duration, action: DeferredAction) {
        self.pending.push(ScheduledAction {
            remaining: delay,
            action,
        });
    }

    /// Advances every timer by `dt` and removes the ones that are due.
    pub fn advance(&mut self, dt: Duration) -> Vec<DeferredAction> {
        let mut due = Vec::new();
        self.pending.retain_mut(|scheduled| {
            scheduled.remaining = scheduled.remaining.saturating_sub(dt);
            if scheduled.remaining.is_zero() {
                due.push(scheduled.action);
                false
            } else {
                true
            }
        });
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_fire_once_their_delay_elapses() {
        let mut timers = Timers::new();
        timers.schedule(Duration::from_millis(100), DeferredAction::ReleaseCameraFraming);
        timers.schedule(Duration::from_millis(50), DeferredAction::TransitionIn);

        assert!(timers.advance(Duration::from_millis(40)).is_empty());
        assert_eq!(
            timers.advance(Duration::from_millis(10)),
            vec![DeferredAction::TransitionIn]
        );
        assert_eq!(timers.len(), 1);
        assert_eq!(
            timers.advance(Duration::from_millis(500)),
            vec![DeferredAction::ReleaseCameraFraming]
        );
        assert!(timers.is_empty());
    }

    #[test]
    fn zero_delay_fires_on_the_next_advance() {
        let mut timers = Timers::new();
        timers.schedule(Duration::ZERO, DeferredAction::TransitionIn);
        assert_eq!(timers.pending().collect::<Vec<_>>(), vec![DeferredAction::TransitionIn]);
        assert_eq!(timers.advance(Duration::ZERO), vec![DeferredAction::TransitionIn]);
    }
}
