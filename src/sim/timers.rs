//! Scheduled continuations
//!
//! "Resume after N seconds" work is data: each entry names its owner and the
//! action to run once the scaled clock reaches `due`. Owners are cancelled as
//! a group when the entity they belong to is recycled, so a stale entry can
//! never touch a reused pool slot.

use super::entity::EntityId;
use super::player::AppliedPowerUp;

/// Handle for cancelling a single continuation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

/// Who a continuation belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerOwner {
    Entity(EntityId),
    PlayerEffects,
    PlayerBlink,
    HudMessage,
}

/// Work to run when a timer fires
#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    /// Border rules apply to the owner again
    EndBorderImmunity,
    /// Undo a power-up with the exact deltas it applied
    RevertPowerUp(AppliedPowerUp),
    /// Toggle player visibility; finishes the blink once `until` has passed
    BlinkStep { until: f64 },
    HideMessage,
    /// Return the owner to its pool (projectile lifetime, effect lifetime)
    Deactivate,
}

#[derive(Debug, Clone)]
struct Scheduled {
    token: TimerToken,
    owner: TimerOwner,
    due: f64,
    action: Continuation,
}

/// Pending continuations, evaluated against the frame clock
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    pending: Vec<Scheduled>,
    next_token: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` for `owner` once the clock reaches `now + delay`
    pub fn schedule(
        &mut self,
        owner: TimerOwner,
        now: f64,
        delay: f64,
        action: Continuation,
    ) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.pending.push(Scheduled {
            token,
            owner,
            due: now + delay.max(0.0),
            action,
        });
        token
    }

    pub fn cancel(&mut self, token: TimerToken) {
        self.pending.retain(|s| s.token != token);
    }

    /// Drop every continuation belonging to `owner`
    pub fn cancel_owner(&mut self, owner: TimerOwner) {
        self.pending.retain(|s| s.owner != owner);
    }

    /// Drop every continuation owned by a pooled entity
    pub fn cancel_entities(&mut self) {
        self.pending
            .retain(|s| !matches!(s.owner, TimerOwner::Entity(_)));
    }

    pub fn cancel_all(&mut self) {
        if !self.pending.is_empty() {
            log::debug!("Cancelling {} pending timers", self.pending.len());
        }
        self.pending.clear();
    }

    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.pending.iter().any(|s| s.token == token)
    }

    pub fn pending_for(&self, owner: TimerOwner) -> usize {
        self.pending.iter().filter(|s| s.owner == owner).count()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return everything due at `now`, earliest first
    /// (ties keep scheduling order)
    pub fn take_due(&mut self, now: f64) -> Vec<(TimerOwner, Continuation)> {
        let (mut due, rest): (Vec<_>, Vec<_>) =
            self.pending.drain(..).partition(|s| s.due <= now);
        self.pending = rest;

        due.sort_by(|a, b| {
            a.due
                .partial_cmp(&b.due)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.token.cmp(&b.token))
        });
        due.into_iter().map(|s| (s.owner, s.action)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::PoolKind;

    fn rock(slot: usize) -> TimerOwner {
        TimerOwner::Entity(EntityId::new(PoolKind::Rocks, slot))
    }

    #[test]
    fn test_fires_only_when_due() {
        let mut timers = Scheduler::new();
        timers.schedule(rock(0), 0.0, 1.0, Continuation::Deactivate);
        assert!(timers.take_due(0.5).is_empty());
        let fired = timers.take_due(1.0);
        assert_eq!(fired, vec![(rock(0), Continuation::Deactivate)]);
        assert!(timers.is_empty());
    }

    #[test]
    fn test_due_order_then_schedule_order() {
        let mut timers = Scheduler::new();
        timers.schedule(rock(2), 0.0, 2.0, Continuation::Deactivate);
        timers.schedule(rock(0), 0.0, 1.0, Continuation::EndBorderImmunity);
        timers.schedule(rock(1), 0.0, 1.0, Continuation::Deactivate);
        let owners: Vec<_> = timers.take_due(5.0).into_iter().map(|(o, _)| o).collect();
        assert_eq!(owners, vec![rock(0), rock(1), rock(2)]);
    }

    #[test]
    fn test_cancel_owner_leaves_others() {
        let mut timers = Scheduler::new();
        timers.schedule(rock(0), 0.0, 1.0, Continuation::Deactivate);
        timers.schedule(rock(0), 0.0, 2.0, Continuation::EndBorderImmunity);
        let keep = timers.schedule(rock(1), 0.0, 1.0, Continuation::Deactivate);
        timers.cancel_owner(rock(0));
        assert_eq!(timers.pending_for(rock(0)), 0);
        assert!(timers.is_pending(keep));
    }

    #[test]
    fn test_cancel_entities_keeps_player_timers() {
        let mut timers = Scheduler::new();
        timers.schedule(rock(0), 0.0, 1.0, Continuation::Deactivate);
        timers.schedule(TimerOwner::PlayerBlink, 0.0, 0.1, Continuation::BlinkStep { until: 3.0 });
        timers.cancel_entities();
        assert_eq!(timers.len(), 1);
        assert_eq!(timers.pending_for(TimerOwner::PlayerBlink), 1);
    }

    #[test]
    fn test_cancel_token() {
        let mut timers = Scheduler::new();
        let t = timers.schedule(TimerOwner::HudMessage, 0.0, 2.0, Continuation::HideMessage);
        timers.cancel(t);
        assert!(timers.take_due(10.0).is_empty());
    }
}
