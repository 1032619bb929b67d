//! Deferred action invocations.
//!
//! Some workflows need a second action after a delay, e.g. open a tab, wait for it to load,
//! then toggle reader mode. Instead of nesting callbacks, the first step schedules a
//! continuation here and returns immediately. The event loop asks for
//! [`Continuations::next_deadline`] to bound its wait and calls [`Continuations::run_due`]
//! when it wakes; each due continuation runs through the [`Registry`] as an independent,
//! fresh invocation.
//!
//! Everything runs on the event-loop thread. Time is passed in explicitly so the queue can
//! be driven deterministically.

use crate::{action::Invocation, error::Result, input::SurfaceId, registry::Registry};
use std::{
    cell::Cell,
    collections::BTreeMap,
    rc::Rc,
    time::{Duration, Instant},
};
use tracing::{debug, trace};

/// Cancels a scheduled continuation. Cancelling after it ran is a no-op.
#[derive(Debug, Clone)]
pub struct ContinuationHandle {
    id: u64,
    cancelled: Rc<Cell<bool>>,
}

impl ContinuationHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

#[derive(Debug)]
struct Pending {
    invocation: Invocation,
    surface: Option<SurfaceId>,
    cancelled: Rc<Cell<bool>>,
}

/// Queue of deferred invocations ordered by deadline, then scheduling order.
#[derive(Debug, Default)]
pub struct Continuations {
    next_id: u64,
    pending: BTreeMap<(Instant, u64), Pending>,
}

impl Continuations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `invocation` once `delay` has passed since `now`.
    pub fn schedule(
        &mut self,
        now: Instant,
        delay: Duration,
        invocation: Invocation,
    ) -> ContinuationHandle {
        self.push(now + delay, invocation, None)
    }

    /// Like [`Self::schedule`], but abandoned by [`Self::cancel_surface`] when `surface` goes
    /// away first.
    pub fn schedule_for(
        &mut self,
        surface: SurfaceId,
        now: Instant,
        delay: Duration,
        invocation: Invocation,
    ) -> ContinuationHandle {
        self.push(now + delay, invocation, Some(surface))
    }

    fn push(
        &mut self,
        deadline: Instant,
        invocation: Invocation,
        surface: Option<SurfaceId>,
    ) -> ContinuationHandle {
        let id = self.next_id;
        self.next_id += 1;
        let cancelled = Rc::new(Cell::new(false));

        trace!(id, %invocation, "scheduled continuation");
        self.pending.insert(
            (deadline, id),
            Pending {
                invocation,
                surface,
                cancelled: cancelled.clone(),
            },
        );
        ContinuationHandle { id, cancelled }
    }

    /// Abandon everything scheduled on behalf of `surface`. Returns how many were dropped.
    pub fn cancel_surface(&mut self, surface: SurfaceId) -> usize {
        self.prune();
        let before = self.pending.len();
        self.pending.retain(|_, p| p.surface != Some(surface));
        let dropped = before - self.pending.len();
        if dropped > 0 {
            debug!(%surface, dropped, "abandoned continuations");
        }
        dropped
    }

    /// Abandon everything. Returns how many live continuations were dropped.
    pub fn cancel_all(&mut self) -> usize {
        self.prune();
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    /// Earliest deadline among live continuations.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.prune();
        self.pending.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return every live continuation due at `now`, earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Invocation> {
        let later = self.pending.split_off(&(now, u64::MAX));
        let due = std::mem::replace(&mut self.pending, later);
        due.into_values()
            .filter(|p| !p.cancelled.get())
            .map(|p| p.invocation)
            .collect()
    }

    /// Invoke every due continuation through `registry`, each as its own invocation.
    ///
    /// One failing continuation does not stop the rest.
    pub fn run_due(&mut self, now: Instant, registry: &Registry) -> Vec<(Invocation, Result<()>)> {
        self.take_due(now)
            .into_iter()
            .map(|invocation| {
                debug!(%invocation, "running continuation");
                let result = registry.invoke(&invocation);
                (invocation, result)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.pending
            .values()
            .filter(|p| !p.cancelled.get())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn prune(&mut self) {
        self.pending.retain(|_, p| !p.cancelled.get());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Arity, Category};
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn due_in_deadline_order() {
        let start = Instant::now();
        let mut queue = Continuations::new();
        queue.schedule(start, ms(4000), Invocation::new("toggleReaderMode"));
        queue.schedule(start, ms(2000), Invocation::new("editCopy"));
        queue.schedule(start, ms(2000), Invocation::new("editPaste"));

        assert_eq!(queue.next_deadline(), Some(start + ms(2000)));
        assert!(queue.take_due(start + ms(1999)).is_empty());

        let due = queue.take_due(start + ms(2000));
        assert_eq!(due, [Invocation::new("editCopy"), Invocation::new("editPaste")]);
        assert_eq!(queue.len(), 1);

        let due = queue.take_due(start + ms(10_000));
        assert_eq!(due, [Invocation::new("toggleReaderMode")]);
        assert!(queue.is_empty());
        assert_eq!(queue.next_deadline(), None);
    }

    #[test]
    fn cancelled_handles_never_fire() {
        let start = Instant::now();
        let mut queue = Continuations::new();
        let handle = queue.schedule(start, ms(10), Invocation::new("editCopy"));
        queue.schedule(start, ms(20), Invocation::new("editCut"));

        handle.cancel();
        assert!(handle.is_cancelled());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.next_deadline(), Some(start + ms(20)));
        assert_eq!(queue.take_due(start + ms(30)), [Invocation::new("editCut")]);
    }

    #[test]
    fn surface_teardown_abandons_its_continuations() {
        let start = Instant::now();
        let mut queue = Continuations::new();
        queue.schedule_for(SurfaceId(1), start, ms(10), Invocation::new("editCopy"));
        queue.schedule_for(SurfaceId(2), start, ms(10), Invocation::new("editCut"));
        queue.schedule(start, ms(10), Invocation::new("tabsNewTab"));

        assert_eq!(queue.cancel_surface(SurfaceId(1)), 1);
        let due = queue.take_due(start + ms(10));
        assert_eq!(due, [Invocation::new("editCut"), Invocation::new("tabsNewTab")]);
    }

    #[test]
    fn teardown_counts_only_live_continuations() {
        let start = Instant::now();
        let mut queue = Continuations::new();
        queue
            .schedule_for(SurfaceId(1), start, ms(10), Invocation::new("editCopy"))
            .cancel();
        queue.schedule_for(SurfaceId(1), start, ms(10), Invocation::new("editCut"));
        queue.schedule(start, ms(10), Invocation::new("tabsNewTab")).cancel();
        queue.schedule(start, ms(10), Invocation::new("editPaste"));

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.cancel_surface(SurfaceId(1)), 1);
        assert_eq!(queue.cancel_all(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn run_due_invokes_each_independently() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut registry = Registry::new();
        registry
            .register(
                "editCopy",
                Category::Edit,
                Arity::Nullary,
                Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }),
            )
            .unwrap();

        let start = Instant::now();
        let mut queue = Continuations::new();
        queue.schedule(start, ms(5), Invocation::new("missing"));
        queue.schedule(start, ms(5), Invocation::new("editCopy"));

        let results = queue.run_due(start + ms(5), &registry);
        assert_eq!(results.len(), 2);
        assert!(results[0].1.is_err());
        assert!(results[1].1.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
