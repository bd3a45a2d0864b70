use std::time::Duration;

/// The timers a session can have outstanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TaskKind {
    ClockTick,
    AutoPlayTick,
    AllClearConfirmation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub kind: TaskKind,
    /// Session generation the task was armed for
    pub generation: u64,
    pub due: Duration,
    pub period: Option<Duration>,
    seq: u64,
}

/// A fired task, handed to the engine for dispatch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub kind: TaskKind,
    pub generation: u64,
    pub due: Duration,
}

/// Cooperative timer table.
///
/// Nothing runs on its own: the owner calls [`Scheduler::pop_due`] with the
/// current time and dispatches whatever comes back, one task at a time. At most
/// one task of each kind is armed; arming a kind again replaces it.
#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<ScheduledTask>,
    next_seq: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, kind: TaskKind, generation: u64, due: Duration) {
        self.arm(kind, generation, due, None);
    }

    pub fn schedule_every(
        &mut self,
        kind: TaskKind,
        generation: u64,
        first_due: Duration,
        period: Duration,
    ) {
        self.arm(kind, generation, first_due, Some(period));
    }

    fn arm(&mut self, kind: TaskKind, generation: u64, due: Duration, period: Option<Duration>) {
        self.cancel(kind);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.tasks.push(ScheduledTask {
            kind,
            generation,
            due,
            period,
            seq,
        });
    }

    /// Returns true if a task was actually removed
    pub fn cancel(&mut self, kind: TaskKind) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.kind != kind);
        before != self.tasks.len()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    pub fn is_scheduled(&self, kind: TaskKind) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }

    pub fn get(&self, kind: TaskKind) -> Option<&ScheduledTask> {
        self.tasks.iter().find(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Removes and returns the earliest task due at or before `now`.
    ///
    /// Periodic tasks are re-armed one period after their due time, so a caller
    /// that fell behind sees every missed period in order.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        let idx = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.due <= now)
            .min_by_key(|(_, t)| (t.due, t.seq))
            .map(|(idx, _)| idx)?;

        let task = self.tasks.remove(idx);
        if let Some(period) = task.period {
            self.schedule_every(task.kind, task.generation, task.due + period, period);
        }

        Some(Fired {
            kind: task.kind,
            generation: task.generation,
            due: task.due,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn nothing_fires_before_due() {
        let mut s = Scheduler::new();
        s.schedule_once(TaskKind::AllClearConfirmation, 1, ms(3000));
        assert_eq!(s.pop_due(ms(2999)), None);
        assert!(s.is_scheduled(TaskKind::AllClearConfirmation));
    }

    #[test]
    fn one_shot_fires_once() {
        let mut s = Scheduler::new();
        s.schedule_once(TaskKind::AllClearConfirmation, 4, ms(3000));

        let fired = s.pop_due(ms(3000)).unwrap();
        assert_eq!(fired.kind, TaskKind::AllClearConfirmation);
        assert_eq!(fired.generation, 4);
        assert_eq!(s.pop_due(ms(10_000)), None);
        assert!(s.is_empty());
    }

    #[test]
    fn periodic_task_catches_up_in_order() {
        let mut s = Scheduler::new();
        s.schedule_every(TaskKind::ClockTick, 1, ms(100), ms(100));

        let mut dues = vec![];
        while let Some(fired) = s.pop_due(ms(350)) {
            dues.push(fired.due);
        }
        assert_eq!(dues, vec![ms(100), ms(200), ms(300)]);
        assert_eq!(s.get(TaskKind::ClockTick).map(|t| t.due), Some(ms(400)));
    }

    #[test]
    fn earliest_due_wins_then_sequence() {
        let mut s = Scheduler::new();
        s.schedule_every(TaskKind::AutoPlayTick, 1, ms(500), ms(500));
        s.schedule_every(TaskKind::ClockTick, 1, ms(100), ms(100));
        s.schedule_once(TaskKind::AllClearConfirmation, 1, ms(500));

        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(ms(500)))
            .map(|f| (f.kind, f.due))
            .collect();

        assert_eq!(order.first(), Some(&(TaskKind::ClockTick, ms(100))));
        // at 500ms the autoplay tick was armed before the confirmation
        let at_500: Vec<_> = order
            .iter()
            .filter(|(_, due)| *due == ms(500))
            .map(|(k, _)| *k)
            .collect();
        assert_eq!(
            at_500,
            vec![TaskKind::AutoPlayTick, TaskKind::AllClearConfirmation, TaskKind::ClockTick]
        );
    }

    #[test]
    fn rearming_replaces_existing_task() {
        let mut s = Scheduler::new();
        s.schedule_once(TaskKind::AllClearConfirmation, 1, ms(100));
        s.schedule_once(TaskKind::AllClearConfirmation, 2, ms(900));
        assert_eq!(s.len(), 1);
        assert_eq!(s.pop_due(ms(100)), None);
        assert_eq!(s.pop_due(ms(900)).map(|f| f.generation), Some(2));
    }

    #[test]
    fn cancel_is_idempotent() {
        let mut s = Scheduler::new();
        s.schedule_every(TaskKind::ClockTick, 1, ms(100), ms(100));
        assert!(s.cancel(TaskKind::ClockTick));
        assert!(!s.cancel(TaskKind::ClockTick));
        s.schedule_every(TaskKind::AutoPlayTick, 1, ms(100), ms(100));
        s.cancel_all();
        assert!(s.is_empty());
    }
}
