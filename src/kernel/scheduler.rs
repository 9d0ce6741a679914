use super::{Cpu, LongTermScheduler, ProcessControlBlock, ProcessPriority, ProcessState, ProcessTable, ShortTermScheduler};

use crate::config::SchedulerConfig;
use crate::error::SimulatorError;
use crate::io::{CoreDump, CoreDumpWriter, FileCoreDumpWriter, FileImageLoader, ImageLoader, TerminationReason};
use crate::status::ProcessStatus;

/// Owns the process table, both queues and the running slot, and advances
/// the simulation one time slice per `tick`.
pub struct Scheduler {
    config: SchedulerConfig,
    table: ProcessTable,
    lts: LongTermScheduler,
    sts: ShortTermScheduler,
    current: Option<u32>,
    loader: Box<dyn ImageLoader>,
    core_dump_writer: Box<dyn CoreDumpWriter>,
}

impl Scheduler {
    pub fn new(
        config: SchedulerConfig,
        loader: Box<dyn ImageLoader>,
        core_dump_writer: Box<dyn CoreDumpWriter>,
    ) -> Scheduler {
        Scheduler {
            config,
            table: ProcessTable::new(config.max_processes),
            lts: LongTermScheduler::new(),
            sts: ShortTermScheduler::new(config.max_ready_queue),
            current: None,
            loader,
            core_dump_writer,
        }
    }

    /// Scheduler reading images from disk and handing core dumps to `core_dump_writer`.
    pub fn with_files(core_dump_writer: FileCoreDumpWriter) -> Scheduler {
        Scheduler::new(
            SchedulerConfig::default(),
            Box::new(FileImageLoader),
            Box::new(core_dump_writer),
        )
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Loads the image at `path` and admits it as a new process.
    pub fn submit(
        &mut self,
        user_id: i32,
        priority: ProcessPriority,
        max_cycles: u32,
        path: &str,
    ) -> Result<u32, SimulatorError> {
        self.ensure_capacity()?;

        let image = self.loader.load(path).map_err(|source| {
            log::warn!("unable to load image {}: {}", path, source);
            SimulatorError::ImageUnreadable {
                path: path.to_string(),
                source,
            }
        })?;

        self.submit_image(user_id, priority, max_cycles, path, &image)
    }

    /// Admits an already-loaded image as a new process named `name`.
    pub fn submit_image(
        &mut self,
        user_id: i32,
        priority: ProcessPriority,
        max_cycles: u32,
        name: &str,
        image: &[u8],
    ) -> Result<u32, SimulatorError> {
        self.ensure_capacity()?;

        let id = self.table.next_id();
        let pcb = ProcessControlBlock::new(id, user_id, priority, max_cycles, name, image);
        self.table.insert(pcb);
        self.lts.enqueue_process(id);

        log::info!("created process {} ({}) for user {}", id, name, user_id);
        Ok(id)
    }

    fn ensure_capacity(&self) -> Result<(), SimulatorError> {
        if self.table.is_full() {
            log::warn!("process table full, rejecting submission");
            return Err(SimulatorError::TableFull {
                capacity: self.table.capacity(),
            });
        }

        Ok(())
    }

    /// Runs exactly one time slice.
    pub fn tick(&mut self) {
        // Admit at most one process per slice.
        if !self.sts.is_full() && self.lts.has_processes() {
            if let Some(process_id) = self.lts.step(&self.table) {
                log::debug!("admitting process {} to ready queue", process_id);
                self.make_ready(process_id);
            }
        }

        if self.current.is_none() {
            match self.sts.schedule_next(&self.table) {
                Some(process_id) => self.set_running(process_id),
                None => return,
            }
        }

        if let Some(process_id) = self.current {
            self.run_slice(process_id);
        }

        if let Some(process_id) = self.current.take() {
            log::debug!("requeueing process {}", process_id);
            self.make_ready(process_id);
        }

        if let Some(process_id) = self.sts.schedule_next(&self.table) {
            self.set_running(process_id);
        }
    }

    /// Ticks until nothing is left to run.
    pub fn run_until_quiescent(&mut self) {
        while !self.is_quiescent() {
            self.tick();
        }
    }

    fn run_slice(&mut self, process_id: u32) {
        for _ in 0..self.config.instructions_per_slice {
            let Some(pcb) = self.table.get_mut(process_id) else {
                return;
            };

            let continues = Cpu::execute_one(pcb);
            let over_budget = pcb.exceeded_cycle_budget();

            if !continues {
                self.terminate_with(process_id, TerminationReason::CompletedNormally);
                return;
            }

            if over_budget {
                self.terminate_with(process_id, TerminationReason::CpuTimeLimit);
                return;
            }
        }
    }

    fn make_ready(&mut self, process_id: u32) {
        if let Some(pcb) = self.table.get_mut(process_id) {
            pcb.state = ProcessState::Ready;
        }
        self.sts.schedule_process(process_id);
    }

    fn set_running(&mut self, process_id: u32) {
        if let Some(pcb) = self.table.get_mut(process_id) {
            pcb.state = ProcessState::Running;
        }
        log::debug!("dispatching process {}", process_id);
        self.current = Some(process_id);
    }

    /// Kills a live process. Returns `false` if `process_id` names no live process.
    pub fn kill(&mut self, process_id: i64) -> bool {
        self.try_kill(process_id).is_ok()
    }

    pub fn try_kill(&mut self, process_id: i64) -> Result<(), SimulatorError> {
        let id = self.lookup(process_id)?.id();
        self.terminate_with(id, TerminationReason::Killed);

        Ok(())
    }

    /// Looks up a live process. Negative or out-of-range ids are simply not found.
    pub fn lookup(&self, process_id: i64) -> Result<&ProcessControlBlock, SimulatorError> {
        u32::try_from(process_id)
            .ok()
            .and_then(|id| self.table.get(id))
            .ok_or(SimulatorError::UnknownProcess { id: process_id })
    }

    pub fn process(&self, process_id: u32) -> Option<&ProcessControlBlock> {
        self.table.get(process_id)
    }

    /// Live processes in id order.
    pub fn processes(&self) -> impl Iterator<Item = &ProcessControlBlock> {
        self.table.iter()
    }

    pub fn process_count(&self) -> usize {
        self.table.live_count()
    }

    pub fn current(&self) -> Option<u32> {
        self.current
    }

    pub fn ready_len(&self) -> usize {
        self.sts.len()
    }

    pub fn new_len(&self) -> usize {
        self.lts.len()
    }

    /// True when nothing is running and both queues are empty.
    pub fn is_quiescent(&self) -> bool {
        self.current.is_none() && !self.lts.has_processes() && !self.sts.has_processes()
    }

    fn terminate_with(&mut self, process_id: u32, reason: TerminationReason) {
        if let Some(pcb) = self.table.get(process_id) {
            let dump = CoreDump {
                status: ProcessStatus::from(pcb),
                reason,
            };

            if let Err(err) = self.core_dump_writer.write(&dump) {
                log::warn!("failed to write core dump for process {}: {}", process_id, err);
            }
        }

        log::info!("process {} terminated: {}", process_id, reason);
        self.terminate(process_id);
    }

    fn terminate(&mut self, process_id: u32) {
        if self.current == Some(process_id) {
            self.current = None;
        }

        if let Some(pcb) = self.table.get_mut(process_id) {
            pcb.kill();
        }
        self.table.remove(process_id);
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::io::MemoryCoreDumpWriter;

    const STOP: u8 = 0b000_00000;
    const LOOP: u8 = 0b101_00000;

    struct NoImages;

    impl ImageLoader for NoImages {
        fn load(&self, _path: &str) -> io::Result<Vec<u8>> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no such image"))
        }
    }

    fn scheduler() -> (Scheduler, MemoryCoreDumpWriter) {
        let writer = MemoryCoreDumpWriter::new();
        let scheduler = Scheduler::new(SchedulerConfig::default(), Box::new(NoImages), Box::new(writer.clone()));
        (scheduler, writer)
    }

    fn submit(scheduler: &mut Scheduler, name: &str, max_cycles: u32, image: &[u8]) -> u32 {
        scheduler
            .submit_image(1, ProcessPriority::Normal, max_cycles, name, image)
            .unwrap()
    }

    #[test]
    fn test_scheduler_submit_assigns_sequential_ids() {
        let (mut scheduler, _) = scheduler();

        assert_eq!(submit(&mut scheduler, "a", 5, &[STOP]), 0);
        assert_eq!(submit(&mut scheduler, "b", 5, &[STOP]), 1);
        assert_eq!(scheduler.process(1).unwrap().state, ProcessState::New);
        assert_eq!(scheduler.new_len(), 2);
        assert!(!scheduler.is_quiescent());
    }

    #[test]
    fn test_scheduler_submit_table_full() {
        let (mut scheduler, _) = scheduler();
        for _ in 0..100 {
            submit(&mut scheduler, "p", 5, &[STOP]);
        }

        let result = scheduler.submit_image(1, ProcessPriority::Low, 5, "extra", &[STOP]);

        assert!(matches!(result, Err(SimulatorError::TableFull { capacity: 100 })));
        assert_eq!(scheduler.process_count(), 100);
    }

    #[test]
    fn test_scheduler_submit_unreadable_image() {
        let (mut scheduler, _) = scheduler();

        let result = scheduler.submit(1, ProcessPriority::Low, 5, "missing.bin");

        assert!(matches!(result, Err(SimulatorError::ImageUnreadable { .. })));
        assert_eq!(scheduler.process_count(), 0);
        assert!(scheduler.is_quiescent());
    }

    #[test]
    fn test_scheduler_tick_runs_stop_program() {
        let (mut scheduler, writer) = scheduler();
        let id = submit(&mut scheduler, "stop", 10, &[STOP]);

        scheduler.tick();

        assert!(scheduler.process(id).is_none());
        assert!(scheduler.is_quiescent());
        let records = writer.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reason, TerminationReason::CompletedNormally);
        assert_eq!(records[0].status.state, ProcessState::Running);
        assert_eq!(records[0].status.executed_cycles, 1);
    }

    #[test]
    fn test_scheduler_tick_enforces_cycle_limit() {
        let (mut scheduler, writer) = scheduler();
        let id = submit(&mut scheduler, "loop", 1, &[LOOP]);

        scheduler.tick();

        assert!(scheduler.process(id).is_none());
        let records = writer.records();
        assert_eq!(records[0].reason, TerminationReason::CpuTimeLimit);
        assert_eq!(records[0].status.executed_cycles, 2);
    }

    #[test]
    fn test_scheduler_single_process_stays_running_between_slices() {
        let (mut scheduler, _) = scheduler();
        let id = submit(&mut scheduler, "loop", 100, &[LOOP]);

        scheduler.tick();

        assert_eq!(scheduler.current(), Some(id));
        assert_eq!(scheduler.process(id).unwrap().state, ProcessState::Running);
        assert_eq!(scheduler.process(id).unwrap().executed_cycles(), 3);
        assert_eq!(scheduler.ready_len(), 0);
    }

    #[test]
    fn test_scheduler_round_robin_alternates() {
        let (mut scheduler, _) = scheduler();
        let a = submit(&mut scheduler, "a", 100, &[LOOP]);
        let b = submit(&mut scheduler, "b", 100, &[LOOP]);

        scheduler.tick();
        assert_eq!(scheduler.current(), Some(a));

        // b is admitted here, a requeues behind it, b is dispatched.
        scheduler.tick();
        assert_eq!(scheduler.current(), Some(b));
        assert_eq!(scheduler.process(a).unwrap().state, ProcessState::Ready);

        scheduler.tick();
        assert_eq!(scheduler.current(), Some(a));
        assert_eq!(scheduler.process(a).unwrap().executed_cycles(), 6);
        assert_eq!(scheduler.process(b).unwrap().executed_cycles(), 3);
    }

    #[test]
    fn test_scheduler_kill_ready_process_is_skipped() {
        let (mut scheduler, writer) = scheduler();
        let a = submit(&mut scheduler, "a", 100, &[LOOP]);
        let b = submit(&mut scheduler, "b", 100, &[LOOP]);
        scheduler.tick();
        scheduler.tick();
        assert_eq!(scheduler.current(), Some(b));

        assert!(scheduler.kill(a as i64));
        assert!(scheduler.process(a).is_none());
        assert_eq!(writer.records()[0].reason, TerminationReason::Killed);

        scheduler.tick();
        assert_eq!(scheduler.current(), Some(b));
        assert_eq!(scheduler.ready_len(), 0);
    }

    #[test]
    fn test_scheduler_kill_running_process_clears_current() {
        let (mut scheduler, _) = scheduler();
        let a = submit(&mut scheduler, "a", 100, &[LOOP]);
        scheduler.tick();

        assert!(scheduler.kill(a as i64));
        assert_eq!(scheduler.current(), None);
        assert!(scheduler.is_quiescent());
    }

    #[test]
    fn test_scheduler_kill_unknown_process() {
        let (mut scheduler, writer) = scheduler();
        let a = submit(&mut scheduler, "a", 100, &[STOP]);

        assert!(!scheduler.kill(-1));
        assert!(!scheduler.kill(7));
        assert!(scheduler.kill(a as i64));
        assert!(!scheduler.kill(a as i64));
        assert!(matches!(
            scheduler.try_kill(a as i64),
            Err(SimulatorError::UnknownProcess { id: 0 })
        ));
        assert_eq!(writer.records().len(), 1);
    }

    #[test]
    fn test_scheduler_killed_new_process_is_discarded_on_admission() {
        let (mut scheduler, writer) = scheduler();
        let a = submit(&mut scheduler, "a", 100, &[STOP]);
        scheduler.kill(a as i64);

        assert!(!scheduler.is_quiescent());
        scheduler.tick();

        assert!(scheduler.is_quiescent());
        assert_eq!(writer.records().len(), 1);
    }

    #[test]
    fn test_scheduler_ready_queue_capacity() {
        let (mut scheduler, _) = scheduler();
        for name in ["a", "b", "c", "d", "e", "f", "g", "h"] {
            submit(&mut scheduler, name, 1000, &[LOOP]);
        }

        for _ in 0..8 {
            scheduler.tick();
        }

        // One running plus five waiting; the rest stay in admission.
        assert!(scheduler.current().is_some());
        assert_eq!(scheduler.ready_len(), 5);
        assert_eq!(scheduler.new_len(), 2);
    }

    #[test]
    fn test_scheduler_run_until_quiescent() {
        let (mut scheduler, writer) = scheduler();
        submit(&mut scheduler, "a", 10, &[STOP]);
        submit(&mut scheduler, "b", 4, &[LOOP]);
        submit(&mut scheduler, "c", 10, &[0b001_00011, 0b011_00011, STOP, 9]);

        scheduler.run_until_quiescent();

        let reasons: Vec<(String, TerminationReason)> = writer
            .records()
            .into_iter()
            .map(|dump| (dump.status.name, dump.reason))
            .collect();
        assert_eq!(reasons.len(), 3);
        assert!(reasons.contains(&("a".to_string(), TerminationReason::CompletedNormally)));
        assert!(reasons.contains(&("b".to_string(), TerminationReason::CpuTimeLimit)));
        assert!(reasons.contains(&("c".to_string(), TerminationReason::CompletedNormally)));
        assert_eq!(scheduler.process_count(), 0);
    }

    #[test]
    fn test_scheduler_core_dump_failure_does_not_block_termination() {
        struct FailingWriter;

        impl CoreDumpWriter for FailingWriter {
            fn write(&mut self, _dump: &CoreDump) -> io::Result<()> {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only"))
            }
        }

        let mut scheduler = Scheduler::new(SchedulerConfig::default(), Box::new(NoImages), Box::new(FailingWriter));
        let id = scheduler
            .submit_image(0, ProcessPriority::High, 5, "p", &[STOP])
            .unwrap();

        scheduler.tick();

        assert!(scheduler.process(id).is_none());
        assert!(scheduler.is_quiescent());
    }
}
