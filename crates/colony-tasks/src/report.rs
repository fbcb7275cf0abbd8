use colony_core::AgentId;

/// Outcome of one `execute_tasks` pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionReport {
    pub tick: u64,
    /// Agents whose slot was reached before the budget ran out.
    pub processed: usize,
    /// Processed agents that had a task to step.
    pub stepped: usize,
    pub completed: usize,
    /// Agents deferred to a later tick by the CPU budget.
    pub skipped: usize,
    pub budget: f64,
}

impl ExecutionReport {
    pub fn summary(&self) -> String {
        format!(
            "Processed: {}, Stepped: {}, Completed: {}, Skipped: {}, Budget: {:.1}",
            self.processed, self.stepped, self.completed, self.skipped, self.budget
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StarvationReport {
    /// Agents with an execution record.
    pub tracked: usize,
    pub starved: Vec<AgentId>,
    /// Longest gap since last execution among tracked agents.
    pub worst_gap: u64,
}

impl StarvationReport {
    pub fn is_healthy(&self) -> bool {
        self.starved.is_empty()
    }
}
