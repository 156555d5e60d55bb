use std::time::{Duration, Instant};

use crate::SharedString;

/// Duration measurement for a named task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskTiming {
    /// Human-readable task name.
    pub task_name: SharedString,
    /// Measured elapsed duration.
    pub elapsed: Duration,
}

impl TaskTiming {
    /// Elapsed time in fractional milliseconds, for log fields.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed.as_secs_f64() * 1000.0
    }
}

/// Running timer for one named task.
///
/// Works across `.await` points: start it before issuing a request and finish it
/// once the outcome is known.
#[derive(Debug)]
pub struct TaskTimer {
    task_name: SharedString,
    started_at: Instant,
}

impl TaskTimer {
    /// Starts a timer for a named task.
    pub fn start(task_name: impl Into<SharedString>) -> Self {
        Self {
            task_name: task_name.into(),
            started_at: Instant::now(),
        }
    }

    /// Finishes the task and returns its timing data.
    pub fn finish(self) -> TaskTiming {
        TaskTiming {
            task_name: self.task_name,
            elapsed: self.started_at.elapsed(),
        }
    }
}
