use crate::records::day_log::DayLog;
use crate::records::todo::TodoList;

pub const STEP_GOAL: u32 = 10_000;
pub const STUDY_GOAL_MINUTES: u32 = 120;
pub const TODO_GOAL: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Goals {
    pub steps: u32,
    pub study_minutes: u32,
    pub todos: u32,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            steps: STEP_GOAL,
            study_minutes: STUDY_GOAL_MINUTES,
            todos: TODO_GOAL,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub steps: f64,
    pub study: f64,
    pub todos: f64,
}

impl Progress {
    pub fn compute(log: &DayLog, todos: &TodoList, goals: &Goals) -> Self {
        Self {
            steps: percent_of_goal(log.steps_value(), goals.steps),
            study: percent_of_goal(log.study_minutes_value(), goals.study_minutes),
            todos: todo_progress(todos.done_count(), goals),
        }
    }
}

pub fn percent_of_goal(value: f64, goal: u32) -> f64 {
    if goal == 0 || !value.is_finite() {
        return 0.0;
    }

    (value / f64::from(goal) * 100.0).clamp(0.0, 100.0)
}

pub fn todo_progress(done: usize, goals: &Goals) -> f64 {
    percent_of_goal(done as f64, goals.todos)
}
