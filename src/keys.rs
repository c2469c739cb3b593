use std::fmt;

/// Store key holding the set of days that have recorded answers
pub const DATES_SET_KEY: &str = "dates_set";

/// Factors asked in the quiz and tracked per number
pub const OPERANDS: std::ops::RangeInclusive<u32> = 1..=9;

/// Which counters a key belongs to: the all-time totals or a single day
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Scope {
    Global,
    /// Calendar day as `YYYY-MM-DD`
    Day(String),
}

impl Scope {
    pub fn day(date: impl Into<String>) -> Self {
        Scope::Day(date.into())
    }

    pub fn as_str(&self) -> &str {
        match self {
            Scope::Global => "global",
            Scope::Day(date) => date,
        }
    }
}

/// Counter bucket. `Input` and `Selection` follow the answer-entry method;
/// `Total` collects the per-number counters for both methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Mode {
    Input,
    Selection,
    Total,
}

impl Mode {
    pub fn as_str(&self) -> &str {
        match self {
            Mode::Input => "input",
            Mode::Selection => "selection",
            Mode::Total => "total",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    CorrectAnswers,
    IncorrectAnswers,
    TotalTimeMs,
    TotalAnswers,
    CorrectAnswersNumber,
    IncorrectAnswersNumber,
}

impl Metric {
    pub fn as_str(&self) -> &str {
        match self {
            Metric::CorrectAnswers => "correct_answers",
            Metric::IncorrectAnswers => "incorrect_answers",
            Metric::TotalTimeMs => "total_time_ms",
            Metric::TotalAnswers => "total_answers",
            Metric::CorrectAnswersNumber => "correct_answers_number",
            Metric::IncorrectAnswersNumber => "incorrect_answers_number",
        }
    }

    /// The base counter an answer bumps
    pub fn for_answer(is_correct: bool) -> Self {
        if is_correct {
            Metric::CorrectAnswers
        } else {
            Metric::IncorrectAnswers
        }
    }

    /// The per-number counter an answer bumps
    pub fn for_operand(is_correct: bool) -> Self {
        if is_correct {
            Metric::CorrectAnswersNumber
        } else {
            Metric::IncorrectAnswersNumber
        }
    }
}

/// Structured address of one counter; [`fmt::Display`] yields the store key
/// `{scope}_{mode}_{metric}` or `{scope}_{mode}_{metric}_{operand}`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CounterKey {
    pub scope: Scope,
    pub mode: Mode,
    pub metric: Metric,
    pub operand: Option<u32>,
}

impl CounterKey {
    pub fn new(scope: Scope, mode: Mode, metric: Metric) -> Self {
        CounterKey {
            scope,
            mode,
            metric,
            operand: None,
        }
    }

    pub fn for_operand(scope: Scope, mode: Mode, metric: Metric, operand: u32) -> Self {
        CounterKey {
            scope,
            mode,
            metric,
            operand: Some(operand),
        }
    }
}

impl fmt::Display for CounterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{}",
            self.scope.as_str(),
            self.mode.as_str(),
            self.metric.as_str()
        )?;
        if let Some(operand) = self.operand {
            write!(f, "_{}", operand)?;
        }
        Ok(())
    }
}
