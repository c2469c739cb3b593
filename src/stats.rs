use crate::date_provider::{DateProvider, SystemDateProvider};
use crate::error::Result;
use crate::keys::{CounterKey, DATES_SET_KEY, Metric, Mode, OPERANDS, Scope};
use crate::store::KeyValueStore;
use log::{debug, info, warn};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Aggregate snapshot for one (scope, mode), recomputed on every read
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Stats {
    pub correct: u32,
    pub incorrect: u32,
    pub avg_response_seconds: f64,
}

impl Stats {
    /// Builds the snapshot from raw counters. The average is
    /// `total_time_ms / total_answers / 1000`, or 0 with no answers.
    pub fn from_counters(correct: u32, incorrect: u32, total_time_ms: i64, total_answers: u32) -> Self {
        let avg_response_seconds = if total_answers > 0 {
            total_time_ms as f64 / total_answers as f64 / 1000.0
        } else {
            0.0
        };

        Stats {
            correct,
            incorrect,
            avg_response_seconds,
        }
    }

    pub fn total_answers(&self) -> u32 {
        self.correct + self.incorrect
    }

    pub fn is_empty(&self) -> bool {
        self.total_answers() == 0
    }
}

/// Correct and incorrect answer counts for each factor 1..=9
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberStats {
    pub correct: BTreeMap<u32, u32>,
    pub incorrect: BTreeMap<u32, u32>,
}

impl NumberStats {
    pub fn correct_for(&self, operand: u32) -> u32 {
        self.correct.get(&operand).copied().unwrap_or(0)
    }

    pub fn incorrect_for(&self, operand: u32) -> u32 {
        self.incorrect.get(&operand).copied().unwrap_or(0)
    }

    pub fn total_for(&self, operand: u32) -> u32 {
        self.correct_for(operand) + self.incorrect_for(operand)
    }

    /// Share of correct answers involving `operand`, in percent; 0 when unseen
    pub fn accuracy_percentage(&self, operand: u32) -> f64 {
        let total = self.total_for(operand);
        if total > 0 {
            self.correct_for(operand) as f64 / total as f64 * 100.0
        } else {
            0.0
        }
    }
}

/// One answered question as reported by the quiz
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outcome {
    pub mode: Mode,
    pub is_correct: bool,
    pub elapsed_ms: u64,
    pub operand_a: u32,
    pub operand_b: u32,
}

/// Write side of the statistics, as seen by the quiz.
/// Recording is fire-and-forget: implementors deal with their own failures.
pub trait OutcomeRecorder {
    fn record(&mut self, outcome: &Outcome);
}

impl<R: OutcomeRecorder + ?Sized> OutcomeRecorder for &mut R {
    fn record(&mut self, outcome: &Outcome) {
        (**self).record(outcome)
    }
}

/// Durable answer counters per (scope, mode[, operand]) over a key-value store
pub struct StatsAggregator<S: KeyValueStore> {
    store: S,
    date_provider: Arc<dyn DateProvider>,
}

impl<S: KeyValueStore> StatsAggregator<S> {
    pub fn new(store: S) -> Self {
        Self::with_date_provider(store, Arc::new(SystemDateProvider))
    }

    pub fn with_date_provider(store: S, date_provider: Arc<dyn DateProvider>) -> Self {
        StatsAggregator {
            store,
            date_provider,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Records one answer for today and for the global scope, plus the
    /// per-number counters (global, `total` bucket only)
    pub fn record_outcome(
        &mut self,
        mode: Mode,
        is_correct: bool,
        elapsed_ms: u64,
        operand_a: u32,
        operand_b: u32,
    ) -> Result<()> {
        let today = self.date_provider.today();
        self.add_date(&today)?;

        let elapsed_ms = i64::try_from(elapsed_ms).unwrap_or(i64::MAX);
        self.increment_answer(Scope::day(today.clone()), mode, is_correct, elapsed_ms)?;
        self.increment_answer(Scope::Global, mode, is_correct, elapsed_ms)?;

        let metric = Metric::for_operand(is_correct);
        self.increment_int(&CounterKey::for_operand(
            Scope::Global,
            Mode::Total,
            metric,
            operand_a,
        ))?;
        if operand_a != operand_b {
            self.increment_int(&CounterKey::for_operand(
                Scope::Global,
                Mode::Total,
                metric,
                operand_b,
            ))?;
        }

        info!(
            "Recorded {} {} answer for {} × {} on {} ({} ms)",
            if is_correct { "correct" } else { "incorrect" },
            mode.as_str(),
            operand_a,
            operand_b,
            today,
            elapsed_ms
        );
        Ok(())
    }

    pub fn get_stats(&self, mode: Mode, scope: &Scope) -> Result<Stats> {
        let correct = self.read_count(&CounterKey::new(scope.clone(), mode, Metric::CorrectAnswers))?;
        let incorrect =
            self.read_count(&CounterKey::new(scope.clone(), mode, Metric::IncorrectAnswers))?;
        let total_time_ms = self
            .store
            .get_long(
                &CounterKey::new(scope.clone(), mode, Metric::TotalTimeMs).to_string(),
                0,
            )?
            .max(0);
        let total_answers =
            self.read_count(&CounterKey::new(scope.clone(), mode, Metric::TotalAnswers))?;

        Ok(Stats::from_counters(
            correct,
            incorrect,
            total_time_ms,
            total_answers,
        ))
    }

    pub fn get_number_stats(&self, mode: Mode, scope: &Scope) -> Result<NumberStats> {
        let mut stats = NumberStats::default();
        for operand in OPERANDS {
            let correct = self.read_count(&CounterKey::for_operand(
                scope.clone(),
                mode,
                Metric::CorrectAnswersNumber,
                operand,
            ))?;
            let incorrect = self.read_count(&CounterKey::for_operand(
                scope.clone(),
                mode,
                Metric::IncorrectAnswersNumber,
                operand,
            ))?;
            stats.correct.insert(operand, correct);
            stats.incorrect.insert(operand, incorrect);
        }
        Ok(stats)
    }

    /// Stats for every recorded day, oldest first
    pub fn get_daily_stats(&self, mode: Mode) -> Result<BTreeMap<String, Stats>> {
        let dates = self.store.get_string_set(DATES_SET_KEY)?;
        let mut daily = BTreeMap::new();
        for date in dates {
            let stats = self.get_stats(mode, &Scope::day(date.clone()))?;
            daily.insert(date, stats);
        }
        Ok(daily)
    }

    /// Days with at least one recorded answer, oldest first
    pub fn recorded_dates(&self) -> Result<Vec<String>> {
        Ok(self.store.get_string_set(DATES_SET_KEY)?.into_iter().collect())
    }

    /// Wipes the whole store
    pub fn reset(&mut self) -> Result<()> {
        self.store.clear()?;
        info!("All statistics reset");
        Ok(())
    }

    fn add_date(&mut self, date: &str) -> Result<()> {
        let mut dates = self.store.get_string_set(DATES_SET_KEY)?;
        if dates.insert(date.to_string()) {
            debug!("First answer on {}", date);
            self.store.put_string_set(DATES_SET_KEY, &dates)?;
        }
        Ok(())
    }

    fn increment_answer(
        &mut self,
        scope: Scope,
        mode: Mode,
        is_correct: bool,
        elapsed_ms: i64,
    ) -> Result<()> {
        self.increment_int(&CounterKey::new(
            scope.clone(),
            mode,
            Metric::for_answer(is_correct),
        ))?;

        let time_key = CounterKey::new(scope.clone(), mode, Metric::TotalTimeMs).to_string();
        let total_time = self.store.get_long(&time_key, 0)?;
        self.store
            .put_long(&time_key, total_time.saturating_add(elapsed_ms))?;

        self.increment_int(&CounterKey::new(scope, mode, Metric::TotalAnswers))
    }

    fn increment_int(&mut self, key: &CounterKey) -> Result<()> {
        let key = key.to_string();
        let current = self.store.get_int(&key, 0)?;
        self.store.put_int(&key, current.saturating_add(1))
    }

    fn read_count(&self, key: &CounterKey) -> Result<u32> {
        let value = self.store.get_int(&key.to_string(), 0)?;
        Ok(u32::try_from(value).unwrap_or(0))
    }
}

impl<S: KeyValueStore> OutcomeRecorder for StatsAggregator<S> {
    fn record(&mut self, outcome: &Outcome) {
        if let Err(e) = self.record_outcome(
            outcome.mode,
            outcome.is_correct,
            outcome.elapsed_ms,
            outcome.operand_a,
            outcome.operand_b,
        ) {
            warn!("Failed to record quiz outcome: {}", e);
        }
    }
}
