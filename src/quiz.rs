use crate::date_provider::{DateProvider, SystemDateProvider};
use crate::keys::Mode;
use crate::question::{Question, answer_options, parse_answer};
use crate::stats::{Outcome, OutcomeRecorder, Stats};
use chrono::{DateTime, FixedOffset};
use log::debug;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

/// Pause between a correct answer and the next question
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1000);

/// How the user enters answers
#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerMode {
    Input,
    Selection,
}

impl AnswerMode {
    pub fn as_str(&self) -> &str {
        match self {
            AnswerMode::Input => "input",
            AnswerMode::Selection => "selection",
        }
    }

    /// Counter bucket the answers are recorded under
    pub fn stats_mode(&self) -> Mode {
        match self {
            AnswerMode::Input => Mode::Input,
            AnswerMode::Selection => Mode::Selection,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            AnswerMode::Input => AnswerMode::Selection,
            AnswerMode::Selection => AnswerMode::Input,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerResult {
    Correct,
    Incorrect,
}

impl AnswerResult {
    fn from_correct(is_correct: bool) -> Self {
        if is_correct {
            AnswerResult::Correct
        } else {
            AnswerResult::Incorrect
        }
    }
}

/// Handle for a scheduled move to the next question. Only valid for the
/// question it was issued for; firing it later is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdvanceToken {
    generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct PendingAdvance {
    token: AdvanceToken,
    due: DateTime<FixedOffset>,
}

/// What a submission did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub result: AnswerResult,
    /// Whether the answer was passed on to the statistics
    pub recorded: bool,
    pub elapsed_ms: u64,
    /// Set when the answer was correct and the next question is scheduled
    pub advance: Option<AdvanceToken>,
}

/// Counters for the answers given since the quiz was opened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionStats {
    pub correct: u32,
    pub incorrect: u32,
    pub total_time_ms: u64,
    pub answers: u32,
}

impl SessionStats {
    fn add(&mut self, is_correct: bool, elapsed_ms: u64) {
        if is_correct {
            self.correct += 1;
        } else {
            self.incorrect += 1;
        }
        self.total_time_ms = self.total_time_ms.saturating_add(elapsed_ms);
        self.answers += 1;
    }

    pub fn avg_response_seconds(&self) -> f64 {
        self.to_stats().avg_response_seconds
    }

    pub fn to_stats(&self) -> Stats {
        Stats::from_counters(
            self.correct,
            self.incorrect,
            i64::try_from(self.total_time_ms).unwrap_or(i64::MAX),
            self.answers,
        )
    }
}

/// Quiz state machine, decoupled from any front-end.
///
/// Every reported answer goes to the [`OutcomeRecorder`]; the engine never
/// reads statistics back.
pub struct QuizEngine<R: OutcomeRecorder> {
    recorder: R,
    clock: Arc<dyn DateProvider>,
    rng: StdRng,
    question: Question,
    mode: AnswerMode,
    pending_answer: String,
    result: Option<AnswerResult>,
    options: Vec<u32>,
    feedback: BTreeMap<u32, bool>,
    first_attempt_made: bool,
    generation: u64,
    started_at: DateTime<FixedOffset>,
    pending_advance: Option<PendingAdvance>,
    session: SessionStats,
}

impl<R: OutcomeRecorder> QuizEngine<R> {
    pub fn new(recorder: R) -> Self {
        Self::with_clock(recorder, Arc::new(SystemDateProvider), StdRng::from_entropy())
    }

    pub fn with_clock(recorder: R, clock: Arc<dyn DateProvider>, mut rng: StdRng) -> Self {
        let question = Question::generate(&mut rng);
        let options = answer_options(question.product(), &mut rng);
        let started_at = clock.now();

        QuizEngine {
            recorder,
            clock,
            rng,
            question,
            mode: AnswerMode::Input,
            pending_answer: String::new(),
            result: None,
            options,
            feedback: BTreeMap::new(),
            first_attempt_made: false,
            generation: 0,
            started_at,
            pending_advance: None,
            session: SessionStats::default(),
        }
    }

    pub fn question(&self) -> Question {
        self.question
    }

    pub fn mode(&self) -> AnswerMode {
        self.mode
    }

    pub fn result(&self) -> Option<AnswerResult> {
        self.result
    }

    /// The shuffled candidates for selection mode
    pub fn options(&self) -> &[u32] {
        &self.options
    }

    /// Revealed feedback for one option: `Some(true)` once picked and correct
    pub fn feedback(&self, option: u32) -> Option<bool> {
        self.feedback.get(&option).copied()
    }

    pub fn pending_answer(&self) -> &str {
        &self.pending_answer
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn pending_advance(&self) -> Option<AdvanceToken> {
        self.pending_advance.map(|pending| pending.token)
    }

    pub fn session(&self) -> SessionStats {
        self.session
    }

    pub fn recorder(&self) -> &R {
        &self.recorder
    }

    /// Draws a fresh pair and clears everything tied to the old one,
    /// including any scheduled advance
    pub fn generate_question(&mut self) -> Question {
        self.question = Question::generate(&mut self.rng);
        self.options = answer_options(self.question.product(), &mut self.rng);
        self.pending_answer.clear();
        self.result = None;
        self.feedback.clear();
        self.first_attempt_made = false;
        self.generation += 1;
        self.pending_advance = None;
        self.started_at = self.clock.now();
        debug!(
            "Question #{}: {} (options {:?})",
            self.generation, self.question, self.options
        );
        self.question
    }

    /// Switching the entry method restarts the question clock
    pub fn set_mode(&mut self, mode: AnswerMode) {
        if self.mode != mode {
            self.mode = mode;
            self.started_at = self.clock.now();
        }
    }

    pub fn toggle_mode(&mut self) -> AnswerMode {
        self.set_mode(self.mode.toggled());
        self.mode
    }

    pub fn set_answer(&mut self, text: &str) {
        self.pending_answer = text.to_string();
    }

    /// Evaluates the text stored with [`QuizEngine::set_answer`]
    pub fn submit_input(&mut self) -> Option<Evaluation> {
        let text = std::mem::take(&mut self.pending_answer);
        let evaluation = self.evaluate_input(&text);
        self.pending_answer = text;
        evaluation
    }

    /// Scores a typed answer. Anything that is not a number counts as wrong.
    /// Returns `None` when the question is already answered correctly and
    /// waiting to advance.
    pub fn evaluate_input(&mut self, text: &str) -> Option<Evaluation> {
        if self.result == Some(AnswerResult::Correct) {
            return None;
        }

        let is_correct = parse_answer(text).is_some_and(|answer| self.question.check_answer(answer));
        let elapsed_ms = self.report(AnswerMode::Input, is_correct);
        self.result = Some(AnswerResult::from_correct(is_correct));

        let advance = is_correct.then(|| self.schedule_advance());
        Some(Evaluation {
            result: AnswerResult::from_correct(is_correct),
            recorded: true,
            elapsed_ms,
            advance,
        })
    }

    /// Picks one of the offered options. Only the first pick of a question
    /// reaches the statistics; later picks only reveal feedback. Values that
    /// are not on offer are ignored.
    pub fn select_option(&mut self, value: u32) -> Option<Evaluation> {
        if !self.options.contains(&value) {
            return None;
        }

        let is_correct = self.question.check_answer(value);
        let recorded = !self.first_attempt_made;
        let elapsed_ms = if recorded {
            self.first_attempt_made = true;
            self.report(AnswerMode::Selection, is_correct)
        } else {
            self.elapsed_ms()
        };

        self.feedback.insert(value, is_correct);
        let advance = if is_correct {
            self.result = Some(AnswerResult::Correct);
            Some(
                self.pending_advance()
                    .unwrap_or_else(|| self.schedule_advance()),
            )
        } else {
            if self.result != Some(AnswerResult::Correct) {
                self.result = Some(AnswerResult::Incorrect);
            }
            None
        };

        Some(Evaluation {
            result: AnswerResult::from_correct(is_correct),
            recorded,
            elapsed_ms,
            advance,
        })
    }

    /// Moves to the next question if `token` still belongs to the current
    /// one. Returns whether a new question was generated.
    pub fn fire_advance(&mut self, token: AdvanceToken) -> bool {
        match self.pending_advance {
            Some(pending) if pending.token == token && token.generation == self.generation => {
                self.generate_question();
                true
            }
            _ => {
                debug!(
                    "Ignoring stale advance for question #{} (now #{})",
                    token.generation, self.generation
                );
                false
            }
        }
    }

    /// Fires the scheduled advance once its delay has passed on the clock
    pub fn poll_advance(&mut self) -> bool {
        match self.pending_advance {
            Some(pending) if self.clock.now() >= pending.due => self.fire_advance(pending.token),
            _ => false,
        }
    }

    fn elapsed_ms(&self) -> u64 {
        let elapsed = (self.clock.now() - self.started_at).num_milliseconds();
        u64::try_from(elapsed).unwrap_or(0)
    }

    fn report(&mut self, mode: AnswerMode, is_correct: bool) -> u64 {
        let elapsed_ms = self.elapsed_ms();
        self.session.add(is_correct, elapsed_ms);
        self.recorder.record(&Outcome {
            mode: mode.stats_mode(),
            is_correct,
            elapsed_ms,
            operand_a: self.question.number1,
            operand_b: self.question.number2,
        });
        elapsed_ms
    }

    fn schedule_advance(&mut self) -> AdvanceToken {
        let token = AdvanceToken {
            generation: self.generation,
        };
        let delay = chrono::Duration::milliseconds(ADVANCE_DELAY.as_millis() as i64);
        self.pending_advance = Some(PendingAdvance {
            token,
            due: self.clock.now() + delay,
        });
        token
    }
}
