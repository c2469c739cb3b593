use crate::cli::{Args, Command};
use crate::quiz::{ADVANCE_DELAY, AnswerMode, AnswerResult, Evaluation, QuizEngine};
use crate::report::{render_daily_report, render_global_report, render_session, render_table};
use crate::stats::OutcomeRecorder;
use crate::store_factory::StoreFactory;
use crate::table::TableSelection;
use colored::Colorize;
use log::info;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::error::Error;
use std::io::{self, BufRead, BufReader, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};

/// Knobs for the interactive quiz loop
#[derive(Debug, Clone)]
pub struct QuizOptions {
    /// Stop once this many questions have been answered correctly
    pub limit: Option<u32>,
    /// Pause before moving on after a correct answer
    pub advance_delay: Duration,
}

impl Default for QuizOptions {
    fn default() -> Self {
        QuizOptions {
            limit: None,
            advance_delay: ADVANCE_DELAY,
        }
    }
}

/// Runs the chosen subcommand against stdin/stdout
pub fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    if args.no_color {
        colored::control::set_override(false);
    }
    let config = args.store_config()?;
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match &args.command {
        Command::Table { row, col } => {
            let mut selection = TableSelection::new();
            if let Some(row) = row {
                selection.click_row_header(*row);
            }
            if let Some(col) = col {
                selection.click_col_header(*col);
            }
            write!(out, "{}", render_table(&selection))?;
        }
        Command::Quiz { mode, questions } => {
            let mut aggregator = StoreFactory::create(&config)?;
            let mut engine = QuizEngine::with_clock(
                &mut aggregator,
                config.date_provider(),
                StdRng::from_entropy(),
            );
            engine.set_mode(*mode);
            let options = QuizOptions {
                limit: *questions,
                ..QuizOptions::default()
            };
            run_quiz(&mut engine, BufReader::new(io::stdin()), &mut out, &options)?;
        }
        Command::Stats { daily } => {
            let aggregator = StoreFactory::create(&config)?;
            let report = if *daily {
                render_daily_report(&aggregator)?
            } else {
                render_global_report(&aggregator)?
            };
            write!(out, "{}", report)?;
        }
        Command::Reset { yes } => {
            if !*yes && !confirm_reset(stdin.lock(), &mut out)? {
                writeln!(out, "Reset cancelled")?;
                return Ok(());
            }
            let mut aggregator = StoreFactory::create(&config)?;
            aggregator.reset()?;
            writeln!(out, "All statistics have been reset")?;
        }
    }

    Ok(())
}

/// Asks before wiping the statistics; anything but y/yes declines
pub fn confirm_reset<I: BufRead, O: Write>(mut input: I, out: &mut O) -> io::Result<bool> {
    write!(out, "Reset all statistics? This cannot be undone. [y/N] ")?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(matches!(line.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Line-driven quiz: `q` quits, `m` switches entry mode, `s` prints the
/// session score. Ends at EOF or after `options.limit` solved questions.
///
/// Input is read on its own thread. Lines that arrive during the pause after
/// a correct answer still apply to the answered question, so type-ahead is
/// never scored against a question the user has not seen.
pub fn run_quiz<R, I, O>(
    engine: &mut QuizEngine<R>,
    input: I,
    out: &mut O,
    options: &QuizOptions,
) -> io::Result<()>
where
    R: OutcomeRecorder,
    I: BufRead + Send + 'static,
    O: Write,
{
    let lines = spawn_line_reader(input);
    let mut solved = 0;

    writeln!(
        out,
        "Quiz in {} mode. Type q to quit, m to switch mode, s for your score.",
        engine.mode().as_str()
    )?;

    loop {
        write_prompt(engine, out)?;
        let line = match lines.recv() {
            Ok(line) => line?,
            Err(_) => break,
        };

        let token = match handle_line(engine, &line, out)? {
            LineOutcome::Quit => break,
            LineOutcome::Handled(evaluation) => evaluation.and_then(|e| e.advance),
        };
        let Some(token) = token else {
            continue;
        };

        if !wait_for_advance(engine, &lines, out, options.advance_delay)? {
            break;
        }
        engine.fire_advance(token);
        solved += 1;
        writeln!(out, "{}", render_session(&engine.session()))?;
        if options.limit.is_some_and(|limit| solved >= limit) {
            break;
        }
    }

    let session = engine.session();
    info!(
        "Quiz finished: {} correct, {} wrong",
        session.correct, session.incorrect
    );
    writeln!(out)?;
    writeln!(out, "Session: {}", render_session(&session))?;
    out.flush()
}

enum LineOutcome {
    Quit,
    Handled(Option<Evaluation>),
}

/// Forwards input lines over a channel until EOF, a read error, or the
/// receiver going away
fn spawn_line_reader<I: BufRead + Send + 'static>(input: I) -> Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in input.lines() {
            let failed = line.is_err();
            if tx.send(line).is_err() || failed {
                break;
            }
        }
    });
    rx
}

fn handle_line<R: OutcomeRecorder, O: Write>(
    engine: &mut QuizEngine<R>,
    line: &str,
    out: &mut O,
) -> io::Result<LineOutcome> {
    let evaluation = match line.trim() {
        "q" => return Ok(LineOutcome::Quit),
        "m" => {
            let mode = engine.toggle_mode();
            writeln!(out, "Switched to {} mode", mode.as_str())?;
            None
        }
        "s" => {
            writeln!(out, "{}", render_session(&engine.session()))?;
            None
        }
        answer => match engine.mode() {
            AnswerMode::Input => engine.evaluate_input(answer),
            AnswerMode::Selection => match pick_option(engine.options(), answer) {
                Some(value) => engine.select_option(value),
                None => {
                    writeln!(out, "Pick a number between 1 and {}", engine.options().len())?;
                    None
                }
            },
        },
    };

    if let Some(evaluation) = &evaluation {
        write_feedback(evaluation, out)?;
    }
    Ok(LineOutcome::Handled(evaluation))
}

/// Keeps handling input until `delay` has passed. Returns `false` if the
/// user quit in the meantime.
fn wait_for_advance<R: OutcomeRecorder, O: Write>(
    engine: &mut QuizEngine<R>,
    lines: &Receiver<io::Result<String>>,
    out: &mut O,
    delay: Duration,
) -> io::Result<bool> {
    let deadline = Instant::now() + delay;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(true);
        }
        out.flush()?;
        match lines.recv_timeout(remaining) {
            Ok(line) => {
                if let LineOutcome::Quit = handle_line(engine, &line?, out)? {
                    return Ok(false);
                }
            }
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => {
                return Ok(true);
            }
        }
    }
}

/// Maps a 1-based button number onto the offered value
fn pick_option(options: &[u32], answer: &str) -> Option<u32> {
    let index: usize = answer.parse().ok()?;
    index.checked_sub(1).and_then(|i| options.get(i)).copied()
}

fn write_prompt<R: OutcomeRecorder, O: Write>(engine: &QuizEngine<R>, out: &mut O) -> io::Result<()> {
    let question = engine.question();
    match engine.mode() {
        AnswerMode::Input => {
            write!(out, "{} × {} = ", question.number1, question.number2)?;
        }
        AnswerMode::Selection => {
            writeln!(out, "{}", question)?;
            for (row, pair) in engine.options().chunks(2).enumerate() {
                let cells: Vec<String> = pair
                    .iter()
                    .enumerate()
                    .map(|(i, &value)| {
                        let label = format!("[{}] {:<3}", row * 2 + i + 1, value);
                        match engine.feedback(value) {
                            Some(true) => label.green().to_string(),
                            Some(false) => label.red().to_string(),
                            None => label,
                        }
                    })
                    .collect();
                writeln!(out, "  {}", cells.join("  "))?;
            }
            write!(out, "Pick 1-{}: ", engine.options().len())?;
        }
    }
    out.flush()
}

fn write_feedback<O: Write>(evaluation: &Evaluation, out: &mut O) -> io::Result<()> {
    match evaluation.result {
        AnswerResult::Correct => writeln!(out, "{}", "Correct!".green().bold()),
        AnswerResult::Incorrect => writeln!(out, "{}", "Wrong, try again".red()),
    }
}
