use multiplication_table::date_provider::{DateProvider, ManualDateProvider};
use multiplication_table::keys::{CounterKey, DATES_SET_KEY, Metric, Mode, Scope};
use multiplication_table::quiz::{AnswerMode, AnswerResult, QuizEngine};
use multiplication_table::stats::StatsAggregator;
use multiplication_table::store::{KeyValueStore, SqliteStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::Arc;

fn sqlite_aggregator(clock: Arc<ManualDateProvider>) -> StatsAggregator<SqliteStore> {
    let store = SqliteStore::in_memory().expect("Failed to open in-memory store");
    StatsAggregator::with_date_provider(store, clock)
}

fn clock_at(year: i32, month: u32, day: u32) -> Arc<ManualDateProvider> {
    Arc::new(ManualDateProvider::at_date(year, month, day).expect("valid date"))
}

#[test]
fn test_two_answers_on_same_operands() {
    let mut aggregator = sqlite_aggregator(clock_at(2024, 3, 15));

    aggregator.record_outcome(Mode::Input, true, 2000, 3, 4).unwrap();
    aggregator.record_outcome(Mode::Input, false, 1000, 3, 4).unwrap();

    let stats = aggregator.get_stats(Mode::Input, &Scope::Global).unwrap();
    assert_eq!(stats.correct, 1);
    assert_eq!(stats.incorrect, 1);
    assert_eq!(stats.avg_response_seconds, 1.5);

    let numbers = aggregator.get_number_stats(Mode::Total, &Scope::Global).unwrap();
    assert_eq!(numbers.correct_for(3), 1);
    assert_eq!(numbers.incorrect_for(3), 1);
    assert_eq!(numbers.correct_for(4), 1);
    assert_eq!(numbers.incorrect_for(4), 1);
    assert_eq!(numbers.accuracy_percentage(3), 50.0);
}

#[test]
fn test_keys_written_to_store() {
    let mut aggregator = sqlite_aggregator(clock_at(2024, 3, 15));
    aggregator.record_outcome(Mode::Selection, true, 1500, 7, 8).unwrap();

    let store = aggregator.store();
    assert_eq!(store.get_int("global_selection_correct_answers", 0).unwrap(), 1);
    assert_eq!(store.get_long("global_selection_total_time_ms", 0).unwrap(), 1500);
    assert_eq!(store.get_int("2024-03-15_selection_total_answers", 0).unwrap(), 1);
    assert_eq!(store.get_int("2024-03-15_selection_correct_answers", 0).unwrap(), 1);
    assert_eq!(store.get_int("global_total_correct_answers_number_7", 0).unwrap(), 1);
    assert_eq!(store.get_int("global_total_correct_answers_number_8", 0).unwrap(), 1);
    assert_eq!(
        store
            .get_int(
                &CounterKey::for_operand(Scope::Global, Mode::Total, Metric::CorrectAnswersNumber, 7)
                    .to_string(),
                0
            )
            .unwrap(),
        1
    );
    // per-number counters are not kept per day
    assert_eq!(
        store.get_int("2024-03-15_total_correct_answers_number_7", 0).unwrap(),
        0
    );
    assert!(store.get_string_set(DATES_SET_KEY).unwrap().contains("2024-03-15"));
}

#[test]
fn test_daily_stats_span_days_in_order() {
    let clock = clock_at(2024, 3, 14);
    let mut aggregator = sqlite_aggregator(clock.clone());

    aggregator.record_outcome(Mode::Input, true, 1000, 2, 5).unwrap();
    clock.advance_ms(24 * 60 * 60 * 1000);
    aggregator.record_outcome(Mode::Input, false, 3000, 6, 6).unwrap();
    aggregator.record_outcome(Mode::Selection, true, 500, 1, 9).unwrap();

    let daily = aggregator.get_daily_stats(Mode::Input).unwrap();
    let dates: Vec<&String> = daily.keys().collect();
    assert_eq!(dates, vec!["2024-03-14", "2024-03-15"]);
    assert_eq!(daily["2024-03-14"].correct, 1);
    assert_eq!(daily["2024-03-15"].incorrect, 1);
    assert_eq!(daily["2024-03-15"].avg_response_seconds, 3.0);

    let input = aggregator.get_stats(Mode::Input, &Scope::Global).unwrap();
    assert_eq!(input.total_answers(), 2);
    assert_eq!(input.avg_response_seconds, 2.0);
    let selection = aggregator
        .get_stats(Mode::Selection, &Scope::day("2024-03-15"))
        .unwrap();
    assert_eq!(selection.correct, 1);
}

#[test]
fn test_reset_clears_everything() {
    let mut aggregator = sqlite_aggregator(clock_at(2024, 3, 15));
    aggregator.record_outcome(Mode::Input, true, 1000, 2, 3).unwrap();

    aggregator.reset().unwrap();

    assert!(aggregator.get_stats(Mode::Input, &Scope::Global).unwrap().is_empty());
    assert!(aggregator.get_daily_stats(Mode::Input).unwrap().is_empty());
    assert!(aggregator.recorded_dates().unwrap().is_empty());
    assert_eq!(aggregator.store().count_scalars().unwrap(), 0);
}

#[test]
fn test_engine_feeds_aggregator() {
    let clock = clock_at(2024, 3, 15);
    let mut aggregator = sqlite_aggregator(clock.clone());

    {
        let mut engine = QuizEngine::with_clock(
            &mut aggregator,
            clock.clone() as Arc<dyn DateProvider>,
            StdRng::seed_from_u64(42),
        );
        let product = engine.question().product();

        clock.advance_ms(1200);
        let wrong = engine.evaluate_input("not a number").unwrap();
        assert_eq!(wrong.result, AnswerResult::Incorrect);
        assert!(wrong.advance.is_none());

        clock.advance_ms(800);
        let right = engine.evaluate_input(&product.to_string()).unwrap();
        assert_eq!(right.result, AnswerResult::Correct);
        let token = right.advance.unwrap();

        assert!(engine.evaluate_input(&product.to_string()).is_none());
        assert!(engine.fire_advance(token));
        assert!(!engine.fire_advance(token));
        assert_eq!(engine.generation(), 1);

        engine.set_mode(AnswerMode::Selection);
        let product = engine.question().product();
        engine.select_option(product).unwrap();
    }

    let input = aggregator.get_stats(Mode::Input, &Scope::Global).unwrap();
    assert_eq!((input.correct, input.incorrect), (1, 1));
    let selection = aggregator
        .get_stats(Mode::Selection, &Scope::Global)
        .unwrap();
    assert_eq!(selection.correct, 1);
    let today = aggregator.get_stats(Mode::Input, &Scope::day("2024-03-15")).unwrap();
    assert_eq!(today.total_answers(), 2);
}
