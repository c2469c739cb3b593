use crate::error::Result;
use crate::keys::{Mode, OPERANDS, Scope};
use crate::quiz::SessionStats;
use crate::stats::{NumberStats, Stats, StatsAggregator};
use crate::store::KeyValueStore;
use crate::table::{CellHighlight, TableSelection, rows};
use colored::Colorize;
use std::collections::BTreeMap;

/// Widest bar, in characters
pub const CHART_WIDTH: usize = 30;

const BAR: &str = "█";

pub fn format_seconds(seconds: f64) -> String {
    format!("{:.2} s", seconds)
}

pub fn format_percentage(percentage: f64) -> String {
    format!("{:.1}%", percentage)
}

/// `YYYY-MM-DD` → `MM/DD`
pub fn date_label(date: &str) -> String {
    match date.get(5..) {
        Some(month_day) if !month_day.is_empty() => month_day.replace('-', "/"),
        _ => date.to_string(),
    }
}

/// Bar length for `value` against the largest value in the chart
pub fn bar_length(value: f64, max: f64) -> usize {
    if max <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / max) * CHART_WIDTH as f64).round() as usize
}

/// Joins rendered lines, each terminated by a newline
fn block(lines: Vec<String>) -> String {
    lines.into_iter().map(|line| line + "\n").collect()
}

/// The 9×9 grid with the current selection highlighted
pub fn render_table(selection: &TableSelection) -> String {
    let header: String = OPERANDS.map(|col| format!("{:>3}", col)).collect();
    let mut lines = vec![
        format!("× |{}", header),
        format!("--+{}", "-".repeat(3 * OPERANDS.count())),
    ];

    for (row, values) in OPERANDS.zip(rows()) {
        let mut line = format!("{:<2}|", row);
        for (col, value) in OPERANDS.zip(values) {
            let cell = format!("{:>3}", value);
            let cell = match selection.cell_highlight(row, col) {
                CellHighlight::Intersection => cell.green().bold().to_string(),
                CellHighlight::Highlighted => cell.yellow().to_string(),
                CellHighlight::Dimmed => cell.dimmed().to_string(),
                CellHighlight::Normal => cell,
            };
            line.push_str(&cell);
        }
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(match selection.selected_product() {
        Some((row, col, product)) => format!("{} × {} = {}", row, col, product.to_string().green()),
        None => "Pick a row and a column to see their product".to_string(),
    });
    block(lines)
}

pub fn render_stats_table(title: &str, stats: &Stats) -> String {
    block(vec![
        title.bold().to_string(),
        format!("  Correct answers:     {}", stats.correct.to_string().green()),
        format!("  Wrong answers:       {}", stats.incorrect.to_string().red()),
        format!(
            "  Average answer time: {}",
            format_seconds(stats.avg_response_seconds).blue()
        ),
    ])
}

pub fn render_number_stats(numbers: &NumberStats) -> String {
    let mut lines = vec![
        "Answers per number".bold().to_string(),
        "  Number  Correct %".to_string(),
    ];
    lines.extend(OPERANDS.map(|operand| {
        format!(
            "  {:>6}  {:>9}",
            operand,
            format_percentage(numbers.accuracy_percentage(operand))
        )
    }));
    block(lines)
}

/// Correct vs wrong answers per day, both bars scaled to the larger count
pub fn render_combined_chart(title: &str, daily: &BTreeMap<String, Stats>) -> String {
    if daily.is_empty() {
        return block(vec![format!("No data yet for {}", title)]);
    }

    let max = daily
        .values()
        .map(|s| s.correct.max(s.incorrect))
        .max()
        .unwrap_or(0)
        .max(1) as f64;

    let mut lines = vec![title.bold().to_string()];
    for (date, stats) in daily {
        let correct_bar = BAR.repeat(bar_length(stats.correct as f64, max));
        let wrong_bar = BAR.repeat(bar_length(stats.incorrect as f64, max));
        lines.push(format!(
            "  {} ✓ {} {}",
            date_label(date),
            correct_bar.green(),
            stats.correct
        ));
        lines.push(format!("        ✗ {} {}", wrong_bar.red(), stats.incorrect));
    }
    block(lines)
}

/// Average answer time per day
pub fn render_time_chart(title: &str, daily: &BTreeMap<String, Stats>) -> String {
    if daily.is_empty() {
        return block(vec![format!("No data yet for {}", title)]);
    }

    let max = daily
        .values()
        .map(|s| s.avg_response_seconds)
        .fold(0.0_f64, f64::max);

    let mut lines = vec![title.bold().to_string()];
    lines.extend(daily.iter().map(|(date, stats)| {
        let bar = BAR.repeat(bar_length(stats.avg_response_seconds, max));
        format!(
            "  {} {} {}",
            date_label(date),
            bar.blue(),
            format_seconds(stats.avg_response_seconds)
        )
    }));
    block(lines)
}

/// All-time tables for both entry modes plus the per-number accuracy
pub fn render_global_report<S: KeyValueStore>(aggregator: &StatsAggregator<S>) -> Result<String> {
    let input = aggregator.get_stats(Mode::Input, &Scope::Global)?;
    let selection = aggregator.get_stats(Mode::Selection, &Scope::Global)?;
    let numbers = aggregator.get_number_stats(Mode::Total, &Scope::Global)?;

    Ok([
        render_stats_table("Input mode", &input),
        render_stats_table("Selection mode", &selection),
        render_number_stats(&numbers),
    ]
    .join("\n"))
}

/// Per-day charts for both entry modes
pub fn render_daily_report<S: KeyValueStore>(aggregator: &StatsAggregator<S>) -> Result<String> {
    let mut sections = Vec::new();
    for (heading, mode) in [
        ("Daily: input mode", Mode::Input),
        ("Daily: selection mode", Mode::Selection),
    ] {
        let daily = aggregator.get_daily_stats(mode)?;
        sections.push(format!(
            "{}\n{}{}",
            heading.bold(),
            render_combined_chart("Correct vs wrong answers", &daily),
            render_time_chart("Average answer time", &daily)
        ));
    }
    Ok(sections.join("\n"))
}

/// One-line scoreboard shown during a quiz
pub fn render_session(session: &SessionStats) -> String {
    format!(
        "Correct: {}  Wrong: {}  Average answer time: {}",
        session.correct.to_string().green(),
        session.incorrect.to_string().red(),
        format_seconds(session.avg_response_seconds()).blue()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_provider::ManualDateProvider;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn plain() {
        colored::control::set_override(false);
    }

    fn stats(correct: u32, incorrect: u32, avg: f64) -> Stats {
        Stats {
            correct,
            incorrect,
            avg_response_seconds: avg,
        }
    }

    #[test]
    fn test_render_table_without_selection() {
        plain();
        insta::assert_snapshot!(render_table(&TableSelection::new()), @r"
× |  1  2  3  4  5  6  7  8  9
--+---------------------------
1 |  1  2  3  4  5  6  7  8  9
2 |  2  4  6  8 10 12 14 16 18
3 |  3  6  9 12 15 18 21 24 27
4 |  4  8 12 16 20 24 28 32 36
5 |  5 10 15 20 25 30 35 40 45
6 |  6 12 18 24 30 36 42 48 54
7 |  7 14 21 28 35 42 49 56 63
8 |  8 16 24 32 40 48 56 64 72
9 |  9 18 27 36 45 54 63 72 81

Pick a row and a column to see their product
");
    }

    #[test]
    fn test_render_table_with_selection_shows_product() {
        plain();
        let mut selection = TableSelection::new();
        selection.click_cell(6, 7);

        let rendered = render_table(&selection);
        assert!(rendered.ends_with("6 × 7 = 42\n"));
    }

    #[test]
    fn test_date_label() {
        assert_eq!(date_label("2024-05-09"), "05/09");
        assert_eq!(date_label("short"), "short");
    }

    #[test]
    fn test_bar_length_scaling() {
        assert_eq!(bar_length(10.0, 10.0), CHART_WIDTH);
        assert_eq!(bar_length(5.0, 10.0), CHART_WIDTH / 2);
        assert_eq!(bar_length(0.0, 10.0), 0);
        assert_eq!(bar_length(3.0, 0.0), 0);
    }

    #[test]
    fn test_combined_chart_scales_to_largest_count() {
        plain();
        let daily = BTreeMap::from([
            ("2024-05-01".to_string(), stats(10, 5, 1.0)),
            ("2024-05-02".to_string(), stats(0, 2, 2.0)),
        ]);

        let chart = render_combined_chart("Correct vs wrong answers", &daily);
        let lines: Vec<&str> = chart.lines().collect();

        assert_eq!(lines[0], "Correct vs wrong answers");
        assert_eq!(lines[1], format!("  05/01 ✓ {} 10", BAR.repeat(30)));
        assert_eq!(lines[2], format!("        ✗ {} 5", BAR.repeat(15)));
        assert_eq!(lines[3], "  05/02 ✓  0");
        assert_eq!(lines[4], format!("        ✗ {} 2", BAR.repeat(6)));
    }

    #[test]
    fn test_time_chart() {
        plain();
        let daily = BTreeMap::from([
            ("2024-05-01".to_string(), stats(1, 0, 4.0)),
            ("2024-05-02".to_string(), stats(1, 0, 2.0)),
        ]);

        let chart = render_time_chart("Average answer time", &daily);
        assert!(chart.contains(&format!("05/01 {} 4.00 s", BAR.repeat(30))));
        assert!(chart.contains(&format!("05/02 {} 2.00 s", BAR.repeat(15))));
    }

    #[test]
    fn test_empty_charts_say_no_data() {
        let daily = BTreeMap::new();
        assert_eq!(
            render_combined_chart("Correct vs wrong answers", &daily),
            "No data yet for Correct vs wrong answers\n"
        );
        assert_eq!(
            render_time_chart("Average answer time", &daily),
            "No data yet for Average answer time\n"
        );
    }

    #[test]
    fn test_number_stats_percentages() {
        plain();
        let mut numbers = NumberStats::default();
        numbers.correct.insert(3, 1);
        numbers.incorrect.insert(3, 1);

        let rendered = render_number_stats(&numbers);
        assert!(rendered.contains("       3      50.0%"));
        assert!(rendered.contains("       9       0.0%"));
    }

    #[test]
    fn test_global_report_from_aggregator() {
        plain();
        let clock = Arc::new(ManualDateProvider::at_date(2024, 5, 1).unwrap());
        let mut aggregator = StatsAggregator::with_date_provider(MemoryStore::new(), clock);
        aggregator.record_outcome(Mode::Input, true, 2000, 3, 4).unwrap();
        aggregator.record_outcome(Mode::Input, false, 1000, 3, 4).unwrap();

        let report = render_global_report(&aggregator).unwrap();

        assert!(report.contains("Input mode\n  Correct answers:     1\n  Wrong answers:       1\n  Average answer time: 1.50 s"));
        assert!(report.contains("Selection mode\n  Correct answers:     0"));
        assert!(report.contains("       4      50.0%"));
    }

    #[test]
    fn test_daily_report_lists_days() {
        plain();
        let clock = Arc::new(ManualDateProvider::at_date(2024, 5, 1).unwrap());
        let mut aggregator =
            StatsAggregator::with_date_provider(MemoryStore::new(), clock.clone());
        aggregator.record_outcome(Mode::Selection, true, 1000, 2, 2).unwrap();

        let report = render_daily_report(&aggregator).unwrap();

        assert!(report.contains("Daily: input mode"));
        assert!(report.contains("Daily: selection mode"));
        assert!(report.contains("05/01"));
    }

    #[test]
    fn test_session_line() {
        plain();
        let session = SessionStats {
            correct: 2,
            incorrect: 1,
            total_time_ms: 4500,
            answers: 3,
        };
        assert_eq!(
            render_session(&session),
            "Correct: 2  Wrong: 1  Average answer time: 1.50 s"
        );
    }
}
