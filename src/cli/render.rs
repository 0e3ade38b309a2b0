use chrono::Datelike;
use lifelog::analyzer::series::{ChartPoint, DayMark};
use lifelog::records::cleaning::{CleaningMap, Room};
use lifelog::records::todo::TodoList;
use lifelog::session::{DayView, EditMode};

const BAR_WIDTH: usize = 40;

pub fn render_day_view(view: &DayView) -> String {
    let log = &view.log;
    let field = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|value| !value.is_empty())
            .unwrap_or("-")
            .to_string()
    };

    let memo = match (view.memo_mode, log.has_memo()) {
        (EditMode::Committed, true) => log.memo_text().to_string(),
        (EditMode::Editing, true) => format!("(editing) {}", log.memo_text()),
        (_, false) => "(none)".to_string(),
    };
    let photo = view
        .photo
        .as_ref()
        .map(|bytes| format!("{} bytes", bytes.len()))
        .unwrap_or_else(|| "(none)".to_string());

    format!(
        "# {}\n\n## Log\n- Wake: {}\n- Sleep: {}\n- Steps: {} ({:.0}% of goal)\n- Study: {} min ({:.0}% of goal)\n- Weight: {}\n- Memo: {}\n- Photo: {}\n\n## To-do ({:.0}% of goal)\n{}\n\n## Cleaning {}\n{}\n",
        view.key,
        field(&log.wake_time),
        field(&log.sleep_time),
        field(&log.steps),
        view.progress.steps,
        field(&log.study_minutes),
        view.progress.study,
        field(&log.weight),
        memo,
        photo,
        view.progress.todos,
        render_todos(&view.todos),
        view.cleaning_status.symbol(),
        render_cleaning(&view.cleaning),
    )
}

pub fn render_todos(todos: &TodoList) -> String {
    if todos.is_empty() {
        return "- No tasks".to_string();
    }

    todos
        .items()
        .iter()
        .map(|item| {
            let mark = if item.done { "x" } else { " " };
            format!("- [{mark}] {} (id {})", item.text, item.id)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_cleaning(cleaning: &CleaningMap) -> String {
    Room::ALL
        .iter()
        .map(|room| {
            let mark = if cleaning.is_cleaned(*room) { "x" } else { " " };
            format!("- [{mark}] {} ({})", room.label(), room.id())
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_chart(points: &[ChartPoint]) -> String {
    if points.is_empty() {
        return "- No data".to_string();
    }

    let max = points
        .iter()
        .map(|point| point.value)
        .fold(0.0_f64, f64::max);

    points
        .iter()
        .map(|point| {
            let width = if max > 0.0 {
                (point.value / max * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            format!(
                "{:>6} | {:<bar_width$} {}",
                point.label,
                "#".repeat(width),
                point.value,
                bar_width = BAR_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_calendar(marks: &[DayMark]) -> String {
    let Some(first) = marks.first().and_then(|mark| mark.key.date()) else {
        return "- No days".to_string();
    };

    let weekdays = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        .map(|day| format!("{day:<12}"))
        .join("");
    let header = format!("{}\n{}", first.format("%B %Y"), weekdays.trim_end());
    let leading = first.weekday().num_days_from_monday() as usize;

    let cells = std::iter::repeat_n(String::new(), leading)
        .chain(marks.iter().map(|mark| {
            format!(
                "{:>2} {:<5} {}",
                mark.day,
                mark.wake_label.as_deref().unwrap_or(""),
                mark.cleaning.symbol()
            )
        }))
        .collect::<Vec<_>>();

    let rows = cells
        .chunks(7)
        .map(|week| {
            week.iter()
                .map(|cell| format!("{cell:<12}"))
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!("{header}\n{rows}")
}
