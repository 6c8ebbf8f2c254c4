use crate::journal::Journal;
use chrono::{Datelike, Duration, NaiveDate};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use std::collections::HashSet;

/// A month shown by the calendar, independent of the selected day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
}

impl MonthView {
    pub fn containing(date: NaiveDate) -> Self {
        MonthView {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn days_in_month(&self) -> u32 {
        let next = self.next().first_day();
        (next - self.first_day()).num_days() as u32
    }

    /// Empty cells before the 1st; weeks start on Sunday.
    pub fn leading_blanks(&self) -> u32 {
        self.first_day().weekday().num_days_from_sunday()
    }

    pub fn prev(&self) -> MonthView {
        if self.month == 1 {
            MonthView {
                year: self.year - 1,
                month: 12,
            }
        } else {
            MonthView {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    pub fn next(&self) -> MonthView {
        if self.month == 12 {
            MonthView {
                year: self.year + 1,
                month: 1,
            }
        } else {
            MonthView {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn title(&self) -> String {
        self.first_day().format("%B %Y").to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub is_today: bool,
    pub is_selected: bool,
    pub is_cursor: bool,
    pub is_future: bool,
    pub has_journal: bool,
}

pub fn journal_dates(journals: &[Journal]) -> HashSet<NaiveDate> {
    journals.iter().filter_map(Journal::date).collect()
}

/// Cells of the month grid, `None` for the blanks before the 1st.
pub fn grid(
    view: MonthView,
    selected: NaiveDate,
    cursor: NaiveDate,
    today: NaiveDate,
    dates: &HashSet<NaiveDate>,
) -> Vec<Option<CalendarDay>> {
    let first = view.first_day();
    let blanks = (0..view.leading_blanks()).map(|_| None);
    let days = (0..view.days_in_month()).map(|offset| {
        let date = first + Duration::days(i64::from(offset));
        Some(CalendarDay {
            date,
            is_today: date == today,
            is_selected: date == selected,
            is_cursor: date == cursor,
            is_future: date > today,
            has_journal: dates.contains(&date),
        })
    });
    blanks.chain(days).collect()
}

/// The month grid widget.
pub struct CalendarWidget<'a> {
    pub view: MonthView,
    pub cells: &'a [Option<CalendarDay>],
    pub loading: bool,
}

impl CalendarWidget<'_> {
    fn day_style(day: &CalendarDay) -> Style {
        let mut style = Style::default();
        if day.has_journal {
            style = style.fg(Color::Green).add_modifier(Modifier::BOLD);
        }
        if day.is_future {
            style = style.fg(Color::DarkGray);
        }
        if day.is_today {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        if day.is_selected {
            style = style.bg(Color::Magenta).fg(Color::White);
        }
        if day.is_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        style
    }
}

impl Widget for CalendarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut lines = vec![
            Line::from(Span::styled(
                format!("← {} →", self.view.title()),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            Line::from(" Su Mo Tu We Th Fr Sa"),
        ];

        for week in self.cells.chunks(7) {
            let mut spans = Vec::with_capacity(week.len());
            for cell in week {
                match cell {
                    None => spans.push(Span::raw("   ")),
                    Some(day) => {
                        let marker = if day.has_journal { "•" } else { " " };
                        spans.push(Span::raw(marker));
                        spans.push(Span::styled(
                            format!("{:>2}", day.date.day()),
                            Self::day_style(day),
                        ));
                    }
                }
            }
            lines.push(Line::from(spans));
        }

        if self.loading {
            lines.push(Line::from(Span::styled(
                "loading entries…",
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Calendar"))
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_shape() {
        let may = MonthView::containing(ymd(2024, 5, 17));
        assert_eq!(may.days_in_month(), 31);
        // 1 May 2024 was a Wednesday
        assert_eq!(may.leading_blanks(), 3);
        assert_eq!(may.title(), "May 2024");

        let feb = MonthView { year: 2024, month: 2 };
        assert_eq!(feb.days_in_month(), 29);
        assert_eq!(MonthView { year: 2023, month: 2 }.days_in_month(), 28);
    }

    #[test]
    fn test_month_navigation_wraps_years() {
        let jan = MonthView { year: 2024, month: 1 };
        assert_eq!(jan.prev(), MonthView { year: 2023, month: 12 });
        assert_eq!(jan.prev().next(), jan);
        assert_eq!(
            MonthView { year: 2024, month: 12 }.next(),
            MonthView { year: 2025, month: 1 }
        );
    }

    #[test]
    fn test_grid_flags() {
        let today = ymd(2024, 5, 10);
        let dates: HashSet<NaiveDate> = [ymd(2024, 5, 2), ymd(2024, 4, 30)].into_iter().collect();
        let cells = grid(
            MonthView::containing(today),
            ymd(2024, 5, 2),
            ymd(2024, 5, 3),
            today,
            &dates,
        );

        assert_eq!(cells.len(), 3 + 31);
        assert!(cells[..3].iter().all(Option::is_none));

        let second = cells[3 + 1].unwrap();
        assert!(second.has_journal && second.is_selected && !second.is_future);
        assert!(cells[3 + 2].unwrap().is_cursor);
        assert!(cells[3 + 9].unwrap().is_today);
        assert!(cells[3 + 10].unwrap().is_future);
        assert_eq!(cells.iter().flatten().filter(|d| d.has_journal).count(), 1);
    }

    #[test]
    fn test_journal_dates_from_month_response() {
        let journals: Vec<Journal> = serde_json::from_str(
            r#"[{"_id":"a","journaldate":"2024-05-02T00:00:00.000Z"},
                {"_id":"b","journaldate":"2024-05-09"},
                {"_id":"c"}]"#,
        )
        .unwrap();
        let dates = journal_dates(&journals);
        assert_eq!(dates.len(), 2);
        assert!(dates.contains(&ymd(2024, 5, 9)));
    }

    #[test]
    fn test_widget_renders_month() {
        let today = ymd(2024, 5, 10);
        let cells = grid(MonthView::containing(today), today, today, today, &HashSet::new());
        let backend = TestBackend::new(24, 11);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|f| {
                f.render_widget(
                    CalendarWidget {
                        view: MonthView::containing(today),
                        cells: &cells,
                        loading: false,
                    },
                    f.area(),
                )
            })
            .unwrap();

        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content.iter().map(|c| c.symbol()).collect();
        assert!(text.contains("May 2024"));
        assert!(text.contains("Su Mo Tu We Th Fr Sa"));
        assert!(text.contains("31"));
    }
}
