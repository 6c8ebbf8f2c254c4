use crate::journal::{format_long_date, Journal};
use chrono::{DateTime, NaiveDate, Utc};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No journal entries found to download.")]
    Empty,

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}

const STYLE: &str = r#"
* { margin: 0; padding: 0; box-sizing: border-box; }
body { font-family: 'Kalam', 'Comic Sans MS', cursive; background: #f8f4f0; color: #2c3e50; line-height: 1.6; }
.container { max-width: 800px; margin: 0 auto; padding: 20px; }
.header { text-align: center; margin-bottom: 40px; padding: 30px; background: white; border-radius: 12px; }
.header h1 { font-size: 32px; margin-bottom: 10px; }
.subtitle { font-size: 18px; color: #666; margin-bottom: 20px; }
.generated { font-size: 14px; color: #888; }
.stats { font-size: 16px; color: #555; margin-top: 15px; }
.entry { background: white; margin-bottom: 40px; border-radius: 12px; padding: 40px; page-break-inside: avoid; border-left: 2px solid rgba(255, 107, 107, 0.3); }
.date-header { display: flex; gap: 12px; margin-bottom: 30px; }
.date-text { font-size: 18px; font-weight: 600; }
.time-text { font-size: 14px; color: #888; margin-left: auto; }
.meta { font-size: 12px; background: #f8f9fa; padding: 12px 16px; border-radius: 8px; border: 1px solid #e9ecef; width: fit-content; margin-bottom: 20px; }
.entry-title { font-size: 22px; font-weight: 600; margin-bottom: 20px; }
.entry-content { font-size: 16px; line-height: 32px; margin-bottom: 30px; white-space: pre-wrap; }
.entry-image { max-width: 100%; margin-bottom: 20px; border-radius: 8px; }
.entry-stats { display: flex; justify-content: space-between; font-size: 12px; color: #999; font-style: italic; padding-top: 10px; border-top: 1px solid #f0f0f0; }
@media print {
  body { background: white; }
  .entry, .header { border: 1px solid #ddd; margin-bottom: 20px; }
}
"#;

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Entries are ordered by their diary day, then by when they were written.
fn sort_key(journal: &Journal) -> Option<DateTime<Utc>> {
    journal
        .date()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .or(journal.created_at)
}

pub fn sort_newest_first(journals: &mut [Journal]) {
    journals.sort_by(|a, b| {
        sort_key(b)
            .cmp(&sort_key(a))
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
}

pub fn render_html(user_name: &str, journals: &[Journal], generated: NaiveDate) -> String {
    let name = escape(user_name);
    let total_chars: usize = journals.iter().map(|j| j.content.chars().count()).sum();
    let total_words: usize = journals.iter().map(|j| word_count(&j.content)).sum();

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{name}'s Journal Entries</title>\n<style>{STYLE}</style>\n</head>\n\
         <body onload=\"window.print()\">\n<div class=\"container\">\n\
         <div class=\"header\">\n<h1>📖 My Journal Entries</h1>\n\
         <p class=\"subtitle\">By {name}</p>\n\
         <p class=\"generated\">Generated on {}</p>\n\
         <div class=\"stats\"><strong>{}</strong> entries • <strong>{total_chars}</strong> characters • <strong>{total_words}</strong> words</div>\n\
         </div>\n",
        format_long_date(generated),
        journals.len(),
    );

    for journal in journals {
        let date = journal
            .date()
            .map(format_long_date)
            .unwrap_or_else(|| "Undated".to_string());
        let time = journal
            .created_at
            .map(|t| t.format("%-I:%M %p").to_string())
            .unwrap_or_default();
        let title = if journal.title.trim().is_empty() {
            "Untitled Entry".to_string()
        } else {
            escape(&journal.title)
        };
        let content = if journal.content.is_empty() {
            "No content available.".to_string()
        } else {
            escape(&journal.content)
        };
        let anonymous = if journal.is_anonymous {
            " • 👤 Anonymous"
        } else {
            ""
        };

        let _ = write!(
            html,
            "<div class=\"entry\">\n\
             <div class=\"date-header\"><span class=\"date-text\">{date}</span><span class=\"time-text\">{time}</span></div>\n\
             <div class=\"meta\">{} {}{anonymous}</div>\n\
             <h2 class=\"entry-title\">{title}</h2>\n",
            journal.visibility.icon(),
            escape(journal.visibility.label()),
        );
        for image in &journal.images {
            let _ = writeln!(
                html,
                "<img class=\"entry-image\" src=\"{}\" alt=\"\">",
                escape(image)
            );
        }
        let _ = write!(
            html,
            "<div class=\"entry-content\">{content}</div>\n\
             <div class=\"entry-stats\"><span>{} characters • {} words</span><span>❤️ {} • 👁️ {}</span></div>\n\
             </div>\n",
            journal.content.chars().count(),
            word_count(&journal.content),
            journal.likes,
            journal.reads,
        );
    }

    html.push_str("</div>\n</body>\n</html>\n");
    html
}

/// `Ada Lovelace` becomes `ada-lovelace`.
pub fn slug(name: &str) -> String {
    let parts: Vec<String> = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|p| !p.is_empty())
        .map(str::to_lowercase)
        .collect();
    if parts.is_empty() {
        "my".to_string()
    } else {
        parts.join("-")
    }
}

/// Writes `<slug>-journal.html` into `dir` and returns its path.
pub fn write_export(
    dir: &Path,
    user_name: &str,
    mut journals: Vec<Journal>,
    generated: NaiveDate,
) -> Result<PathBuf, ExportError> {
    if journals.is_empty() {
        return Err(ExportError::Empty);
    }
    sort_newest_first(&mut journals);
    let html = render_html(user_name, &journals, generated);

    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}-journal.html", slug(user_name)));
    std::fs::write(&path, html)?;
    info!("Exported {} journals to {}", journals.len(), path.display());
    Ok(path)
}
