//! Console helpers shared by the commands

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Create spinner progress style
pub(super) fn create_spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
        .template("{spinner:.green} {msg}")
        .expect("valid template")
}

/// Create bar progress style
pub(super) fn create_bar_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

pub(super) fn spinner(message: impl Into<String>) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(create_spinner_style());
    pb.set_message(message.into());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

pub(super) fn bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(create_bar_style());
    pb
}

pub(super) fn print_header(title: &str) {
    println!("\n{}\n", style(title).bold());
}

/// Left-aligned text table; cells wider than the header widen the column.
pub(super) fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(c, w)| format!("{:<width$}", c, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(header)];
    out.extend(rows.iter().map(|r| line(r.as_slice())));
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_table_aligns_columns() {
        let header = vec!["repo".to_string(), "total_classes".to_string()];
        let rows = vec![
            vec!["google/guava".to_string(), "3100".to_string()],
            vec!["a/b".to_string(), "".to_string()],
        ];
        let table = render_table(&header, &rows);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines[0], "repo          total_classes");
        assert_eq!(lines[1], "google/guava  3100");
        assert_eq!(lines[2], "a/b");
    }
}
