//! Plain-text grid tables for task listings.

use mytasks_core::Task;

/// Renders rows as a bordered grid with a `=` rule under the header.
pub fn grid(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|header| header.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = rule(&widths, '-');
    out.push_str(&row_line(&widths, headers.iter().copied()));
    out.push_str(&rule(&widths, '='));
    for row in rows {
        out.push_str(&row_line(&widths, row.iter().map(String::as_str)));
        out.push_str(&rule(&widths, '-'));
    }
    out
}

fn rule(widths: &[usize], fill: char) -> String {
    let mut line = String::from("+");
    for width in widths {
        line.extend(std::iter::repeat(fill).take(width + 2));
        line.push('+');
    }
    line.push('\n');
    line
}

fn row_line<'a>(widths: &[usize], values: impl Iterator<Item = &'a str>) -> String {
    let mut line = String::from("|");
    for (width, value) in widths.iter().zip(values) {
        let pad = width.saturating_sub(value.chars().count());
        line.push(' ');
        line.push_str(value);
        line.extend(std::iter::repeat(' ').take(pad + 1));
        line.push('|');
    }
    line.push('\n');
    line
}

/// Title, due date and category columns.
pub fn task_table(tasks: &[Task]) -> String {
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| {
            vec![
                task.title.clone(),
                task.due_date_text(),
                task.category.clone(),
            ]
        })
        .collect();
    grid(&["Title", "Due Date", "Category"], &rows)
}

/// Title and due date columns, used for search hits.
pub fn search_table(tasks: &[Task]) -> String {
    let rows: Vec<Vec<String>> = tasks
        .iter()
        .map(|task| vec![task.title.clone(), task.due_date_text()])
        .collect();
    grid(&["Title", "Due Date"], &rows)
}

#[cfg(test)]
mod tests {
    use super::grid;

    #[test]
    fn grid_pads_columns_to_widest_cell() {
        let table = grid(
            &["Title", "Due Date"],
            &[vec!["Pay rent".to_string(), "2024-03-01".to_string()]],
        );
        let expected = "\
+----------+------------+
| Title    | Due Date   |
+==========+============+
| Pay rent | 2024-03-01 |
+----------+------------+
";
        assert_eq!(table, expected);
    }

    #[test]
    fn empty_grid_still_has_header() {
        let table = grid(&["Title"], &[]);
        assert_eq!(table, "+-------+\n| Title |\n+=======+\n");
    }
}
