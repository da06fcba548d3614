/// Render a simple aligned table: padded header row, dash divider, padded
/// cells. Missing cells render as `-`.
#[must_use]
pub fn render(headers: &[&str], rows: &[Vec<String>]) -> String {
    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(String::len)
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{header:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string();

    let divider = "-".repeat(header_line.len());

    let mut lines = vec![header_line, divider];
    for row in rows {
        let line = widths
            .iter()
            .enumerate()
            .map(|(index, width)| {
                let cell = row.get(index).map_or("-", String::as_str);
                format!("{cell:<width$}")
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string();
        lines.push(line);
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::render;

    #[test]
    fn columns_align_to_widest_cell() {
        let table = render(
            &["id", "title"],
            &[
                vec!["evt-1".to_string(), "short".to_string()],
                vec!["evt-200".to_string(), "a much longer title".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("id"));
        assert!(lines[1].chars().all(|c| c == '-'));
        assert_eq!(lines[2].find("short"), lines[3].find("a much"));
    }

    #[test]
    fn short_rows_pad_with_dash() {
        let table = render(&["a", "b"], &[vec!["x".to_string()]]);
        assert!(table.lines().last().is_some_and(|line| line.contains('-')));
    }
}
