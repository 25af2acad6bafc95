use serde::Serialize;

use crate::cli::OutputFormat;

/// Print a response: pretty JSON, or the plain-text rendering for tables.
pub fn output<T: Serialize>(value: &T, text: &str, format: OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Table => println!("{text}"),
    }
    Ok(())
}

/// Left-aligned columns padded to the widest cell.
#[must_use]
pub fn render_rows(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.to_vec())];
    out.extend(
        rows.iter()
            .map(|row| line(row.iter().map(String::as_str).collect())),
    );
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn columns_align_to_widest_cell() {
        let rendered = render_rows(
            &["id", "name"],
            &[
                vec!["t1".into(), "Club".into()],
                vec!["tenant-22".into(), "Academy".into()],
            ],
        );
        assert_eq!(
            rendered,
            "id         name\nt1         Club\ntenant-22  Academy"
        );
    }

    #[test]
    fn empty_table_is_header_only() {
        assert_eq!(render_rows(&["id"], &[]), "id");
    }
}
