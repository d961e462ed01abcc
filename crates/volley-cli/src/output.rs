use serde::Serialize;

/// Machine-readable output for the `--json` flag.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Column-aligned plain-text table for the status and history views.
/// Column widths follow the widest cell, headers are underlined with
/// dashes, columns are two spaces apart.
pub struct Table {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &'static [&'static str]) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.headers.len());
        self.rows.push(cells);
    }

    pub fn print(&self) {
        print!("{}", self.render());
    }

    fn render(&self) -> String {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.len()).collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let headers: Vec<String> = self.headers.iter().map(|h| h.to_string()).collect();
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();

        let mut out = String::new();
        out.push_str(&format_row(&widths, &headers));
        out.push_str(&format_row(&widths, &rule));
        for row in &self.rows {
            out.push_str(&format_row(&widths, row));
        }
        out
    }
}

/// Pad every cell to its column width; trailing padding on the last
/// column is trimmed so history rows with an empty CRASHED cell do not
/// end in spaces.
fn format_row(widths: &[usize], cells: &[String]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect();
    let mut line = padded.join("  ").trim_end().to_string();
    line.push('\n');
    line
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn columns_align_to_the_widest_cell() {
        let mut table = Table::new(&["LAUNCHER", "MISSILES"]);
        table.row(vec!["#0".into(), "3".into()]);
        table.row(vec!["#1".into(), "12".into()]);
        assert_eq!(
            table.render(),
            "LAUNCHER  MISSILES\n\
             --------  --------\n\
             #0        3\n\
             #1        12\n"
        );
    }

    #[test]
    fn long_cells_stretch_their_column() {
        let mut table = Table::new(&["SOURCE", "DATE"]);
        table.row(vec!["10.13.37.2".into(), "2013-10-20 16:00:00".into()]);
        let rendered = table.render();
        assert!(rendered.starts_with("SOURCE      DATE"));
        assert!(rendered.contains("10.13.37.2  2013-10-20 16:00:00"));
    }

    #[test]
    fn empty_table_still_prints_headers() {
        let table = Table::new(&["MODULE", "STATE"]);
        assert_eq!(table.render(), "MODULE  STATE\n------  -----\n");
    }
}
