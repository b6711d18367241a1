use crate::core::db::{Recordset, Value};
use crate::core::Result;

/// Results Grid Module
///
/// Renders recordsets for the console, either as an aligned text table or
/// as pretty-printed JSON.

/// Output style for recordsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    #[default]
    Table,
    /// Pretty-printed JSON array of row objects
    Json,
}

/// Represents a single cell in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: String,
    /// Numeric cells are right-aligned.
    pub numeric: bool,
}

impl Cell {
    fn from_value(value: &Value) -> Self {
        Cell {
            content: value.to_string(),
            numeric: matches!(value, Value::Integer(_) | Value::Real(_)),
        }
    }

    fn text(content: String) -> Self {
        Cell {
            content,
            numeric: false,
        }
    }
}

/// Represents a row of cells in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridRow {
    pub cells: Vec<Cell>,
    pub row_index: usize,
}

/// Represents the entire grid structure.
#[derive(Debug, Clone, Default)]
pub struct ResultsGrid {
    pub headers: Vec<String>,
    pub rows: Vec<GridRow>,
}

impl ResultsGrid {
    /// Creates a new, empty ResultsGrid.
    pub fn new() -> Self {
        ResultsGrid::default()
    }

    /// Builds a grid holding every row of `recordset`.
    pub fn from_recordset(recordset: &Recordset) -> Self {
        let mut grid = ResultsGrid::new();
        grid.set_headers(recordset.columns().to_vec());
        for row in recordset {
            let cells = row.values().iter().map(Cell::from_value).collect();
            grid.push_cells(cells);
        }
        grid
    }

    /// Sets the headers for the grid.
    pub fn set_headers(&mut self, headers: Vec<String>) {
        self.headers = headers;
    }

    /// Adds a row of text cells.
    pub fn add_row(&mut self, row: Vec<String>) {
        self.push_cells(row.into_iter().map(Cell::text).collect());
    }

    fn push_cells(&mut self, cells: Vec<Cell>) {
        self.rows.push(GridRow {
            cells,
            row_index: self.rows.len(),
        });
    }

    fn column_widths(&self) -> Vec<usize> {
        let columns = self
            .rows
            .iter()
            .map(|r| r.cells.len())
            .chain(std::iter::once(self.headers.len()))
            .max()
            .unwrap_or(0);

        (0..columns)
            .map(|i| {
                let header = self.headers.get(i).map_or(0, |h| h.chars().count());
                self.rows
                    .iter()
                    .filter_map(|r| r.cells.get(i))
                    .map(|c| c.content.chars().count())
                    .fold(header, usize::max)
            })
            .collect()
    }

    /// Renders the grid as an aligned text table with a header rule.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let mut output = String::new();

        if !self.headers.is_empty() {
            let header: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| pad(self.headers.get(i).map_or("", String::as_str), *w, false))
                .collect();
            output.push_str(header.join(" | ").trim_end());
            output.push('\n');
            let underline: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
            output.push_str(&underline.join("-+-"));
            output.push('\n');
        }

        for row in &self.rows {
            let cells: Vec<String> = widths
                .iter()
                .enumerate()
                .map(|(i, w)| match row.cells.get(i) {
                    Some(cell) => pad(&cell.content, *w, cell.numeric),
                    None => pad("", *w, false),
                })
                .collect();
            output.push_str(cells.join(" | ").trim_end());
            output.push('\n');
        }
        output
    }
}

fn pad(content: &str, width: usize, right_align: bool) -> String {
    if right_align {
        format!("{:>width$}", content, width = width)
    } else {
        format!("{:<width$}", content, width = width)
    }
}

/// Renders a recordset in the requested format.
pub fn render_recordset(recordset: &Recordset, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Table => {
            let mut rendered = ResultsGrid::from_recordset(recordset).render();
            rendered.push_str(&format!("({} rows)\n", recordset.len()));
            Ok(rendered)
        }
        OutputFormat::Json => {
            let mut rendered = serde_json::to_string_pretty(recordset)?;
            rendered.push('\n');
            Ok(rendered)
        }
    }
}
