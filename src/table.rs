use crate::keys::OPERANDS;

pub fn product(row: u32, col: u32) -> u32 {
    row * col
}

/// The 9×9 grid, row by row
pub fn rows() -> Vec<Vec<u32>> {
    OPERANDS
        .map(|row| OPERANDS.map(|col| product(row, col)).collect())
        .collect()
}

/// How a cell should be drawn for the current selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellHighlight {
    /// The selected row and column meet here
    Intersection,
    /// In the selected row or column
    Highlighted,
    /// Outside an active selection
    Dimmed,
    /// No selection active
    Normal,
}

/// Row/column highlight on the table, driven by header and cell clicks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableSelection {
    pub row: Option<u32>,
    pub col: Option<u32>,
}

impl TableSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.row.is_some() || self.col.is_some()
    }

    /// Corner cell: clear everything
    pub fn click_corner(&mut self) {
        self.row = None;
        self.col = None;
    }

    /// Selecting a new column keeps the row. Clicking the selected column
    /// again collapses a cell selection to the column, or turns it off.
    pub fn click_col_header(&mut self, col: u32) {
        if self.col == Some(col) {
            if self.row.is_some() {
                self.row = None;
            } else {
                self.col = None;
            }
        } else {
            self.col = Some(col);
        }
    }

    pub fn click_row_header(&mut self, row: u32) {
        if self.row == Some(row) {
            if self.col.is_some() {
                self.col = None;
            } else {
                self.row = None;
            }
        } else {
            self.row = Some(row);
        }
    }

    /// Selects the cell, or clears the selection if it was that cell
    pub fn click_cell(&mut self, row: u32, col: u32) {
        if self.row == Some(row) && self.col == Some(col) {
            self.click_corner();
        } else {
            self.row = Some(row);
            self.col = Some(col);
        }
    }

    pub fn cell_highlight(&self, row: u32, col: u32) -> CellHighlight {
        let in_row = self.row == Some(row);
        let in_col = self.col == Some(col);
        if in_row && in_col {
            CellHighlight::Intersection
        } else if in_row || in_col {
            CellHighlight::Highlighted
        } else if self.is_active() {
            CellHighlight::Dimmed
        } else {
            CellHighlight::Normal
        }
    }

    /// `(row, col, row × col)` once both a row and a column are chosen
    pub fn selected_product(&self) -> Option<(u32, u32, u32)> {
        match (self.row, self.col) {
            (Some(row), Some(col)) => Some((row, col, product(row, col))),
            _ => None,
        }
    }
}
