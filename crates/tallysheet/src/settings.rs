//! Sheet configuration

use tallysheet_core::{CellAddress, Error, Result, MAX_COLS, MAX_ROWS};
use tallysheet_formula::ParseOptions;

/// Limits a [`Sheet`](crate::Sheet) enforces on edits and reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SheetSettings {
    /// Number of rows (1 to [`MAX_ROWS`])
    pub max_rows: u32,
    /// Number of columns (1 to [`MAX_COLS`])
    pub max_cols: u16,
    /// Largest range a formula may reference
    pub max_range_cells: u64,
}

impl Default for SheetSettings {
    fn default() -> Self {
        Self {
            max_rows: MAX_ROWS,
            max_cols: MAX_COLS,
            max_range_cells: ParseOptions::default().max_range_cells,
        }
    }
}

impl SheetSettings {
    /// Settings for a sheet of the given dimensions
    pub fn new(max_rows: u32, max_cols: u16) -> Self {
        Self {
            max_rows,
            max_cols,
            ..Self::default()
        }
        .clamped()
    }

    /// Set the range size limit
    pub fn with_max_range_cells(mut self, max_range_cells: u64) -> Self {
        self.max_range_cells = max_range_cells.max(1);
        self
    }

    /// Bring every limit within the global ceilings
    pub fn clamped(self) -> Self {
        Self {
            max_rows: self.max_rows.clamp(1, MAX_ROWS),
            max_cols: self.max_cols.clamp(1, MAX_COLS),
            max_range_cells: self.max_range_cells.max(1),
        }
    }

    /// Whether the address lies inside the sheet
    pub fn contains(&self, addr: CellAddress) -> bool {
        addr.row < self.max_rows && addr.col < self.max_cols
    }

    /// Reject addresses outside the sheet
    pub fn check(&self, addr: CellAddress) -> Result<()> {
        if self.contains(addr) {
            Ok(())
        } else {
            Err(Error::OutOfBounds {
                address: addr.to_string(),
                max_rows: self.max_rows,
                max_cols: self.max_cols,
            })
        }
    }

    pub(crate) fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            max_range_cells: self.max_range_cells,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_covers_whole_grid() {
        let settings = SheetSettings::default();
        assert!(settings.contains(CellAddress::new(MAX_ROWS - 1, MAX_COLS - 1)));
        assert_eq!(settings.max_range_cells, 65_536);
    }

    #[test]
    fn test_clamped() {
        let settings = SheetSettings::new(u32::MAX, 0);
        assert_eq!(settings.max_rows, MAX_ROWS);
        assert_eq!(settings.max_cols, 1);

        let settings = SheetSettings::default().with_max_range_cells(0);
        assert_eq!(settings.max_range_cells, 1);
    }

    #[test]
    fn test_check() {
        let settings = SheetSettings::new(10, 3);
        assert!(settings.check(CellAddress::new(9, 2)).is_ok());
        assert_eq!(
            settings.check(CellAddress::new(0, 3)),
            Err(Error::OutOfBounds {
                address: "D1".into(),
                max_rows: 10,
                max_cols: 3,
            })
        );
    }
}
