//! Cell address and range types

use crate::error::{Error, Result};
use crate::{MAX_COLS, MAX_ROWS};
use std::fmt;
use std::str::FromStr;

/// A cell address (e.g., "A1")
///
/// Addresses are zero-based internally and ordered row-major: every cell of
/// row 0 sorts before any cell of row 1, and within a row columns ascend.
/// That ordering is what reference lists are sorted and deduplicated by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellAddress {
    /// Row index (0-based internally, 1-based in display)
    pub row: u32,
    /// Column index (0-based, A=0, B=1, ...)
    pub col: u16,
}

impl CellAddress {
    /// Create a new cell address
    pub fn new(row: u32, col: u16) -> Self {
        Self { row, col }
    }

    /// Whether the address lies inside the largest possible sheet
    pub fn is_valid(&self) -> bool {
        self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Parse a cell address from A1-style notation
    ///
    /// `$` absolute markers are accepted and ignored.
    ///
    /// # Examples
    /// ```
    /// use tallysheet_core::CellAddress;
    ///
    /// let addr = CellAddress::parse("A1").unwrap();
    /// assert_eq!(addr.row, 0);
    /// assert_eq!(addr.col, 0);
    ///
    /// let addr = CellAddress::parse("$B$2").unwrap();
    /// assert_eq!(addr.row, 1);
    /// assert_eq!(addr.col, 1);
    /// ```
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(Error::InvalidAddress("empty address".into()));
        }

        let bytes = s.as_bytes();
        let mut pos = 0;

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let col_start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_alphabetic() {
            pos += 1;
        }
        if pos == col_start {
            return Err(Error::InvalidAddress(format!(
                "no column letters in '{}'",
                s
            )));
        }
        let col_str = &s[col_start..pos];

        if bytes.get(pos) == Some(&b'$') {
            pos += 1;
        }

        let row_str = &s[pos..];
        if row_str.is_empty() || !row_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::InvalidAddress(format!(
                "invalid row number in '{}'",
                s
            )));
        }

        let out_of_bounds = || Error::OutOfBounds {
            address: s.to_string(),
            max_rows: MAX_ROWS,
            max_cols: MAX_COLS,
        };

        // Rows are 1-based in A1 notation
        let row: u64 = row_str.parse().map_err(|_| out_of_bounds())?;
        if row == 0 {
            return Err(Error::InvalidAddress(format!(
                "row number must be >= 1 in '{}'",
                s
            )));
        }
        let row = row - 1;
        let col = Self::letters_to_index(col_str);

        if row >= MAX_ROWS as u64 || col >= MAX_COLS as u64 {
            return Err(out_of_bounds());
        }

        Ok(Self::new(row as u32, col as u16))
    }

    /// Convert column index to letters (0 = A, 25 = Z, 26 = AA, etc.)
    pub fn column_to_letters(col: u16) -> String {
        let mut result = String::new();
        let mut n = col as u32 + 1;

        while n > 0 {
            n -= 1;
            let c = ((n % 26) as u8 + b'A') as char;
            result.insert(0, c);
            n /= 26;
        }

        result
    }

    // Saturates instead of overflowing so absurdly long column names still
    // classify as out of bounds.
    fn letters_to_index(letters: &str) -> u64 {
        letters
            .bytes()
            .fold(0u64, |acc, c| {
                acc.saturating_mul(26)
                    .saturating_add((c.to_ascii_uppercase() - b'A') as u64 + 1)
            })
            .saturating_sub(1)
    }

    /// Format as A1-style string
    pub fn to_a1_string(&self) -> String {
        format!("{}{}", Self::column_to_letters(self.col), self.row + 1)
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1_string())
    }
}

impl FromStr for CellAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// A range of cells (e.g., "A1:B10")
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellRange {
    /// Start address (top-left)
    pub start: CellAddress,
    /// End address (bottom-right)
    pub end: CellAddress,
}

impl CellRange {
    /// Create a new cell range
    pub fn new(start: CellAddress, end: CellAddress) -> Self {
        // Normalize so start is top-left and end is bottom-right
        Self {
            start: CellAddress::new(start.row.min(end.row), start.col.min(end.col)),
            end: CellAddress::new(start.row.max(end.row), start.col.max(end.col)),
        }
    }

    /// Get the number of rows in the range
    pub fn row_count(&self) -> u32 {
        self.end.row - self.start.row + 1
    }

    /// Get the number of columns in the range
    pub fn col_count(&self) -> u16 {
        self.end.col - self.start.col + 1
    }

    /// Get the total number of cells in the range
    pub fn cell_count(&self) -> u64 {
        self.row_count() as u64 * self.col_count() as u64
    }

    /// Iterate every address in the range, row-major
    pub fn cells(&self) -> impl Iterator<Item = CellAddress> + '_ {
        (self.start.row..=self.end.row).flat_map(move |row| {
            (self.start.col..=self.end.col).map(move |col| CellAddress::new(row, col))
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start, self.end)
    }
}

/// Dimensions of a rectangular area anchored at A1
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    pub rows: u32,
    pub cols: u16,
}

impl Size {
    pub fn new(rows: u32, cols: u16) -> Self {
        Self { rows, cols }
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_address() {
        let addr = CellAddress::parse("A1").unwrap();
        assert_eq!(addr, CellAddress::new(0, 0));

        let addr = CellAddress::parse("Z26").unwrap();
        assert_eq!(addr, CellAddress::new(25, 25));

        let addr = CellAddress::parse("aa10").unwrap();
        assert_eq!(addr, CellAddress::new(9, 26));

        let addr = CellAddress::parse("$C$3").unwrap();
        assert_eq!(addr, CellAddress::new(2, 2));
    }

    #[test]
    fn test_parse_invalid_address() {
        assert!(matches!(
            CellAddress::parse(""),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            CellAddress::parse("123"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            CellAddress::parse("ABC"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            CellAddress::parse("A0"),
            Err(Error::InvalidAddress(_))
        ));
        assert!(matches!(
            CellAddress::parse("A 1"),
            Err(Error::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_parse_out_of_bounds() {
        assert!(matches!(
            CellAddress::parse("A16385"),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            CellAddress::parse("ZZZZ1"),
            Err(Error::OutOfBounds { .. })
        ));
        assert!(matches!(
            CellAddress::parse("A99999999999999999999999"),
            Err(Error::OutOfBounds { .. })
        ));
        // Last valid cell
        let last = CellAddress::parse("XFD16384").unwrap();
        assert_eq!(last, CellAddress::new(16_383, 16_383));
        assert!(last.is_valid());
    }

    #[test]
    fn test_column_letters() {
        assert_eq!(CellAddress::column_to_letters(0), "A");
        assert_eq!(CellAddress::column_to_letters(25), "Z");
        assert_eq!(CellAddress::column_to_letters(26), "AA");
        assert_eq!(CellAddress::column_to_letters(701), "ZZ");
        assert_eq!(CellAddress::column_to_letters(702), "AAA");
    }

    #[test]
    fn test_display_round_trip() {
        for text in ["A1", "B7", "AB100", "XFD16384"] {
            assert_eq!(CellAddress::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn test_row_major_ordering() {
        let mut cells = vec![
            CellAddress::parse("B2").unwrap(),
            CellAddress::parse("C1").unwrap(),
            CellAddress::parse("A2").unwrap(),
            CellAddress::parse("A1").unwrap(),
        ];
        cells.sort();
        let names: Vec<String> = cells.iter().map(|c| c.to_string()).collect();
        assert_eq!(names, vec!["A1", "C1", "A2", "B2"]);
    }

    #[test]
    fn test_range_normalization_and_iteration() {
        let range = CellRange::new(CellAddress::new(1, 1), CellAddress::new(0, 0));
        assert_eq!(range.start, CellAddress::new(0, 0));
        assert_eq!(range.end, CellAddress::new(1, 1));
        assert_eq!(range.cell_count(), 4);

        let cells: Vec<String> = range.cells().map(|c| c.to_string()).collect();
        assert_eq!(cells, vec!["A1", "B1", "A2", "B2"]);
        assert_eq!(range.to_string(), "A1:B2");
    }
}
