//! A1-style cell coordinates

use crate::error::HookError;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Cell reference (e.g., A1, B2), stored 0-based
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellReference {
    pub row: u32,
    pub col: u32,
}

impl CellReference {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Convert to Excel-style reference (e.g., "A1")
    pub fn to_excel_ref(&self) -> String {
        format!("{}{}", Self::col_to_letter(self.col), self.row + 1)
    }

    /// Convert column number to letter (0 -> A, 1 -> B, etc.)
    fn col_to_letter(mut col: u32) -> String {
        let mut result = String::new();
        loop {
            result.insert(0, (b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        result
    }

    /// Every cell of a reference list such as `A1:C2 E5`, each range row-major.
    ///
    /// Parts that are not A1 references are skipped.
    pub fn cells_in_range(range: &str) -> Vec<Self> {
        let mut cells = Vec::new();
        for part in range.split_whitespace() {
            let (first, last) = part.split_once(':').unwrap_or((part, part));
            let (Ok(first), Ok(last)) = (first.parse::<Self>(), last.parse::<Self>()) else {
                continue;
            };
            for row in first.row.min(last.row)..=first.row.max(last.row) {
                for col in first.col.min(last.col)..=first.col.max(last.col) {
                    cells.push(Self::new(row, col));
                }
            }
        }
        cells
    }
}

impl FromStr for CellReference {
    type Err = HookError;

    /// Parse `A1`, `$A$1` or `aa10` into a 0-based reference
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || HookError::InvalidCellReference(s.to_string());
        let cleaned: String = s.chars().filter(|c| *c != '$').collect();
        let split = cleaned
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = cleaned.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut col = 0u32;
        for ch in letters.chars() {
            col = col
                .checked_mul(26)
                .and_then(|c| c.checked_add(ch.to_ascii_uppercase() as u32 - 'A' as u32 + 1))
                .ok_or_else(invalid)?;
        }

        let row = digits.parse::<u32>().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(Self::new(row - 1, col - 1))
    }
}

impl PartialOrd for CellReference {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellReference {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then_with(|| self.col.cmp(&other.col))
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_excel_ref())
    }
}
