//! The sheet: cell storage wired to the dependency graph and value cache
//!
//! # Example
//!
//! ```rust
//! use tallysheet::prelude::*;
//!
//! let mut sheet = Sheet::new();
//! sheet.set_cell("A1", "5").unwrap();
//! sheet.set_cell("B1", "=A1+1").unwrap();
//! sheet.set_cell("C1", "=B1*2").unwrap();
//! assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(12.0));
//!
//! sheet.set_cell("A1", "10").unwrap();
//! assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(22.0));
//! ```

use std::io::{self, Write};

use ahash::{AHashMap, AHashSet};
use tallysheet_core::{CellAddress, CellValue, Error, FormulaErrorKind, Result, Size};
use tallysheet_formula::EvaluationContext;

use crate::cache::{self, CacheCounters, CacheStats};
use crate::cell::{Cell, CellContent};
use crate::graph::DependencyGraph;
use crate::settings::SheetSettings;

/// A single sheet of cells
///
/// Edits (`&mut self`) validate, commit and invalidate in one step; reads
/// (`&self`) fill cache slots on the way, which is why the type is not
/// `Sync`.
#[derive(Debug)]
pub struct Sheet {
    settings: SheetSettings,
    /// Stored cells, including empty ones other cells still reference
    cells: AHashMap<CellAddress, Cell>,
    graph: DependencyGraph,
    counters: CacheCounters,
}

impl Default for Sheet {
    fn default() -> Self {
        Self::new()
    }
}

impl Sheet {
    /// Create an empty sheet covering the whole grid
    pub fn new() -> Self {
        Self::with_settings(SheetSettings::default())
    }

    /// Create an empty sheet with explicit limits
    pub fn with_settings(settings: SheetSettings) -> Self {
        Self {
            settings: settings.clamped(),
            cells: AHashMap::new(),
            graph: DependencyGraph::new(),
            counters: CacheCounters::default(),
        }
    }

    pub fn settings(&self) -> &SheetSettings {
        &self.settings
    }

    /// The reference graph between cells
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    fn parse_address(&self, address: &str) -> Result<CellAddress> {
        let addr = CellAddress::parse(address)?;
        self.settings.check(addr)?;
        Ok(addr)
    }

    // === Edits ===

    /// Set a cell from raw input text by address string (e.g., "A1")
    pub fn set_cell(&mut self, address: &str, text: &str) -> Result<()> {
        let addr = self.parse_address(address)?;
        self.set_cell_at(addr, text)
    }

    /// Set a cell from raw input text
    ///
    /// `""` clears the cell, `=...` sets a formula and anything else is
    /// text. A formula that does not parse, or whose references would make
    /// the sheet circular, is rejected and the sheet is left untouched.
    pub fn set_cell_at(&mut self, addr: CellAddress, text: &str) -> Result<()> {
        self.settings.check(addr)?;

        if self.text_at(addr) == text {
            return Ok(());
        }

        let content = CellContent::from_input(text, &self.settings.parse_options())
            .map_err(|err| {
                tracing::debug!(cell = %addr, %err, "rejected edit");
                err
            })?;

        if content.is_empty() {
            return self.clear_cell_at(addr);
        }

        // References beyond the sheet read as #REF! and are not graph nodes
        let settings = self.settings;
        let refs: Vec<CellAddress> = content
            .referenced_cells()
            .iter()
            .copied()
            .filter(|r| settings.contains(*r))
            .collect();

        if let Some(path) = self.graph.would_create_cycle(addr, &refs) {
            let err = Error::CircularReference { cell: addr, path };
            tracing::debug!(cell = %addr, %err, "rejected edit");
            return Err(err);
        }

        let old_refs = self.graph.precedents(addr).to_vec();
        for &r in &refs {
            self.cells.entry(r).or_default();
        }
        self.cells.entry(addr).or_default().content = content;
        self.graph.replace_edges(addr, refs);

        self.invalidate(addr);
        self.prune(&old_refs);

        tracing::debug!(cell = %addr, text, "cell set");
        Ok(())
    }

    /// Clear a cell by address string
    pub fn clear_cell(&mut self, address: &str) -> Result<()> {
        let addr = self.parse_address(address)?;
        self.clear_cell_at(addr)
    }

    /// Clear a cell; clearing an empty cell does nothing
    pub fn clear_cell_at(&mut self, addr: CellAddress) -> Result<()> {
        self.settings.check(addr)?;

        let Some(cell) = self.cells.get_mut(&addr) else {
            return Ok(());
        };
        if cell.content.is_empty() {
            return Ok(());
        }
        cell.content = CellContent::Empty;

        let old_refs = self.graph.precedents(addr).to_vec();
        self.graph.clear_edges(addr);

        self.invalidate(addr);
        self.prune(&old_refs);
        self.prune(&[addr]);

        tracing::debug!(cell = %addr, "cell cleared");
        Ok(())
    }

    fn invalidate(&mut self, origin: CellAddress) {
        let cleared = cache::invalidate(&mut self.cells, &self.graph, origin);
        self.counters.record_invalidations(cleared);
        tracing::trace!(cell = %origin, cleared, "invalidated");
    }

    /// Drop empty cells nothing references any more
    fn prune(&mut self, candidates: &[CellAddress]) {
        for addr in candidates {
            let unused = self
                .cells
                .get(addr)
                .is_some_and(|cell| cell.content.is_empty())
                && !self.graph.has_dependents(*addr);
            if unused {
                self.cells.remove(addr);
            }
        }
    }

    // === Reads ===

    /// Resolved value by address string
    pub fn value(&self, address: &str) -> Result<CellValue> {
        let addr = CellAddress::parse(address)?;
        Ok(self.value_at(addr))
    }

    /// Resolved value of a cell
    ///
    /// Never-set cells are `0`; addresses outside the sheet are `#REF!`.
    pub fn value_at(&self, addr: CellAddress) -> CellValue {
        if !self.settings.contains(addr) {
            return CellValue::Error(FormulaErrorKind::Ref);
        }
        let Some(cell) = self.cells.get(&addr) else {
            return CellValue::default();
        };

        if let Some(value) = cell.cache.get() {
            self.counters.record_hit();
            return value.clone();
        }

        self.fill_precedents(addr);
        self.fill(addr, cell).clone()
    }

    /// Fill the cache slots of every uncached cell `origin` reads, deepest
    /// first
    ///
    /// Walks the forward index with an explicit stack, so every formula
    /// evaluated afterwards finds its operands cached and reading a long
    /// reference chain does not recurse once per link.
    fn fill_precedents(&self, origin: CellAddress) {
        let mut visited: AHashSet<CellAddress> = AHashSet::new();
        let mut stack: Vec<(CellAddress, bool)> = self
            .graph
            .precedents(origin)
            .iter()
            .map(|&precedent| (precedent, false))
            .collect();

        while let Some((addr, expanded)) = stack.pop() {
            let Some(cell) = self.cells.get(&addr) else {
                continue;
            };
            if expanded {
                self.fill(addr, cell);
                continue;
            }
            if cell.is_cached() || !visited.insert(addr) {
                continue;
            }

            stack.push((addr, true));
            for &precedent in self.graph.precedents(addr) {
                if !visited.contains(&precedent) {
                    stack.push((precedent, false));
                }
            }
        }
    }

    fn fill<'c>(&self, addr: CellAddress, cell: &'c Cell) -> &'c CellValue {
        // A re-entrant fill of the same slot would mean a cycle got through
        cell.cache.get_or_init(|| {
            if cell.content.is_formula() {
                self.counters.record_evaluation();
                tracing::trace!(cell = %addr, "evaluating formula");
            }
            cell.content.resolve(self)
        })
    }

    /// Unevaluated text by address string
    pub fn text(&self, address: &str) -> Result<String> {
        let addr = CellAddress::parse(address)?;
        Ok(self.text_at(addr))
    }

    /// Unevaluated text of a cell (formulas in canonical form)
    pub fn text_at(&self, addr: CellAddress) -> String {
        self.cells
            .get(&addr)
            .map(|cell| cell.content.text())
            .unwrap_or_default()
    }

    /// Referenced cells by address string
    pub fn referenced_cells(&self, address: &str) -> Result<Vec<CellAddress>> {
        let addr = CellAddress::parse(address)?;
        Ok(self.referenced_cells_at(addr))
    }

    /// Cells a cell reads, sorted and deduplicated
    pub fn referenced_cells_at(&self, addr: CellAddress) -> Vec<CellAddress> {
        self.graph.precedents(addr).to_vec()
    }

    /// Cells that read a cell directly, sorted
    pub fn dependents(&self, addr: CellAddress) -> Vec<CellAddress> {
        let mut dependents: Vec<_> = self.graph.dependents(addr).collect();
        dependents.sort_unstable();
        dependents
    }

    /// Whether the cell holds text or a formula
    pub fn has_content(&self, addr: CellAddress) -> bool {
        self.cells
            .get(&addr)
            .is_some_and(|cell| !cell.content.is_empty())
    }

    /// Whether the cell's value is currently cached
    pub fn is_cached(&self, addr: CellAddress) -> bool {
        self.cells.get(&addr).is_some_and(Cell::is_cached)
    }

    /// Number of stored cells, including empty cells kept for their readers
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    // === Statistics ===

    pub fn cache_stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    pub fn reset_cache_stats(&self) {
        self.counters.reset();
    }

    // === Printing ===

    /// Smallest A1-anchored area covering every cell with content
    pub fn printable_size(&self) -> Size {
        self.cells
            .iter()
            .filter(|(_, cell)| !cell.content.is_empty())
            .fold(Size::default(), |size, (addr, _)| {
                Size::new(size.rows.max(addr.row + 1), size.cols.max(addr.col + 1))
            })
    }

    /// Write resolved values of the printable area, tab separated
    pub fn print_values<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |addr| {
            if self.has_content(addr) {
                self.value_at(addr).to_string()
            } else {
                String::new()
            }
        })
    }

    /// Write unevaluated texts of the printable area, tab separated
    pub fn print_texts<W: Write>(&self, out: &mut W) -> io::Result<()> {
        self.print_with(out, |addr| self.text_at(addr))
    }

    fn print_with<W: Write>(
        &self,
        out: &mut W,
        render: impl Fn(CellAddress) -> String,
    ) -> io::Result<()> {
        let size = self.printable_size();
        for row in 0..size.rows {
            for col in 0..size.cols {
                if col > 0 {
                    out.write_all(b"\t")?;
                }
                out.write_all(render(CellAddress::new(row, col)).as_bytes())?;
            }
            out.write_all(b"\n")?;
        }
        Ok(())
    }
}

impl EvaluationContext for Sheet {
    fn cell_value(&self, addr: CellAddress) -> CellValue {
        self.value_at(addr)
    }

    fn has_content(&self, addr: CellAddress) -> bool {
        Sheet::has_content(self, addr)
    }
}
