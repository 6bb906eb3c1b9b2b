//! Fixed-size tile grid with one occupant per tile.

use crate::models::{Direction, TilePos};

/// Something that knows which tile it sits on.
pub trait Placed {
    fn tile(&self) -> TilePos;
}

/// Width × height grid holding at most one item per tile.
///
/// Storing is overwrite-on-replace: the newest item at a tile wins and the
/// previous one is handed back to the caller. Iteration is row-major.
#[derive(Debug, Clone)]
pub struct TileGrid<T> {
    width: u32,
    height: u32,
    cells: Vec<Option<T>>,
}

impl<T> TileGrid<T> {
    pub fn new(width: u32, height: u32) -> Self {
        let mut cells = Vec::new();
        cells.resize_with(width as usize * height as usize, || None);
        Self { width, height, cells }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn slot(&self, pos: TilePos) -> Option<usize> {
        if pos.x < 0 || pos.y < 0 || pos.x as u32 >= self.width || pos.y as u32 >= self.height {
            return None;
        }
        Some(pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        self.slot(pos).is_some()
    }

    /// Store `item` at `pos`, returning the previous occupant.
    ///
    /// Positions outside the grid hand the item back as `Err`.
    pub fn put(&mut self, pos: TilePos, item: T) -> Result<Option<T>, T> {
        match self.slot(pos) {
            Some(slot) => Ok(self.cells[slot].replace(item)),
            None => Err(item),
        }
    }

    pub fn get(&self, pos: TilePos) -> Option<&T> {
        self.slot(pos).and_then(|slot| self.cells[slot].as_ref())
    }

    pub fn get_mut(&mut self, pos: TilePos) -> Option<&mut T> {
        self.slot(pos).and_then(move |slot| self.cells[slot].as_mut())
    }

    /// Occupant at `pos`, created with `make` on first access.
    ///
    /// Returns `None` only when `pos` is outside the grid.
    pub fn get_or_insert_with(&mut self, pos: TilePos, make: impl FnOnce() -> T) -> Option<&mut T> {
        let slot = self.slot(pos)?;
        Some(self.cells[slot].get_or_insert_with(make))
    }

    pub fn is_occupied(&self, pos: TilePos) -> bool {
        self.get(pos).is_some()
    }

    /// Occupant of the 4-neighbor in `direction`.
    ///
    /// Empty at grid edges and on unpopulated cells.
    pub fn adjacent(&self, pos: TilePos, direction: Direction) -> Option<&T> {
        self.get(pos.step(direction))
    }

    /// Non-empty cells in row-major order. Each call starts a fresh pass.
    pub fn all_occupied(&self) -> impl Iterator<Item = (TilePos, &T)> + '_ {
        let width = self.width as usize;
        self.cells.iter().enumerate().filter_map(move |(slot, cell)| {
            let pos = TilePos::new((slot % width) as i32, (slot / width) as i32);
            cell.as_ref().map(|item| (pos, item))
        })
    }

    /// Consume the grid, yielding occupants in row-major order.
    pub fn into_occupied(self) -> impl Iterator<Item = T> {
        self.cells.into_iter().flatten()
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

impl<T: Placed> TileGrid<T> {
    /// Store `item` at its own tile, discarding any previous occupant.
    ///
    /// Items outside the grid are handed back as `Err`.
    pub fn replace(&mut self, item: T) -> Result<Option<T>, T> {
        let pos = item.tile();
        self.put(pos, item)
    }
}
