use crate::constants::RESEED_DRAWS;
use crate::simulation::SimRng;
use rand::Rng;
use std::f32::consts::TAU;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("cell ({x}, {y}) is outside the field")]
    OutOfRange { x: i32, y: i32 },
}

/// Shared trail field: one optional direction angle per cell.
///
/// A cell is either unset or holds the heading (radians) of the trail last
/// laid through it. Cells are only ever cleared wholesale by [`reseed`],
/// which starts a new generation; within a generation the walkers' write
/// discipline keeps every cell write-once.
///
/// [`reseed`]: Field::reseed
pub struct Field {
    width: u32,
    height: u32,
    cells: Vec<Option<f32>>,
}

impl Field {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            cells: vec![None; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && (x as u32) < self.width && y >= 0 && (y as u32) < self.height
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Result<usize, FieldError> {
        if self.contains(x, y) {
            Ok(y as usize * self.width as usize + x as usize)
        } else {
            Err(FieldError::OutOfRange { x, y })
        }
    }

    /// Direction stored at `(x, y)`, or `None` for an unset cell.
    pub fn get(&self, x: i32, y: i32) -> Result<Option<f32>, FieldError> {
        let index = self.index(x, y)?;
        Ok(self.cells[index])
    }

    /// Overwrite `(x, y)` unconditionally with a trail direction.
    pub fn set(&mut self, x: i32, y: i32, angle: f32) -> Result<(), FieldError> {
        let index = self.index(x, y)?;
        self.cells[index] = Some(angle);
        Ok(())
    }

    /// Clear every cell, then scatter `RESEED_DRAWS` random ignition points,
    /// each holding a direction uniform in `[0, 2π)`. Draws are with
    /// replacement; a repeated draw just overwrites the same cell.
    pub fn reseed(&mut self, rng: &mut SimRng) {
        self.cells.fill(None);
        for _ in 0..RESEED_DRAWS {
            let index = rng.gen_range(0..self.cells.len());
            self.cells[index] = Some(rng.gen_range(0.0..TAU));
        }
    }

    /// Number of currently set cells.
    pub fn set_cell_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn new_field_is_unset() {
        let field = Field::new(8, 4);
        assert_eq!(field.set_cell_count(), 0);
        assert_eq!(field.get(7, 3), Ok(None));
    }

    #[test]
    fn out_of_range_is_an_error() {
        let mut field = Field::new(8, 4);
        assert_eq!(
            field.get(8, 0),
            Err(FieldError::OutOfRange { x: 8, y: 0 })
        );
        assert_eq!(
            field.get(0, -1),
            Err(FieldError::OutOfRange { x: 0, y: -1 })
        );
        assert!(field.set(-1, 2, 0.5).is_err());
        assert!(!field.contains(-1, 2));
        assert!(field.contains(0, 0));
    }

    #[test]
    fn set_overwrites() {
        let mut field = Field::new(8, 4);
        field.set(3, 2, 1.0).unwrap();
        field.set(3, 2, 2.0).unwrap();
        assert_eq!(field.get(3, 2), Ok(Some(2.0)));
    }

    #[test]
    fn reseed_scatters_ignition_points() {
        let mut field = Field::new(64, 64);
        let mut rng = SimRng::seed_from_u64(7);
        field.reseed(&mut rng);
        let count = field.set_cell_count();
        // Draws are with replacement, so collisions can shrink the count.
        assert!(count >= 1 && count <= RESEED_DRAWS);
        for x in 0..64 {
            for y in 0..64 {
                if let Some(angle) = field.get(x, y).unwrap() {
                    assert!((0.0..TAU).contains(&angle));
                }
            }
        }
    }

    #[test]
    fn reseed_clears_previous_generation() {
        let mut field = Field::new(64, 64);
        let mut rng = SimRng::seed_from_u64(7);
        for x in 0..64 {
            field.set(x, 10, 0.25).unwrap();
        }
        field.reseed(&mut rng);
        assert!(field.set_cell_count() <= RESEED_DRAWS);
    }
}
