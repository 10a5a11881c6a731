//! Browser-facing wrapper: placement, ticking and a pixel buffer to draw.

use wasm_bindgen::prelude::*;

use crate::cell::{Color, Position};
use crate::config::SimConfig;
use crate::Simulation;

/// Owns a [`Simulation`] plus a `width * height` buffer of packed colors,
/// resynced after every tick. Empty slots read as 0.
#[wasm_bindgen]
#[derive(Debug)]
pub struct Universe {
    sim: Simulation,
    pixels: Vec<u32>,
}

#[wasm_bindgen]
impl Universe {
    /// Universe with the default rates.
    ///
    /// # Errors
    ///
    /// Returns the config error message for a zero-sized or oversized grid.
    #[wasm_bindgen(constructor)]
    pub fn new(width: u32, height: u32, seed: u64) -> Result<Universe, String> {
        Self::from_config(
            &SimConfig {
                width: width as usize,
                height: height as usize,
                ..SimConfig::default()
            },
            seed,
        )
    }

    /// # Errors
    ///
    /// Returns the config error message if any size or rate is rejected.
    #[wasm_bindgen(js_name = withRates)]
    pub fn with_rates(
        width: u32,
        height: u32,
        updates_per_second: f64,
        chance_move_to_side_per_sec: f64,
        chance_replace_per_sec: f64,
        chance_replace_per_weight: f64,
        seed: u64,
    ) -> Result<Universe, String> {
        Self::from_config(
            &SimConfig {
                width: width as usize,
                height: height as usize,
                updates_per_second,
                chance_move_to_side_per_sec,
                chance_replace_per_sec,
                chance_replace_per_weight,
            },
            seed,
        )
    }

    /// # Errors
    ///
    /// Returns the config error message for malformed or rejected JSON.
    #[wasm_bindgen(js_name = fromConfigJson)]
    pub fn from_config_json(json: &str, seed: u64) -> Result<Universe, String> {
        let config = SimConfig::from_json(json).map_err(|err| err.to_string())?;
        Self::from_config(&config, seed)
    }

    /// Run one tick and return how many cells moved.
    pub fn tick(&mut self) -> u32 {
        let stats = self.sim.tick();
        self.sync_pixels();
        stats.moved() as u32
    }

    /// Drop a cell at `(col, row)` if the slot is free. Returns whether it landed.
    pub fn place(&mut self, col: u32, row: u32, weight: u32, color: u32) -> bool {
        let pos = Position::new(col as usize, row as usize);
        if self.sim.place(pos, weight, Color(color)).is_none() {
            return false;
        }
        self.pixels[pos.row * self.sim.grid().width() + pos.col] = color;
        true
    }

    /// Brush stroke: fill the square of side `2 * radius + 1` around
    /// `(col, row)`, clipped to the grid. Returns how many cells landed.
    #[wasm_bindgen(js_name = placeRect)]
    pub fn place_rect(&mut self, col: u32, row: u32, radius: u32, weight: u32, color: u32) -> u32 {
        let center = Position::new(col as usize, row as usize);
        let placed = self.sim.place_rect(center, radius as usize, weight, Color(color));
        if placed > 0 {
            self.sync_pixels();
        }
        placed as u32
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.sim.grid().width() as u32
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.sim.grid().height() as u32
    }

    #[must_use]
    #[wasm_bindgen(js_name = cellCount)]
    pub fn cell_count(&self) -> u32 {
        self.sim.grid().len() as u32
    }

    #[must_use]
    #[wasm_bindgen(js_name = tickCount)]
    pub fn tick_count(&self) -> u64 {
        self.sim.ticks()
    }

    /// Pointer into wasm memory for a zero-copy `Uint32Array` view.
    #[must_use]
    #[wasm_bindgen(js_name = pixelsPtr)]
    pub fn pixels_ptr(&self) -> *const u32 {
        self.pixels.as_ptr()
    }
}

impl Universe {
    /// # Errors
    ///
    /// Returns the [`ConfigError`](crate::error::ConfigError) message if
    /// `config` is rejected.
    pub fn from_config(config: &SimConfig, seed: u64) -> Result<Universe, String> {
        let area = config.area().map_err(|err| err.to_string())?;
        let sim = Simulation::new(config, seed).map_err(|err| err.to_string())?;
        let pixels = vec![0; area];
        Ok(Self { sim, pixels })
    }

    #[must_use]
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    #[must_use]
    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    fn sync_pixels(&mut self) {
        let width = self.sim.grid().width();
        self.pixels.fill(0);
        for cell in self.sim.cells() {
            let pos = cell.position();
            self.pixels[pos.row * width + pos.col] = cell.color().0;
        }
    }
}
