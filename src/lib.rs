#![forbid(unsafe_code)]
//! frakt: escape-time fractal computation core.
//!
//! Facade over the workspace crates. The typical flow:
//!
//! ```no_run
//! use std::collections::BTreeMap;
//! use std::sync::Arc;
//!
//! use frakt::core::{ComplexRegion, EngineConfig, FractalParameters, ImageSize};
//! use frakt::engine::Mandelbrot;
//! use frakt::exec::{CancelToken, Executor};
//! use frakt::mem::ResourceManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let region = ComplexRegion::from_bounds(-2.0, 1.0, -1.5, 1.5)?;
//! let params = FractalParameters::new(
//!     region,
//!     1000,
//!     ImageSize::new(800, 600)?,
//!     BTreeMap::new(),
//! )?;
//!
//! let config = EngineConfig::default();
//! let resources = Arc::new(ResourceManager::new(&config));
//! let executor = Executor::new(config, resources)?;
//!
//! let result = executor.calculate(
//!     &Mandelbrot::from_params(&params),
//!     &params,
//!     None,
//!     &CancelToken::new(),
//! )?;
//! println!("computed in {:?}", result.calculation_time());
//! # Ok(())
//! # }
//! ```

pub use frakt_core as core;
pub use frakt_engine as engine;
pub use frakt_exec as exec;
pub use frakt_formula as formula;
pub use frakt_mem as mem;
