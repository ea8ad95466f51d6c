//! Lens module
//!
//! This module provides high-level "lens" abstractions that combine business
//! logic with the types an interface needs to drive it and report on it.
//!
//! # Architecture
//!
//! Each lens module exports:
//! - A **Lens struct** (e.g., `BatchLens`) - the main entry point for all operations
//! - **Args structs** - input arguments for lens methods
//! - **Output types** - reports, progress events and errors
//!
//! ```rust,ignore
//! use halfway::lens::batch::{BatchLens, BatchLoadArgs};
//! use halfway::HalfwayConfig;
//!
//! let config = HalfwayConfig::new(&None)?;
//! let settings = BatchLoadArgs::default().resolve(&config)?;
//! let report = BatchLens::new(settings).run()?;
//! ```

pub mod utils;

pub mod batch;
