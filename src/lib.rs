//! # Basisfit
//! ## Least-squares fits over monomial and spherical-harmonic bases
//!
//! Fitting a smooth function to an image or a cloud of points is the same problem whatever the
//! basis: build a matrix of basis evaluations, solve a least-squares system, and evaluate the
//! coefficients again somewhere else. This crate does those three steps once, well, for two
//! families of basis functions:
//! - Monomials `1, x, y, x², xy, y², ...` up to a total degree, in any number of dimensions
//! - Real spherical harmonics `Y_l^m(θ, φ)` up to a maximum degree
//!
//! It provides tools to:
//! - Fit one or many channels (e.g. the colors of an image) over the same samples
//! - Reconstruct the fit over the source grid, or any finer grid, with optional clamping
//! - Print the fitted function as a readable expression, dropping negligible terms
//! - Check fit quality with R², MSE and friends, and with assertion macros in tests
//!
//! The simplest use-case is to fit a curve through a few points:
//! ```rust
//! # use basisfit::{MonomialFit, config::{DegreeRange, FitConfig}, assert_r_squared};
//! let samples = vec![[1.0], [2.0], [3.0], [4.0], [5.0]];
//! let targets = vec![5.0, 3.9, 2.0, 8.5, 18.2];
//!
//! let fit = MonomialFit::new(&samples, &targets, 2, DegreeRange::CURVE, FitConfig::default()).unwrap();
//! assert_eq!(fit.to_string(), "13.2200 + -9.7571*x + 2.1429*x^2");
//! assert_r_squared!(fit, 0.9);
//! ```
//!
//! # Core Concepts
//! - A [`basis::Basis`] is a family of functions over D-dimensional coordinates:
//!     - [`basis::MonomialBasis`] for points and images mapped to the unit square.
//!     - [`basis::SphericalHarmonicBasis`] for `(θ, φ)` samples, such as equirectangular images.
//! - A [`basis::DesignMatrix`] is the `samples x terms` matrix of basis evaluations. It carries
//!   the [`basis::TermLabel`] of each column, and the fitted [`fit::Coefficients`] carry the
//!   same labels, so every later step agrees on the term order.
//! - [`LeastSquaresFitter`] solves for the coefficients using the SVD of the design matrix.
//!     - Rank-deficient systems get the least-norm solution; ill-conditioned ones are flagged.
//! - [`reconstruct::Reconstructor`] evaluates coefficients over a new design matrix, and
//!   [`reconstruct::Raster`] reshapes the result into an image.
//! - [`display::ExpressionFormatter`] renders coefficients as text.
//! - [`BasisFit`] and [`ChannelFits`] tie all of the above together.
//!
//! # Images
//! ```rust
//! # use basisfit::{MonomialChannelFits, config::FitConfig, grid::GridShape, reconstruct::Raster};
//! let shape = GridShape::new(16, 16);
//! let pixels: Vec<f64> = (0..shape.len()).map(|i| (i % 16) as f64 / 15.0).collect();
//! let image = Raster::new(shape, 1, pixels).unwrap();
//!
//! let config = FitConfig::default().with_clamp(0.0, 1.0);
//! let fits = MonomialChannelFits::image(&image, 3, config).unwrap();
//! let smooth = fits.reconstruct_image(GridShape::new(64, 64)).unwrap();
//! assert_eq!(smooth.data().len(), 64 * 64);
//! ```
//!
//! # Logging
//! The crate emits [`tracing`](https://docs.rs/tracing) events: `debug` for solve sizes and rank,
//! `warn` for ill-conditioned fits. It never installs a subscriber.
//!
//! # Testing utilities
//!
//! This crate includes float comparison and fit quality assertions. See [`test`].
//!
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::needless_range_loop)] // The worst clippy lint
#![allow(clippy::cast_precision_loss)] // I don't care about this one
#![allow(clippy::similar_names)] //       Clippy does not get to decide what names are similar
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod test;

pub mod basis;
pub mod config;
pub mod display;
pub mod error;
pub mod fit;
pub mod grid;
pub mod reconstruct;
pub mod statistics;
pub mod value;

mod model;

pub use fit::{Coefficients, FitDiagnostics, LeastSquaresFitter, LeastSquaresSolution};
pub use model::*;

pub use nalgebra;
