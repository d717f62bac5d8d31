use std::borrow::Cow;

use crate::{
    basis::{Basis, DesignMatrix, MonomialBasis, SphericalHarmonicBasis},
    config::{DegreeRange, FitConfig},
    display::{ExpressionFormatter, RGB_CHANNELS},
    error::{Error, Result},
    fit::{Coefficients, FitDiagnostics, LeastSquaresFitter, LeastSquaresSolution},
    grid::{self, GridShape},
    reconstruct::{Raster, Reconstructor},
    statistics,
    value::Value,
};

/// Monomial fit over D-dimensional points
///
/// Uses the products of coordinate powers `1, x, y, x², xy, y², ...` up to a total degree.
/// With one dimension this is the classic polynomial curve fit.
///
/// It is the simplest basis and is not normalized; high degrees over wide coordinate ranges
/// become ill-conditioned.
pub type MonomialFit<'data, T = f64> = BasisFit<'data, MonomialBasis<T>, T>;

/// Spherical harmonic fit over `(θ, φ)` samples
///
/// Uses the real spherical harmonics `Y_l^m` for `l <= L`, which are orthonormal on the sphere.
pub type SphericalHarmonicFit<'data, T = f64> = BasisFit<'data, SphericalHarmonicBasis<T>, T>;

/// Per-channel monomial fits of an image over the unit square
pub type MonomialChannelFits<T = f64> = ChannelFits<MonomialBasis<T>, T>;

/// Per-channel spherical harmonic fits of an equirectangular image
pub type SphericalHarmonicChannelFits<T = f64> = ChannelFits<SphericalHarmonicBasis<T>, T>;

/// A least-squares fit of one target channel over a basis.
///
/// `BasisFit` expands the samples into a design matrix, solves for the coefficients and keeps
/// the targets it was fit against, so it can report how well it explains them.
///
/// # For beginners
/// Most users do **not** need to construct this directly. Use one of the type aliases:
/// - [`crate::MonomialFit`] for points in one or more dimensions.
/// - [`crate::SphericalHarmonicFit`] for values over the sphere.
///
/// # How it works
/// - Builds a **design matrix** with shape `[samples, k]`, `k` being the number of basis terms.
/// - Solves `A * x = targets` in the least-squares sense using the **SVD** of the design matrix.
/// - Predictions over new samples expand them with the same basis, so the columns line up with
///   the coefficients.
///
/// # Example
/// ```
/// # use basisfit::{MonomialFit, config::{DegreeRange, FitConfig}};
/// let samples = vec![[1.0], [2.0], [3.0], [4.0], [5.0]];
/// let targets = vec![5.0, 3.9, 2.0, 8.5, 18.2];
///
/// let fit = MonomialFit::new(&samples, &targets, 2, DegreeRange::CURVE, FitConfig::default()).unwrap();
/// assert_eq!(fit.equation(), "13.2200 + -9.7571*x + 2.1429*x^2");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct BasisFit<'data, B: Basis<T>, T: Value = f64> {
    basis: B,
    targets: Cow<'data, [T]>,
    fitted: Vec<T>,
    coefficients: Coefficients<T>,
    diagnostics: FitDiagnostics<T>,
    config: FitConfig,
}
impl<'data, B: Basis<T>, T: Value> BasisFit<'data, B, T> {
    /// Fits `targets` over `samples` using an already-configured basis.
    ///
    /// # Errors
    /// - [`Error::NoData`] if there are no samples.
    /// - [`Error::DimensionMismatch`] if a sample has the wrong number of coordinates, or the
    ///   number of targets differs from the number of samples.
    /// - [`Error::CapacityExceeded`] if the design matrix would exceed
    ///   [`FitConfig::max_design_cells`].
    /// - [`Error::InsufficientSamples`] if the basis has more terms than there are samples and
    ///   the config rejects underdetermined fits.
    /// - [`Error::Algebra`] if the linear system could not be solved, including when a sample
    ///   overflows the basis to a non-finite value.
    /// - [`Error::InvalidRange`] if the configured clamp range is inverted or not finite.
    pub fn from_basis<S: AsRef<[T]>>(
        basis: B,
        samples: &[S],
        targets: impl Into<Cow<'data, [T]>>,
        config: FitConfig,
    ) -> Result<Self> {
        config.clamp_range::<T>()?;
        let targets = targets.into();
        let design = basis.expand_bounded(samples, config.max_design_cells)?;
        let solution = LeastSquaresFitter::new(config).solve(&design, &targets, true)?;
        Self::from_solution(basis, &design, targets, solution, config)
    }

    /// Assembles a fit from a finished solve over `design`.
    fn from_solution(
        basis: B,
        design: &DesignMatrix<T>,
        targets: Cow<'data, [T]>,
        solution: LeastSquaresSolution<T>,
        config: FitConfig,
    ) -> Result<Self> {
        let fitted = Reconstructor::new().predict(design, &solution.coefficients)?;
        Ok(Self {
            basis,
            targets,
            fitted,
            coefficients: solution.coefficients,
            diagnostics: solution.diagnostics,
            config,
        })
    }

    /// Returns an owned version of this fit, with a full copy of the targets.
    #[must_use]
    pub fn to_owned(&self) -> BasisFit<'static, B, T> {
        BasisFit {
            basis: self.basis.clone(),
            targets: Cow::Owned(self.targets.to_vec()),
            fitted: self.fitted.clone(),
            coefficients: self.coefficients.clone(),
            diagnostics: self.diagnostics,
            config: self.config,
        }
    }

    /// The basis the fit was made over.
    #[must_use]
    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// The degree bound of the basis.
    #[must_use]
    pub fn degree(&self) -> u32 {
        self.basis.degree()
    }

    /// The fitted coefficients, labelled by term.
    #[must_use]
    pub fn coefficients(&self) -> &Coefficients<T> {
        &self.coefficients
    }

    /// Rank and conditioning of the solve.
    #[must_use]
    pub fn diagnostics(&self) -> &FitDiagnostics<T> {
        &self.diagnostics
    }

    /// The settings the fit was made with.
    #[must_use]
    pub fn config(&self) -> &FitConfig {
        &self.config
    }

    /// The values the fit was made against.
    #[must_use]
    pub fn targets(&self) -> &[T] {
        &self.targets
    }

    /// The fit's predictions at each source sample, without clamping.
    #[must_use]
    pub fn fitted(&self) -> &[T] {
        &self.fitted
    }

    /// Computes the residuals of the fit: `target - fitted` for each source sample.
    #[must_use]
    pub fn residuals(&self) -> Vec<T> {
        self.targets
            .iter()
            .zip(&self.fitted)
            .map(|(&y, &y_fit)| y - y_fit)
            .collect()
    }

    /// Computes the residual variance of the fit, with one degree of freedom per coefficient.
    ///
    /// See [`statistics::residual_variance`].
    #[must_use]
    pub fn residual_variance(&self) -> T {
        let k = T::from_positive_int(self.coefficients.len());
        statistics::residual_variance(self.y_iter(), self.y_fit_iter(), k)
    }

    /// Computes the mean squared error (MSE) of this fit against its source data.
    ///
    /// See [`statistics::mean_squared_error`].
    #[must_use]
    pub fn mean_squared_error(&self) -> T {
        statistics::mean_squared_error(self.y_iter(), self.y_fit_iter())
    }

    /// Computes the root mean squared error (RMSE) of this fit against its source data.
    ///
    /// See [`statistics::root_mean_squared_error`].
    #[must_use]
    pub fn root_mean_squared_error(&self) -> T {
        statistics::root_mean_squared_error(self.y_iter(), self.y_fit_iter())
    }

    /// Computes the mean absolute error (MAE) of this fit against its source data.
    ///
    /// See [`statistics::mean_absolute_error`].
    #[must_use]
    pub fn mean_absolute_error(&self) -> T {
        statistics::mean_absolute_error(self.y_iter(), self.y_fit_iter())
    }

    /// Calculates the R-squared value of the fit against its source data.
    ///
    /// Values closer to 1 indicate a better fit. See [`statistics::r_squared`].
    #[must_use]
    pub fn r_squared(&self) -> T {
        statistics::r_squared(self.y_iter(), self.y_fit_iter())
    }

    /// Calculates the R-squared value, penalized for the number of coefficients.
    ///
    /// See [`statistics::adjusted_r_squared`].
    #[must_use]
    pub fn adjusted_r_squared(&self) -> T {
        let k = T::from_positive_int(self.coefficients.len());
        statistics::adjusted_r_squared(self.y_iter(), self.y_fit_iter(), k)
    }

    /// Predicts values at new samples, clamped to [`FitConfig::clamp`] if set.
    ///
    /// # Errors
    /// - [`Error::NoData`] if `samples` is empty.
    /// - [`Error::DimensionMismatch`] if a sample has the wrong number of coordinates.
    /// - [`Error::CapacityExceeded`] if the design matrix would exceed
    ///   [`FitConfig::max_design_cells`].
    pub fn predict<S: AsRef<[T]>>(&self, samples: &[S]) -> Result<Vec<T>> {
        let design = self.basis.expand_bounded(samples, self.config.max_design_cells)?;
        Reconstructor::from_config(&self.config)?.predict(&design, &self.coefficients)
    }

    /// Predicts values over a row-major grid of samples and reshapes them into a raster.
    ///
    /// # Errors
    /// - [`Error::ShapeMismatch`] if `samples.len()` differs from `shape.len()`.
    /// - Otherwise as [`BasisFit::predict`].
    pub fn predict_raster<S: AsRef<[T]>>(&self, samples: &[S], shape: GridShape) -> Result<Raster<T>> {
        check_grid(samples.len(), shape)?;
        let values = self.predict(samples)?;
        Reconstructor::from_config(&self.config)?.to_raster(values, shape)
    }

    /// Returns a human-readable expression of the fit, using the default notation.
    ///
    /// Coordinates are named `x`, `x, y` or `x, y, z` by dimension.
    #[must_use]
    pub fn equation(&self) -> String {
        self.equation_with(&ExpressionFormatter::for_dimensions(self.basis.dimensions()))
    }

    /// Returns a human-readable expression of the fit, using a custom formatter.
    #[must_use]
    pub fn equation_with(&self, formatter: &ExpressionFormatter) -> String {
        formatter.format(&self.coefficients)
    }

    /// Returns the properties of the fit.
    ///
    /// This is a comprehensive summary of the fit's characteristics.
    #[must_use]
    pub fn properties(&self) -> FitProperties<T> {
        FitProperties {
            degree: self.degree(),
            data_points: self.targets.len(),
            coefficients: self.coefficients.clone(),
            diagnostics: self.diagnostics,
            mse: self.mean_squared_error(),
            r_squared: self.r_squared(),
        }
    }

    fn y_iter(&self) -> impl Iterator<Item = T> + '_ {
        self.targets.iter().copied()
    }

    fn y_fit_iter(&self) -> impl Iterator<Item = T> + '_ {
        self.fitted.iter().copied()
    }
}

impl<'data, T: Value> BasisFit<'data, MonomialBasis<T>, T> {
    /// Fits a monomial of total degree `degree` to `targets` over `samples`.
    ///
    /// The number of dimensions is taken from the first sample.
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `degree` is outside `range`.
    /// - Otherwise as [`BasisFit::from_basis`].
    ///
    /// # Example
    /// ```
    /// # use basisfit::{MonomialFit, config::{DegreeRange, FitConfig}};
    /// let samples = vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [0.5, 0.5]];
    /// let targets: Vec<f64> = samples.iter().map(|[u, v]| 1.0 + 2.0 * u - v).collect();
    ///
    /// let fit = MonomialFit::new(&samples, &targets, 1, DegreeRange::IMAGE, FitConfig::default()).unwrap();
    /// assert_eq!(fit.equation(), "1.0000 + 2.0000*x + -1.0000*y");
    /// ```
    pub fn new<S: AsRef<[T]>>(
        samples: &[S],
        targets: impl Into<Cow<'data, [T]>>,
        degree: u32,
        range: DegreeRange,
        config: FitConfig,
    ) -> Result<Self> {
        let dimensions = samples.first().ok_or(Error::NoData)?.as_ref().len();
        let basis = MonomialBasis::new(dimensions, degree, range)?;
        Self::from_basis(basis, samples, targets, config)
    }
}

impl<'data, T: Value> BasisFit<'data, SphericalHarmonicBasis<T>, T> {
    /// Fits real spherical harmonics up to degree `max_degree` to `targets` over `(θ, φ)`
    /// samples.
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `max_degree` is outside `range`.
    /// - Otherwise as [`BasisFit::from_basis`].
    pub fn new<S: AsRef<[T]>>(
        samples: &[S],
        targets: impl Into<Cow<'data, [T]>>,
        max_degree: u32,
        range: DegreeRange,
        config: FitConfig,
    ) -> Result<Self> {
        let basis = SphericalHarmonicBasis::new(max_degree, range)?;
        Self::from_basis(basis, samples, targets, config)
    }
}

impl<B: Basis<T>, T: Value> std::fmt::Display for BasisFit<'_, B, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.equation())
    }
}

/// A set of diagnostic properties for a fit.
///
/// Can be serialized to JSON or other formats.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct FitProperties<T: Value> {
    /// The degree bound of the basis.
    pub degree: u32,

    /// The number of samples used in the fit.
    pub data_points: usize,

    /// The fitted coefficients, with their term labels.
    pub coefficients: Coefficients<T>,

    /// Rank and conditioning of the solve.
    pub diagnostics: FitDiagnostics<T>,

    /// The mean squared error of the fit.
    pub mse: T,

    /// The R² value of the fit.
    pub r_squared: T,
}

/// Independent fits of several channels over the same samples, e.g. the colors of an image.
///
/// The design matrix is built and decomposed once; each channel is then solved on its own
/// and gets its own [`BasisFit`], coefficients and statistics.
///
/// # Example
/// ```
/// # use basisfit::{MonomialChannelFits, config::FitConfig, grid::GridShape, reconstruct::Raster};
/// // A 4x5 RGB gradient
/// let shape = GridShape::new(4, 5);
/// let mut data = Vec::new();
/// for row in 0..4 {
///     for col in 0..5 {
///         let (u, v) = (f64::from(col) / 4.0, f64::from(row) / 3.0);
///         data.extend([u, v, 0.5]);
///     }
/// }
/// let image = Raster::new(shape, 3, data).unwrap();
///
/// let fits = MonomialChannelFits::image(&image, 1, FitConfig::default()).unwrap();
/// assert!(fits.report().starts_with("=== Red Channel ===\n1.0000*u\n\n"));
///
/// let restored = fits.reconstruct_image(shape).unwrap();
/// assert!((restored.get(3, 4, 1).unwrap() - 1.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelFits<B: Basis<T>, T: Value = f64> {
    basis: B,
    names: Vec<String>,
    fits: Vec<BasisFit<'static, B, T>>,
    formatter: ExpressionFormatter,
    config: FitConfig,
}
impl<B: Basis<T>, T: Value> ChannelFits<B, T> {
    /// Fits each channel of targets over the same samples.
    ///
    /// Three channels are named `Red`, `Green` and `Blue`; any other count is named by index.
    /// Use [`ChannelFits::with_names`] to change them.
    ///
    /// # Errors
    /// - [`Error::NoData`] if there are no samples or no channels.
    /// - Otherwise as [`BasisFit::from_basis`], for any channel.
    pub fn from_basis<S: AsRef<[T]>, C: AsRef<[T]> + Sync>(
        basis: B,
        samples: &[S],
        channels: &[C],
        config: FitConfig,
    ) -> Result<Self> {
        if channels.is_empty() {
            return Err(Error::NoData);
        }
        config.clamp_range::<T>()?;

        let design = basis.expand_bounded(samples, config.max_design_cells)?;
        let solutions = LeastSquaresFitter::new(config).fit_channels(&design, channels, true)?;

        let fits = channels
            .iter()
            .zip(solutions)
            .map(|(targets, solution)| {
                let targets = Cow::Owned(targets.as_ref().to_vec());
                BasisFit::from_solution(basis.clone(), &design, targets, solution, config)
            })
            .collect::<Result<Vec<_>>>()?;

        let names = if fits.len() == RGB_CHANNELS.len() {
            RGB_CHANNELS.iter().map(ToString::to_string).collect()
        } else {
            (0..fits.len()).map(|i| i.to_string()).collect()
        };

        let formatter = ExpressionFormatter::for_dimensions(basis.dimensions());
        Ok(Self {
            basis,
            names,
            fits,
            formatter,
            config,
        })
    }

    /// Renames the channels, in order. Extra names are ignored.
    #[must_use]
    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        for (slot, name) in self.names.iter_mut().zip(names) {
            *slot = name.into();
        }
        self
    }

    /// Uses a custom formatter for [`ChannelFits::report`].
    #[must_use]
    pub fn with_formatter(mut self, formatter: ExpressionFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// The basis shared by every channel.
    #[must_use]
    pub fn basis(&self) -> &B {
        &self.basis
    }

    /// Channel names, in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// The per-channel fits, in order.
    #[must_use]
    pub fn channels(&self) -> &[BasisFit<'static, B, T>] {
        &self.fits
    }

    /// The fit of one channel, or `None` if out of bounds.
    #[must_use]
    pub fn channel(&self, channel: usize) -> Option<&BasisFit<'static, B, T>> {
        self.fits.get(channel)
    }

    /// Number of channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fits.len()
    }

    /// Returns true if there are no channels. Never true for a successful fit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fits.is_empty()
    }

    /// Predicts every channel over a row-major grid of samples, interleaved into one raster.
    ///
    /// The samples are expanded once and shared by all channels.
    ///
    /// # Errors
    /// - [`Error::ShapeMismatch`] if `samples.len()` differs from `shape.len()`.
    /// - Otherwise as [`BasisFit::predict`].
    pub fn predict_raster<S: AsRef<[T]>>(&self, samples: &[S], shape: GridShape) -> Result<Raster<T>> {
        check_grid(samples.len(), shape)?;

        let design = self.basis.expand_bounded(samples, self.config.max_design_cells)?;
        let reconstructor = Reconstructor::from_config(&self.config)?;
        let channels = self
            .fits
            .iter()
            .map(|fit| reconstructor.predict(&design, fit.coefficients()))
            .collect::<Result<Vec<_>>>()?;

        Raster::from_channels(shape, &channels)
    }

    /// Renders every channel's expression under a `=== Name Channel ===` header.
    #[must_use]
    pub fn report(&self) -> String {
        self.report_with(&self.formatter)
    }

    /// Renders every channel's expression using a custom formatter.
    #[must_use]
    pub fn report_with(&self, formatter: &ExpressionFormatter) -> String {
        let names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        let coefficients: Vec<Coefficients<T>> =
            self.fits.iter().map(|fit| fit.coefficients().clone()).collect();
        formatter.format_channels(&names, &coefficients)
    }

    /// Returns the properties of every channel's fit, in order.
    #[must_use]
    pub fn properties(&self) -> Vec<FitProperties<T>> {
        self.fits.iter().map(BasisFit::properties).collect()
    }
}

impl<T: Value> ChannelFits<MonomialBasis<T>, T> {
    /// Fits a monomial of total degree `degree` to each channel over `samples`.
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `degree` is outside `range`.
    /// - Otherwise as [`ChannelFits::from_basis`].
    pub fn new<S: AsRef<[T]>, C: AsRef<[T]> + Sync>(
        samples: &[S],
        channels: &[C],
        degree: u32,
        range: DegreeRange,
        config: FitConfig,
    ) -> Result<Self> {
        let dimensions = samples.first().ok_or(Error::NoData)?.as_ref().len();
        let basis = MonomialBasis::new(dimensions, degree, range)?;
        Self::from_basis(basis, samples, channels, config)
    }

    /// Fits every channel of an image as a monomial in `(u, v)` over the unit square.
    ///
    /// Pixel `(row, col)` is sampled at `u = col / (width - 1)`, `v = row / (height - 1)`. The
    /// degree must be within [`DegreeRange::IMAGE`]. Expressions are written in `u` and `v`.
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `degree` is outside [`DegreeRange::IMAGE`].
    /// - Otherwise as [`ChannelFits::from_basis`].
    pub fn image(image: &Raster<T>, degree: u32, config: FitConfig) -> Result<Self> {
        tracing::debug!(shape = %image.shape(), channels = image.channels(), degree, "fitting image over the unit square");

        let samples = grid::unit_square::<T>(image.shape())?;
        let channels = split_channels(image);
        Ok(Self::new(&samples, &channels, degree, DegreeRange::IMAGE, config)?
            .with_formatter(ExpressionFormatter::new(["u", "v"])))
    }

    /// Reconstructs an image fit with [`ChannelFits::image`] at any resolution.
    ///
    /// # Errors
    /// See [`ChannelFits::predict_raster`].
    pub fn reconstruct_image(&self, shape: GridShape) -> Result<Raster<T>> {
        self.predict_raster(&grid::unit_square::<T>(shape)?, shape)
    }
}

impl<T: Value> ChannelFits<SphericalHarmonicBasis<T>, T> {
    /// Fits real spherical harmonics up to degree `max_degree` to each channel over `(θ, φ)`
    /// samples.
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `max_degree` is outside `range`.
    /// - Otherwise as [`ChannelFits::from_basis`].
    pub fn new<S: AsRef<[T]>, C: AsRef<[T]> + Sync>(
        samples: &[S],
        channels: &[C],
        max_degree: u32,
        range: DegreeRange,
        config: FitConfig,
    ) -> Result<Self> {
        let basis = SphericalHarmonicBasis::new(max_degree, range)?;
        Self::from_basis(basis, samples, channels, config)
    }

    /// Fits every channel of an equirectangular image with spherical harmonics.
    ///
    /// Pixel `(row, col)` is sampled at `θ = v·π`, `φ = u·2π` (see [`grid::spherical`]). The
    /// degree must be within [`DegreeRange::SPHERICAL`].
    ///
    /// # Errors
    /// - [`Error::InvalidDegree`] if `max_degree` is outside [`DegreeRange::SPHERICAL`].
    /// - Otherwise as [`ChannelFits::from_basis`].
    pub fn image(image: &Raster<T>, max_degree: u32, config: FitConfig) -> Result<Self> {
        tracing::debug!(shape = %image.shape(), channels = image.channels(), max_degree, "fitting image over the sphere");

        let samples = grid::spherical::<T>(image.shape())?;
        let channels = split_channels(image);
        Self::new(&samples, &channels, max_degree, DegreeRange::SPHERICAL, config)
    }

    /// Reconstructs an image fit with [`ChannelFits::image`] at any resolution.
    ///
    /// # Errors
    /// See [`ChannelFits::predict_raster`].
    pub fn reconstruct_image(&self, shape: GridShape) -> Result<Raster<T>> {
        self.predict_raster(&grid::spherical::<T>(shape)?, shape)
    }
}

impl<B: Basis<T>, T: Value> std::fmt::Display for ChannelFits<B, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.report())
    }
}

fn split_channels<T: Value>(image: &Raster<T>) -> Vec<Vec<T>> {
    (0..image.channels()).filter_map(|c| image.channel(c)).collect()
}

fn check_grid(samples: usize, shape: GridShape) -> Result<()> {
    if samples == shape.len() {
        Ok(())
    } else {
        Err(Error::ShapeMismatch {
            height: shape.height,
            width: shape.width,
            expected: shape.len(),
            got: samples,
        })
    }
}
