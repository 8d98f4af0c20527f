//! Autoregressive multi-step forecast loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Days, NaiveDate};
use tracing::{debug, info, warn};

use super::series::{ForecastPoint, ForecastSeries};
use crate::error::{ForecastError, Result};
use crate::features::{CarryForwardPolicy, FeatureAssembler, FeatureSchema};
use crate::history::HistoryTable;
use crate::model::SequenceModel;
use crate::scaling::ScalingAdapter;
use crate::window::WindowState;

/// Upper bound on the points reserved before the first step.
const MAX_PREALLOCATED_POINTS: usize = 4096;

/// Read-only inputs shared by every step of a run.
///
/// Holds only borrows, so the same model and scaler can back several
/// independent runs at once.
pub struct ForecastContext<'a, M: SequenceModel + ?Sized> {
    model: &'a M,
    scaler: &'a ScalingAdapter,
    schema: &'a FeatureSchema,
    policy: CarryForwardPolicy,
}

impl<M: SequenceModel + ?Sized> Clone for ForecastContext<'_, M> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<M: SequenceModel + ?Sized> Copy for ForecastContext<'_, M> {}

impl<'a, M: SequenceModel + ?Sized> ForecastContext<'a, M> {
    /// Binds model, scaler and schema after checking they agree.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::FeatureSchemaMismatch`] if the model was
    /// trained on a different feature list, or the scaler's width or
    /// target index disagree with the schema.
    pub fn new(
        model: &'a M,
        scaler: &'a ScalingAdapter,
        schema: &'a FeatureSchema,
        policy: CarryForwardPolicy,
    ) -> Result<Self> {
        schema.ensure_matches(model.feature_names())?;
        if scaler.n_features() != schema.len() {
            return Err(ForecastError::schema_mismatch(format!(
                "scaler fitted on {} features, schema has {}",
                scaler.n_features(),
                schema.len()
            )));
        }
        if scaler.target_index() != schema.target_index() {
            return Err(ForecastError::schema_mismatch(format!(
                "scaler target index {} != schema target index {}",
                scaler.target_index(),
                schema.target_index()
            )));
        }
        Ok(Self {
            model,
            scaler,
            schema,
            policy,
        })
    }

    pub fn model(&self) -> &'a M {
        self.model
    }

    pub fn scaler(&self) -> &'a ScalingAdapter {
        self.scaler
    }

    pub fn schema(&self) -> &'a FeatureSchema {
        self.schema
    }

    pub fn window_size(&self) -> usize {
        self.model.window_size()
    }
}

/// Cooperative stop signal checked between forecast steps.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Lifecycle of one driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Initialized,
    Stepping { completed: usize },
    Done,
    /// A step failed; no further steps run and no output is produced.
    Failed,
}

/// Rolls a trained model forward one day at a time.
///
/// Each step feeds the previous prediction back in as the newest window
/// row, so errors compound over the horizon. There is no correction or
/// interval estimate; the output is a deterministic point-forecast chain.
pub struct AutoregressiveDriver<'a, M: SequenceModel + ?Sized> {
    ctx: ForecastContext<'a, M>,
    assembler: FeatureAssembler<'a>,
    window: WindowState,
    last_unscaled: Vec<f64>,
    last_date: NaiveDate,
    horizon: usize,
    points: Vec<ForecastPoint>,
    state: DriverState,
}

impl<'a, M: SequenceModel + ?Sized> AutoregressiveDriver<'a, M> {
    /// Prepares a run of `horizon` days from the tail of `history`.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::InvalidHorizon`] for a negative horizon, or one
    ///   whose last date falls outside the calendar range.
    /// - [`ForecastError::FeatureSchemaMismatch`] if `history` uses another
    ///   schema or the carry-forward policy rejects it.
    /// - [`ForecastError::InsufficientHistory`] if `history` is shorter
    ///   than the model window.
    /// - [`ForecastError::NonFiniteHistory`] for NaN/inf inside the window.
    pub fn new(ctx: ForecastContext<'a, M>, history: &HistoryTable, horizon: i64) -> Result<Self> {
        let requested = horizon;
        let horizon = usize::try_from(requested).map_err(|_| ForecastError::InvalidHorizon(requested))?;
        ctx.schema.ensure_matches(history.schema().names())?;
        let assembler = FeatureAssembler::new(ctx.schema, ctx.policy)?;

        let window_size = ctx.window_size();
        let (tail_dates, tail_rows) =
            history
                .tail(window_size)
                .ok_or(ForecastError::InsufficientHistory {
                    required: window_size,
                    available: history.len(),
                })?;

        for (date, row) in tail_dates.iter().zip(tail_rows) {
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(ForecastError::NonFiniteHistory {
                    date: *date,
                    feature: ctx.schema.names()[j].clone(),
                });
            }
        }

        let window = WindowState::initialize(tail_rows, window_size, ctx.scaler)?;
        // tail is non-empty: window_size > 0 is checked by WindowState
        let last_unscaled = tail_rows[tail_rows.len() - 1].clone();
        let last_date = tail_dates[tail_dates.len() - 1];
        // the final forecast date must be representable
        if last_date.checked_add_days(Days::new(horizon as u64)).is_none() {
            return Err(ForecastError::InvalidHorizon(requested));
        }

        Ok(Self {
            ctx,
            assembler,
            window,
            last_unscaled,
            last_date,
            horizon,
            points: Vec::with_capacity(horizon.min(MAX_PREALLOCATED_POINTS)),
            state: DriverState::Initialized,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn window(&self) -> &WindowState {
        &self.window
    }

    /// Runs one step. Returns `Ok(None)` once the horizon is reached.
    ///
    /// # Errors
    ///
    /// Any failure moves the driver to [`DriverState::Failed`] and drops
    /// the points collected so far.
    pub fn step(&mut self) -> Result<Option<ForecastPoint>> {
        let completed = match self.state {
            DriverState::Initialized => 0,
            DriverState::Stepping { completed } => completed,
            DriverState::Done | DriverState::Failed => return Ok(None),
        };
        if completed == self.horizon {
            self.state = DriverState::Done;
            return Ok(None);
        }

        match self.advance(completed + 1) {
            Ok(point) => {
                self.state = if completed + 1 == self.horizon {
                    DriverState::Done
                } else {
                    DriverState::Stepping {
                        completed: completed + 1,
                    }
                };
                Ok(Some(point))
            }
            Err(e) => {
                self.state = DriverState::Failed;
                self.points.clear();
                Err(e)
            }
        }
    }

    fn advance(&mut self, step: usize) -> Result<ForecastPoint> {
        let scaled = self
            .ctx
            .model
            .infer(self.window.current())
            .map_err(|e| ForecastError::Inference {
                step,
                reason: e.to_string(),
            })?;
        if !scaled.is_finite() {
            return Err(ForecastError::Inference {
                step,
                reason: format!("model returned non-finite value {scaled}"),
            });
        }

        let value = self.ctx.scaler.unscale_target(scaled);
        if !value.is_finite() {
            return Err(ForecastError::Inference {
                step,
                reason: format!("unscaled prediction is non-finite ({scaled} scaled)"),
            });
        }

        let date = self
            .last_date
            .checked_add_days(Days::new(step as u64))
            .ok_or(ForecastError::InvalidHorizon(self.horizon as i64))?;

        let row = self.assembler.assemble(date, &self.last_unscaled, value)?;
        let scaled_row = self.ctx.scaler.scale(&row)?;
        self.window.slide(scaled_row)?;
        self.last_unscaled = row;

        debug!(step, %date, scaled, value, "forecast step");
        let point = ForecastPoint { date, value };
        self.points.push(point);
        Ok(point)
    }

    /// Runs every remaining step and returns the full series.
    ///
    /// # Errors
    ///
    /// Propagates the first step failure; no partial series is returned.
    pub fn run(self) -> Result<ForecastSeries> {
        self.run_until(|| false)
    }

    /// Like [`AutoregressiveDriver::run`], checking `token` before each step.
    ///
    /// # Errors
    ///
    /// Returns [`ForecastError::Cancelled`] if the token fires before the
    /// horizon is complete.
    pub fn run_with_cancel(self, token: &CancelToken) -> Result<ForecastSeries> {
        self.run_until(|| token.is_cancelled())
    }

    fn run_until(mut self, cancelled: impl Fn() -> bool) -> Result<ForecastSeries> {
        info!(
            horizon = self.horizon,
            window = self.window.size(),
            features = self.ctx.schema.len(),
            last_date = %self.last_date,
            "starting autoregressive forecast"
        );
        let carried = self.ctx.schema.exogenous_columns();
        if !carried.is_empty() {
            warn!(
                columns = ?carried,
                "exogenous columns are carried forward unchanged over the horizon"
            );
        }

        while !matches!(self.state, DriverState::Done) {
            if cancelled() {
                let completed = self.points.len();
                return Err(ForecastError::Cancelled {
                    completed,
                    horizon: self.horizon,
                });
            }
            if self.step()?.is_none() {
                break;
            }
        }

        let series = ForecastSeries::from_points(self.last_date, self.points)?;
        info!(
            days = series.len(),
            total = series.total(),
            "forecast complete"
        );
        Ok(series)
    }
}

/// One-shot helper: builds a driver and runs it to completion.
///
/// # Errors
///
/// See [`AutoregressiveDriver::new`] and [`AutoregressiveDriver::run`].
pub fn forecast<M: SequenceModel + ?Sized>(
    ctx: ForecastContext<'_, M>,
    history: &HistoryTable,
    horizon: i64,
) -> Result<ForecastSeries> {
    AutoregressiveDriver::new(ctx, history, horizon)?.run()
}
