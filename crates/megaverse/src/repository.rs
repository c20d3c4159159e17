//! Typed create/delete commands per cell category.

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::config::MegaverseConfig;
use crate::dispatch::{Outcome, RequestDispatcher};
use crate::rate_limit::RateLimiter;
use crate::transport::{HttpTransport, Method};
use crate::types::{Cell, CellCategory, Color, Direction, MegaverseResult, Position};

/// Side length of the square the cross pattern is inscribed in.
pub const CROSS_SIZE: usize = 11;

/// Create and delete cells through a [`RequestDispatcher`].
///
/// Failures are logged by the dispatcher; this layer only adds the success
/// notice. Callers may ignore the returned [`Outcome`].
#[derive(Clone)]
pub struct ObjectRepository {
    dispatcher: RequestDispatcher,
}

impl ObjectRepository {
    pub fn new(dispatcher: RequestDispatcher) -> Self {
        Self { dispatcher }
    }

    /// Wire a repository to the real HTTP transport with its own rate limiter.
    pub fn from_config(config: &MegaverseConfig) -> MegaverseResult<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.request_timeout())?;
        let limiter = RateLimiter::new(config.request_delay());
        Ok(Self::new(RequestDispatcher::new(
            Arc::new(transport),
            Arc::new(limiter),
            config.candidate_id.clone(),
            config.base_url.clone(),
        )))
    }

    pub fn dispatcher(&self) -> &RequestDispatcher {
        &self.dispatcher
    }

    pub async fn create_point(&self, row: usize, column: usize) -> Outcome {
        self.create(CellCategory::Point, row, column, Map::new()).await
    }

    pub async fn delete_point(&self, row: usize, column: usize) -> Outcome {
        self.delete(CellCategory::Point, row, column).await
    }

    pub async fn create_color_marker(&self, row: usize, column: usize, color: Color) -> Outcome {
        let mut attrs = Map::new();
        attrs.insert("color".to_string(), json!(color));
        self.create(CellCategory::ColorMarker, row, column, attrs).await
    }

    pub async fn delete_color_marker(&self, row: usize, column: usize) -> Outcome {
        self.delete(CellCategory::ColorMarker, row, column).await
    }

    pub async fn create_direction_marker(
        &self,
        row: usize,
        column: usize,
        direction: Direction,
    ) -> Outcome {
        let mut attrs = Map::new();
        attrs.insert("direction".to_string(), json!(direction));
        self.create(CellCategory::DirectionMarker, row, column, attrs)
            .await
    }

    pub async fn delete_direction_marker(&self, row: usize, column: usize) -> Outcome {
        self.delete(CellCategory::DirectionMarker, row, column).await
    }

    /// Create whatever `cell` describes at `position`.
    ///
    /// Returns `None` for an empty cell, which issues no request.
    pub async fn place(&self, position: Position, cell: Cell) -> Option<Outcome> {
        let Position { row, column } = position;
        let outcome = match cell {
            Cell::Empty => return None,
            Cell::Point => self.create_point(row, column).await,
            Cell::ColorMarker(color) => self.create_color_marker(row, column, color).await,
            Cell::DirectionMarker(direction) => {
                self.create_direction_marker(row, column, direction).await
            }
        };
        Some(outcome)
    }

    /// Place the 17 points of an X inscribed in an 11x11 grid.
    ///
    /// The main diagonal runs corner to corner; the anti-diagonal only covers
    /// rows 2..=8 and shares the center with the main one.
    pub async fn create_cross(&self) -> Vec<Outcome> {
        let mut outcomes = Vec::new();
        for position in cross_positions() {
            outcomes.push(self.create_point(position.row, position.column).await);
        }
        outcomes
    }

    async fn create(
        &self,
        category: CellCategory,
        row: usize,
        column: usize,
        attrs: Map<String, Value>,
    ) -> Outcome {
        let Some(endpoint) = category.endpoint() else {
            return Outcome::Success(Value::Null);
        };
        let outcome = self
            .dispatcher
            .dispatch(Method::Post, endpoint, position_fields(row, column, attrs))
            .await;
        if outcome.is_success() {
            tracing::info!(
                "{} successfully created at ({row}, {column})",
                category.display_name()
            );
        }
        outcome
    }

    async fn delete(&self, category: CellCategory, row: usize, column: usize) -> Outcome {
        let Some(endpoint) = category.endpoint() else {
            return Outcome::Success(Value::Null);
        };
        let outcome = self
            .dispatcher
            .dispatch(Method::Delete, endpoint, position_fields(row, column, Map::new()))
            .await;
        if outcome.is_success() {
            tracing::info!(
                "{} successfully deleted at ({row}, {column})",
                category.display_name()
            );
        }
        outcome
    }
}

fn position_fields(row: usize, column: usize, mut attrs: Map<String, Value>) -> Map<String, Value> {
    attrs.insert("row".to_string(), json!(row));
    attrs.insert("column".to_string(), json!(column));
    attrs
}

/// Positions of the cross pattern in placement order.
pub fn cross_positions() -> Vec<Position> {
    let last = CROSS_SIZE - 1;
    let mut positions = Vec::new();
    for i in 0..CROSS_SIZE {
        positions.push(Position::new(i, i));
        if (2..=8).contains(&i) && i != last - i {
            positions.push(Position::new(i, last - i));
        }
    }
    positions
}
