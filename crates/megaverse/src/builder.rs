//! Goal-map replay: fetch the goal grid and place every cell it describes.

use serde_json::Map;

use crate::repository::ObjectRepository;
use crate::transport::Method;
use crate::types::{GoalGrid, LabelError, Position};

/// How a build run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    /// Every cell of the grid was visited.
    Completed,
    /// The goal grid could not be fetched or was malformed; nothing was placed.
    GoalUnavailable,
    /// A label failed to decode; cells after `position` were not visited.
    Aborted {
        position: Position,
        reason: LabelError,
    },
}

/// Summary of one build run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub status: BuildStatus,
    /// Create requests that succeeded.
    pub placed: usize,
    /// Create requests that failed at the API or transport level.
    pub failed: usize,
}

impl BuildReport {
    fn new() -> Self {
        Self {
            status: BuildStatus::Completed,
            placed: 0,
            failed: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == BuildStatus::Completed
    }
}

/// Replays the remote goal grid as a sequence of create commands.
pub struct GoalMapBuilder {
    repository: ObjectRepository,
}

impl GoalMapBuilder {
    pub fn new(repository: ObjectRepository) -> Self {
        Self { repository }
    }

    /// Endpoint of the goal grid for the configured candidate.
    pub fn goal_endpoint(&self) -> String {
        format!("map/{}/goal", self.repository.dispatcher().candidate_id())
    }

    /// Fetch the goal grid. `None` if the request failed or the payload has
    /// the wrong shape; request failures are already logged by the dispatcher.
    pub async fn fetch_goal(&self) -> Option<GoalGrid> {
        let outcome = self
            .repository
            .dispatcher()
            .dispatch(Method::Get, &self.goal_endpoint(), Map::new())
            .await;

        let payload = outcome.into_payload()?;

        match serde_json::from_value::<GoalGrid>(payload) {
            Ok(grid) => Some(grid),
            Err(e) => {
                tracing::error!("Malformed goal map: {e}");
                None
            }
        }
    }

    /// Fetch the goal grid and place each cell in row-major order.
    ///
    /// Request failures are counted and skipped. An undecodable label stops
    /// the run at that cell.
    pub async fn build(&self) -> BuildReport {
        let Some(grid) = self.fetch_goal().await else {
            return BuildReport {
                status: BuildStatus::GoalUnavailable,
                placed: 0,
                failed: 0,
            };
        };

        tracing::info!(
            "Goal map fetched: {} rows x {} columns",
            grid.height(),
            grid.width()
        );
        self.replay(&grid).await
    }

    /// Place the cells of an already fetched grid.
    pub async fn replay(&self, grid: &GoalGrid) -> BuildReport {
        let mut report = BuildReport::new();

        for (position, decoded) in grid.plan() {
            let cell = match decoded {
                Ok(cell) => cell,
                Err(reason) => {
                    tracing::error!("{reason} at {position}; aborting build");
                    report.status = BuildStatus::Aborted { position, reason };
                    return report;
                }
            };

            match self.repository.place(position, cell).await {
                Some(outcome) if outcome.is_success() => report.placed += 1,
                Some(_) => report.failed += 1,
                None => {}
            }
        }

        tracing::info!(
            "Build completed: {} placed, {} failed",
            report.placed,
            report.failed
        );
        report
    }
}
