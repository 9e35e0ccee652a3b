//! Fan-out / aggregate over the three plan tasks

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::validation::{validate_ai_sections, validate_idea};
use crate::analysis::parse_sections;
use crate::common::errors::{PlanError, Result, TaskFailure, TaskKind};
use crate::common::traits::{AnalysisProvider, MarketDataSource, PlanObserver};
use crate::common::types::{MarketAnalysis, PlanDraft};
use crate::finance;

/// Observer that reports settled tasks and discarded results through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PlanObserver for TracingObserver {
    fn task_settled(&self, task: TaskKind, succeeded: bool) {
        debug!(task = %task, succeeded, "plan task settled");
    }

    fn results_discarded(&self, tasks: &[TaskKind]) {
        let names: Vec<String> = tasks.iter().map(ToString::to_string).collect();
        info!(tasks = ?names, "discarding successful task results after sibling failure");
    }
}

/// Builds a [`PlanDraft`] from a raw business idea
pub struct PlanOrchestrator {
    analysis: Arc<dyn AnalysisProvider>,
    market: Arc<dyn MarketDataSource>,
    observer: Arc<dyn PlanObserver>,
}

impl PlanOrchestrator {
    pub fn new(analysis: Arc<dyn AnalysisProvider>, market: Arc<dyn MarketDataSource>) -> Self {
        Self::with_observer(analysis, market, Arc::new(TracingObserver))
    }

    pub fn with_observer(
        analysis: Arc<dyn AnalysisProvider>,
        market: Arc<dyn MarketDataSource>,
        observer: Arc<dyn PlanObserver>,
    ) -> Self {
        Self {
            analysis,
            market,
            observer,
        }
    }

    /// Validate the idea, run every task to completion, then assemble the draft
    ///
    /// Fails with [`PlanError::TasksFailed`] naming every failed task when any
    /// task fails, or with a contract error when the analysis text lacks the
    /// required sections. A draft is only returned complete.
    #[instrument(skip(self, raw))]
    pub async fn build_plan(&self, raw: &Value) -> Result<PlanDraft> {
        let idea = validate_idea(raw)?;
        info!(idea = %idea.id, industry = %idea.industry, "building plan");

        let request = idea.analysis_request();
        let analysis_task = async {
            let text = self.analysis.analyze(&request).await?;
            Ok::<_, PlanError>(parse_sections(&text))
        };
        let market_task = self.market.industry_stats(&idea.industry);
        let financial_task = async { finance::compute(&idea.financial_inputs) };

        let (sections, market, projections) =
            tokio::join!(analysis_task, market_task, financial_task);

        let settled = [
            (TaskKind::Analysis, sections.is_ok()),
            (TaskKind::Market, market.is_ok()),
            (TaskKind::Financials, projections.is_ok()),
        ];
        for (task, succeeded) in settled {
            self.observer.task_settled(task, succeeded);
        }

        let (sections, market, projections) = match (sections, market, projections) {
            (Ok(sections), Ok(market), Ok(projections)) => (sections, market, projections),
            (sections, market, projections) => {
                let mut failures = Vec::new();
                if let Err(error) = sections {
                    failures.push(TaskFailure {
                        task: TaskKind::Analysis,
                        error,
                    });
                }
                if let Err(error) = market {
                    failures.push(TaskFailure {
                        task: TaskKind::Market,
                        error,
                    });
                }
                if let Err(error) = projections {
                    failures.push(TaskFailure {
                        task: TaskKind::Financials,
                        error,
                    });
                }

                let discarded: Vec<TaskKind> = settled
                    .iter()
                    .filter(|(_, succeeded)| *succeeded)
                    .map(|(task, _)| *task)
                    .collect();
                if !discarded.is_empty() {
                    self.observer.results_discarded(&discarded);
                }

                for failure in &failures {
                    warn!(task = %failure.task, error = %failure.error, "plan task failed");
                }
                return Err(PlanError::TasksFailed(failures));
            }
        };

        let ai = validate_ai_sections(&sections).map_err(|e| {
            warn!(error = %e, "analysis text failed its shape check");
            e
        })?;

        Ok(PlanDraft {
            executive_summary: ai.summary,
            market_analysis: MarketAnalysis::clone(&market),
            swot: ai.swot,
            projections,
            recommendations: ai.recommendations,
        })
    }
}
