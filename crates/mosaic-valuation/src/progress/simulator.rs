//! Progress state machine

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::catalog::{self, AnalysisKind};

const MAX_PROGRESS: f64 = 100.0;
const AGENT_MAX_INCREMENT: f64 = 15.0;
const STEP_MAX_INCREMENT: f64 = 20.0;
const STEP_UPDATE_PROBABILITY: f64 = 0.7;
/// Shortest tick `drive` will run at
const MIN_TICK: Duration = Duration::from_millis(1);

/// A named unit of simulated work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: f64,
}

impl Agent {
    pub fn is_complete(&self) -> bool {
        self.progress >= MAX_PROGRESS
    }
}

/// Status of one flow step, always derived from its completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StepStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl StepStatus {
    pub fn from_completion(completion: f64) -> Self {
        if completion >= MAX_PROGRESS {
            Self::Completed
        } else if completion > 0.0 {
            Self::InProgress
        } else {
            Self::Pending
        }
    }
}

/// Category tagged data carried by a flow step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indicators: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patterns: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<String>,
    #[serde(default)]
    pub completion: f64,
}

/// One stage of the simulated analysis pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowStep {
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub status: StepStatus,
    pub agent: String,
    pub data: StepData,
}

impl FlowStep {
    /// Set completion and re-derive the status from it
    fn set_completion(&mut self, completion: f64) {
        self.data.completion = clamp_percent(completion);
        self.status = StepStatus::from_completion(self.data.completion);
    }
}

/// Caller-held simulation state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub agents: Vec<Agent>,
    pub flow: Vec<FlowStep>,
}

impl ProgressSnapshot {
    /// True once every flow step has completed
    pub fn is_complete(&self) -> bool {
        !self.flow.is_empty()
            && self
                .flow
                .iter()
                .all(|step| step.status == StepStatus::Completed)
    }

    /// Clamp every percentage into range and re-derive step statuses.
    ///
    /// Snapshots come back from clients, so nothing about them is trusted.
    pub fn normalized(mut self) -> Self {
        for agent in &mut self.agents {
            agent.progress = clamp_percent(agent.progress);
        }
        for step in &mut self.flow {
            step.set_completion(step.data.completion);
        }
        self
    }
}

fn clamp_percent(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, MAX_PROGRESS)
    }
}

/// Stateless progress simulator
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressSimulator;

impl ProgressSimulator {
    pub fn new() -> Self {
        Self
    }

    /// Fresh snapshot for the given configuration
    pub fn start(&self, kind: AnalysisKind) -> ProgressSnapshot {
        tracing::debug!(kind = kind.as_str(), "starting progress simulation");
        ProgressSnapshot {
            agents: kind.agents(),
            flow: catalog::flow_steps(),
        }
    }

    /// Advance a snapshot by one tick.
    ///
    /// Agents already complete on input leave the active set. Each remaining
    /// agent gains `U[0, 15]` progress; each step gains `U[0, 20]` completion
    /// with probability 0.7. Everything is clamped to 100 and never decreases.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        snapshot: ProgressSnapshot,
        rng: &mut R,
    ) -> ProgressSnapshot {
        let ProgressSnapshot { agents, flow } = snapshot.normalized();

        let agents = agents
            .into_iter()
            .filter(|agent| !agent.is_complete())
            .map(|mut agent| {
                let increment = rng.gen_range(0.0..=AGENT_MAX_INCREMENT);
                agent.progress = clamp_percent(agent.progress + increment);
                agent
            })
            .collect();

        let flow = flow
            .into_iter()
            .map(|mut step| {
                if rng.gen_bool(STEP_UPDATE_PROBABILITY) {
                    let increment = rng.gen_range(0.0..=STEP_MAX_INCREMENT);
                    step.set_completion(step.data.completion + increment);
                }
                step
            })
            .collect();

        ProgressSnapshot { agents, flow }
    }

    /// Run a simulation to completion on a local clock, handing every
    /// snapshot (including the initial one) to `on_tick`.
    ///
    /// `period` is raised to at least 1 ms.
    pub async fn drive<R, F>(
        &self,
        kind: AnalysisKind,
        period: Duration,
        rng: &mut R,
        mut on_tick: F,
    ) -> ProgressSnapshot
    where
        R: Rng + ?Sized,
        F: FnMut(&ProgressSnapshot),
    {
        let mut snapshot = self.start(kind);
        on_tick(&snapshot);

        let mut ticker = tokio::time::interval(period.max(MIN_TICK));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of an interval completes immediately.
        ticker.tick().await;

        let mut ticks = 0_u32;
        while !snapshot.is_complete() {
            ticker.tick().await;
            snapshot = self.advance(snapshot, rng);
            ticks += 1;
            on_tick(&snapshot);
        }

        tracing::info!(kind = kind.as_str(), ticks, "progress simulation complete");
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn assert_status_invariant(snapshot: &ProgressSnapshot) {
        for step in &snapshot.flow {
            let c = step.data.completion;
            assert!((0.0..=100.0).contains(&c));
            assert_eq!(step.status == StepStatus::Completed, c >= 100.0);
            assert_eq!(step.status == StepStatus::Pending, c == 0.0);
        }
    }

    #[test]
    fn test_start_technical_analysis() {
        let snapshot = ProgressSimulator::new().start(AnalysisKind::TechnicalAnalysis);
        let names: Vec<&str> = snapshot.agents.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Technical Analyst", "Momentum Trader", "Risk Manager"]);
        assert!(snapshot.agents.iter().all(|a| a.progress == 0.0));

        assert_eq!(snapshot.flow.len(), 4);
        assert!(snapshot
            .flow
            .iter()
            .all(|s| s.status == StepStatus::Pending && s.data.completion == 0.0));
        assert!(!snapshot.is_complete());
    }

    #[test]
    fn test_start_returns_fresh_copies() {
        let sim = ProgressSimulator::new();
        let mut rng = StdRng::seed_from_u64(7);
        let advanced = sim.advance(sim.start(AnalysisKind::MarketAnalysis), &mut rng);
        assert!(advanced.agents.iter().any(|a| a.progress > 0.0));

        let fresh = sim.start(AnalysisKind::MarketAnalysis);
        assert!(fresh.agents.iter().all(|a| a.progress == 0.0));
    }

    #[test]
    fn test_status_from_completion() {
        assert_eq!(StepStatus::from_completion(0.0), StepStatus::Pending);
        assert_eq!(StepStatus::from_completion(0.01), StepStatus::InProgress);
        assert_eq!(StepStatus::from_completion(99.9), StepStatus::InProgress);
        assert_eq!(StepStatus::from_completion(100.0), StepStatus::Completed);
    }

    #[test]
    fn test_advance_is_monotonic_and_bounded() {
        let sim = ProgressSimulator::new();
        let mut rng = StdRng::seed_from_u64(42);
        let mut snapshot = sim.start(AnalysisKind::MarketAnalysis);

        for _ in 0..200 {
            let next = sim.advance(snapshot.clone(), &mut rng);
            assert_status_invariant(&next);

            for agent in &next.agents {
                let before = snapshot.agents.iter().find(|a| a.id == agent.id).unwrap();
                assert!(agent.progress >= before.progress);
                assert!(agent.progress <= 100.0);
                assert!(agent.progress - before.progress <= 15.0);
            }
            for (step, before) in next.flow.iter().zip(&snapshot.flow) {
                assert!(step.data.completion >= before.data.completion);
                assert!(step.data.completion - before.data.completion <= 20.0);
            }
            snapshot = next;
        }

        assert!(snapshot.is_complete());
        assert!(snapshot.agents.is_empty());
    }

    #[test]
    fn test_completed_agents_leave_active_set() {
        let sim = ProgressSimulator::new();
        let mut rng = StdRng::seed_from_u64(1);
        let mut snapshot = sim.start(AnalysisKind::MarketAnalysis);
        snapshot.agents[0].progress = 100.0;

        let next = sim.advance(snapshot, &mut rng);
        assert_eq!(next.agents.len(), 2);
        assert!(next.agents.iter().all(|a| a.id != 1));
    }

    #[test]
    fn test_untrusted_snapshot_is_normalized() {
        let sim = ProgressSimulator::new();
        let mut rng = StdRng::seed_from_u64(3);
        let mut snapshot = sim.start(AnalysisKind::MarketAnalysis);
        snapshot.flow[0].status = StepStatus::Completed;
        snapshot.flow[1].data.completion = 250.0;
        snapshot.flow[2].data.completion = -5.0;
        snapshot.agents[1].progress = f64::NAN;

        let normalized = snapshot.normalized();
        assert_eq!(normalized.flow[0].status, StepStatus::Pending);
        assert_eq!(normalized.flow[1].status, StepStatus::Completed);
        assert_eq!(normalized.flow[2].data.completion, 0.0);
        assert_eq!(normalized.agents[1].progress, 0.0);

        let next = sim.advance(normalized, &mut rng);
        assert_status_invariant(&next);
    }

    #[test]
    fn test_step_status_wire_names() {
        let json = serde_json::to_string(&StepStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_step_data_omits_absent_lists() {
        let flow = catalog::flow_steps();
        let value = serde_json::to_value(&flow[3]).unwrap();
        let data = value["data"].as_object().unwrap();
        assert!(data.contains_key("range"));
        assert!(data.contains_key("confidence"));
        assert!(!data.contains_key("sources"));
        assert_eq!(data["completion"], 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_runs_to_completion() {
        let sim = ProgressSimulator::new();
        let mut rng = StdRng::seed_from_u64(11);
        let mut ticks = 0;

        let last = sim
            .drive(
                AnalysisKind::FundamentalAnalysis,
                Duration::from_millis(500),
                &mut rng,
                |snapshot| {
                    assert_status_invariant(snapshot);
                    ticks += 1;
                },
            )
            .await;

        assert!(last.is_complete());
        assert!(ticks > 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drive_with_zero_period() {
        let sim = ProgressSimulator::new();
        let mut rng = StdRng::seed_from_u64(12);
        let started = tokio::time::Instant::now();
        let mut ticks = 0_u32;

        let last = sim
            .drive(AnalysisKind::MarketAnalysis, Duration::ZERO, &mut rng, |_| ticks += 1)
            .await;

        assert!(last.is_complete());
        // Each advance waited at least one minimum tick.
        assert!(started.elapsed() >= MIN_TICK * (ticks - 1));
    }
}
