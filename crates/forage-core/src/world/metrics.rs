use super::Environment;
use serde::{Deserialize, Serialize};

/// Per-step sample of the environment state, for logging and analysis.
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StepMetrics {
    pub step: usize,
    pub reward_delta: f32,
    pub cumulative_reward: f32,
    pub nectar_obtained: f32,
    pub active_resources: usize,
    /// Beak-tip distance to the tracked flower, if one exists.
    pub nearest_distance: Option<f32>,
}

fn default_schema_version() -> u32 {
    1
}

/// Summary of one completed episode, serialized by the driver.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EpisodeSummary {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub episode: usize,
    pub seed: u64,
    pub steps: usize,
    pub total_reward: f32,
    pub nectar_obtained: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<StepMetrics>,
}

impl Environment {
    pub fn collect_step_metrics(&self, reward_delta: f32) -> StepMetrics {
        let nearest_distance = self.agent.nearest().map(|id| {
            self.area
                .get(id)
                .position()
                .distance(self.agent.beak_tip(&self.config))
        });
        StepMetrics {
            step: self.step_index,
            reward_delta,
            cumulative_reward: self.cumulative_reward,
            nectar_obtained: self.agent.nectar_obtained(),
            active_resources: self.area.active_count(),
            nearest_distance,
        }
    }

    pub fn collect_episode_summary(&self, samples: Vec<StepMetrics>) -> EpisodeSummary {
        EpisodeSummary {
            schema_version: 1,
            episode: self.episode_index,
            seed: self.config.seed,
            steps: self.step_index,
            total_reward: self.cumulative_reward,
            nectar_obtained: self.agent.nectar_obtained(),
            samples,
        }
    }
}
