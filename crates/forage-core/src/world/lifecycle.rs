use super::{
    Actuation, ContactEvent, ContactTag, Environment, Observation, PhysicsFrame, ResetError,
    StepError, StepOutcome,
};
use crate::agent::ACTION_LEN;
use crate::math::clamp01;
use crate::spawn;
use rand::Rng;

impl Environment {
    /// Begin a new episode: refill and re-tilt every flower, find a
    /// collision-free spawn pose, and return the first observation.
    ///
    /// In training mode the agent starts in front of a flower half the
    /// time so feeding is discovered early; outside training it always
    /// does, which is friendlier for a human pilot.
    pub fn reset(&mut self) -> Result<Observation, ResetError> {
        self.area.reset_all(&mut self.rng);

        let in_front = if self.config.training {
            self.rng.random_bool(0.5)
        } else {
            true
        };
        let pose = spawn::place(
            &self.area,
            self.obstacles.as_ref(),
            &mut self.rng,
            &self.config,
            in_front,
        )?;

        self.agent.begin_episode(pose);
        self.agent.update_nearest(&self.area, &self.config);
        self.step_index = 0;
        self.cumulative_reward = 0.0;
        self.episode_index += 1;
        Ok(self.agent.observe(&self.area, &self.config))
    }

    /// First half of a step: decode the action into motion intent for the
    /// external physics. The orientation returned here is already the
    /// post-integration kinematic orientation for this step.
    pub fn apply_action(&mut self, action: &[f32; ACTION_LEN]) -> Actuation {
        let force = self.agent.apply_action(action, &self.config);
        Actuation {
            force,
            orientation: self.agent.orientation(),
            frozen: self.agent.frozen,
        }
    }

    /// Second half of a step, called after the external physics has
    /// integrated. Mirrors the agent's rigid-body state, resolves queued
    /// contacts exactly once, refreshes nearest-flower tracking, and
    /// produces the step outcome.
    pub fn complete_step(&mut self, frame: &PhysicsFrame) -> Result<StepOutcome, StepError> {
        self.agent.position = frame.position;
        self.agent.velocity = frame.velocity;

        let mut reward_delta = 0.0f32;
        for contact in &frame.contacts {
            match contact.tag {
                ContactTag::Nectar => {
                    reward_delta += self.handle_nectar_contact(contact)?;
                }
                ContactTag::Boundary => {
                    if self.config.training {
                        reward_delta += self.config.boundary_penalty;
                    }
                }
            }
        }

        // Safety net for externally caused depletion: the tracked flower
        // may have emptied without any contact of ours.
        self.agent.update_nearest(&self.area, &self.config);

        self.step_index += 1;
        self.cumulative_reward += reward_delta;
        let done = self.config.training && self.step_index >= self.config.max_episode_steps;

        Ok(StepOutcome {
            observation: self.agent.observe(&self.area, &self.config),
            reward_delta,
            done,
        })
    }

    /// Resolve one nectar contact. Contacts that are not actually at the
    /// beak tip are ignored; unregistered contact ids are fatal.
    fn handle_nectar_contact(&mut self, contact: &ContactEvent) -> Result<f32, StepError> {
        let beak = self.agent.beak_tip(&self.config);
        if contact.closest_point.distance(beak) > self.config.beak_contact_radius {
            return Ok(0.0);
        }

        let id = self
            .area
            .lookup(contact.contact_id)
            .map_err(|_| StepError::UnknownContact {
                contact_id: contact.contact_id,
            })?;

        let received = self.area.feed(id, self.config.feed_quantum);
        self.agent.add_nectar(received);

        // Every accepted contact pays in training mode, even on a flower
        // that is already drained; the payout does not depend on `received`.
        let mut reward = 0.0;
        if self.config.training {
            let alignment = clamp01(self.agent.forward().dot(-self.area.get(id).up()));
            reward = self.config.base_feed_reward + self.config.aligned_feed_bonus * alignment;
        }

        if !self.area.get(id).has_nectar() {
            self.agent.update_nearest(&self.area, &self.config);
        }
        Ok(reward)
    }
}
