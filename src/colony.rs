//! The colony: orchestrates many agents over many iterations, maintaining
//! the shared pheromone field and the running best tour.

use crate::agent::Agent;
use crate::error::PlannerError;
use crate::itinerary::Itinerary;
use crate::matrix::PheromoneField;
use crate::resolver::{sample_times, InputResolver};
use crate::tour::TourResult;
use crate::trip::Trip;
use rayon::prelude::*;

/// Tunable knobs for a planning run. `agents` and `boost`, when left at
/// `None`, are derived from the trip itself, mirroring how the teacher's
/// `ACOConfig` ships sensible numeric defaults rather than forcing every
/// caller to hand-tune them.
#[derive(Debug, Clone)]
pub struct ColonyConfig {
    pub iterations: usize,
    pub agents: Option<usize>,
    pub boost: Option<f64>,
    pub seed: Option<u64>,
}

impl Default for ColonyConfig {
    fn default() -> Self {
        ColonyConfig {
            iterations: 200,
            agents: None,
            boost: None,
            seed: None,
        }
    }
}

impl ColonyConfig {
    /// Fill in the agent-count and boost defaults for a specific trip:
    /// `agents = ceil(5 * sqrt(n))`, `boost = mean(priority)`.
    pub fn for_trip(trip: &Trip) -> Self {
        let mut config = ColonyConfig::default();
        config.resolve_defaults(trip);
        config
    }

    fn resolve_defaults(&mut self, trip: &Trip) {
        if self.agents.is_none() {
            let n = trip.len().max(1) as f64;
            self.agents = Some((5.0 * n.sqrt()).ceil() as usize);
        }
        if self.boost.is_none() {
            let boost = if trip.is_empty() {
                1.0
            } else {
                let total: f64 = trip.places.iter().map(|p| p.priority as f64).sum();
                (total / trip.len() as f64).max(0.1)
            };
            self.boost = Some(boost);
        }
    }

    fn agent_count(&self) -> usize {
        self.agents.unwrap_or(1)
    }

    fn boost_value(&self) -> f64 {
        self.boost.unwrap_or(1.0)
    }
}

/// Orchestrates the ant-colony search for a single trip.
pub struct Colony {
    config: ColonyConfig,
}

impl Colony {
    pub fn new(config: ColonyConfig) -> Self {
        Colony { config }
    }

    /// Run the full iterated search and return the best itinerary found.
    pub fn plan(&self, trip: &Trip, resolver: &dyn InputResolver) -> Result<Itinerary, PlannerError> {
        let mut config = self.config.clone();
        config.resolve_defaults(trip);

        let samples = sample_times(trip.trip_start, trip.trip_end);
        let (durations, distances) = resolver.resolve(&trip.places, &samples, trip.mode)?;

        let pheromones = PheromoneField::new(trip.len(), config.boost_value());
        let mut best: Option<TourResult> = None;
        let agent_count = config.agent_count();
        let evaporation_step = config.boost_value() / config.iterations.max(1) as f64;

        for iteration in 0..config.iterations {
            let results: Vec<TourResult> = (0..agent_count)
                .into_par_iter()
                .map(|i| {
                    let seed = config.seed.unwrap_or(0xA17C_0109) ^ ((iteration as u64) << 32) ^ i as u64;
                    Agent::new(trip, &durations, &distances, &pheromones, seed).find_food()
                })
                .collect();

            for result in &results {
                let is_better = match &best {
                    Some(current) => result.better_than(current),
                    None => !result.tour.path.is_empty(),
                };
                if is_better {
                    best = Some(result.clone());
                }
            }

            pheromones.evaporate(evaporation_step);

            if let Some(current_best) = &best {
                pheromones.intensify_along(&current_best.tour.path, config.boost_value());

                if current_best.tour.priority_sum > 0 {
                    for result in &results {
                        let numerator = (current_best.tour.priority_sum as f64 + result.tour.priority_sum as f64).powi(2);
                        let denominator = (2.0 * current_best.tour.priority_sum as f64).powi(2);
                        pheromones.intensify_along(&result.tour.path, config.boost_value() * numerator / denominator);
                    }
                }

                log::debug!(
                    "iteration {}: best priority={} length={} duration={}m",
                    iteration,
                    current_best.tour.priority_sum,
                    current_best.tour.tour_length(),
                    current_best.tour.total_duration.num_minutes()
                );
            }
        }

        let best = best.unwrap_or_else(TourResult::empty);
        log::info!(
            "plan finished: priority={} length={} duration={}m",
            best.tour.priority_sum,
            best.tour.tour_length(),
            best.tour.total_duration.num_minutes()
        );

        Ok(Itinerary::from_best(trip, best.tour))
    }
}
