//! Ant-Colony Trip Planner
//!
//! A time-constrained tourist itinerary planner built around an ant-colony
//! metaheuristic: a swarm of agents cooperatively construct feasible,
//! time-respecting tours through a set of candidate places, sharing learning
//! through a pheromone field that the colony evaporates and reinforces each
//! iteration.
//!
//! # Example
//!
//! ```no_run
//! use aco_trip_planner::colony::{Colony, ColonyConfig};
//! use aco_trip_planner::resolver::HaversineResolver;
//! use aco_trip_planner::trip::{Trip, TravelMode};
//!
//! # fn example(trip: Trip) -> Result<(), aco_trip_planner::error::PlannerError> {
//! let resolver = HaversineResolver { coordinates: vec![(40.0, -73.0), (40.01, -73.01)] };
//! let colony = Colony::new(ColonyConfig::for_trip(&trip));
//! let itinerary = colony.plan(&trip, &resolver)?;
//! println!("{}", itinerary.schedule);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod colony;
pub mod error;
pub mod feasibility;
pub mod itinerary;
pub mod matrix;
pub mod place;
pub mod resolver;
pub mod tour;
pub mod trip;

pub use colony::{Colony, ColonyConfig};
pub use error::PlannerError;
pub use itinerary::Itinerary;
pub use trip::Trip;
