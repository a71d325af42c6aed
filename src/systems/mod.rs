mod buoyancy;
mod collision;
mod coupling;
mod physics;
mod player;
mod trigger;

pub use buoyancy::{bob_force, buoyant_force, set_submerged, BuoyancyTracker};
pub use collision::{collision_system, CollisionEvent};
pub use coupling::{CollisionCoupler, ContactPhase, Splash};
pub use physics::{physics_step, FIXED_DT, GRAVITY};
pub use player::{grounded_system, player_movement_system};
pub use trigger::TriggerVolume;
