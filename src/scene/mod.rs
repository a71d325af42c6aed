pub mod pond;
pub mod prefabs;
