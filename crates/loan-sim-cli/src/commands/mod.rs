pub mod limits;
pub mod simulation;
