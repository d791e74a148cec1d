pub mod amortize;
pub mod simulation;
