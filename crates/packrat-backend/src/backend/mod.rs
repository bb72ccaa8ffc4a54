pub mod check;
pub mod grammar;
pub mod lower;
pub mod reconcile;
pub mod registry;
pub mod shape;
pub mod target;
pub mod tokens;
