pub mod adjustments;
pub mod selection;
