// Core domain: cursor model, reduction, call resolution, layout.

pub mod callgraph;
pub mod cursor;
pub mod geometry;
pub mod interaction;
pub mod language;
pub mod layout;
pub mod reducer;
pub mod scaler;
pub mod std_filter;
pub mod tree;
