pub mod rules;

pub use rules::{classify, heuristic, ClassifiableTransaction, Decision};
