//! Machine learning helpers for training and inference.
//!
//! Both classifier families are implemented in-crate so fitted models stay
//! plain serde documents that load without any native runtime.

pub mod classifier;
pub mod logreg;
pub mod metrics;
pub mod tree;

pub use classifier::{Classifier, ClassifierKind, ClassifierOptions, ClassifierState};
