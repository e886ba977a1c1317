//! Application layer for Points-to Analysis

pub mod analyzer;

pub use analyzer::PointsToAnalyzer;
