pub mod conversions;
pub mod preprocessor;
pub mod reflection;
