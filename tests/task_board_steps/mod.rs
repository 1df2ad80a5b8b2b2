//! Step definitions for task board scenarios.
