//! Pipeline driver tying the Python front end (`classgraph-python`,
//! components A-D) to the language-agnostic consistency checker
//! (`classgraph-core`, component E) and its report writers.

pub mod pipeline;
