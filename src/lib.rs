//! Workspace stub crate. All functionality lives in `crates/*`.
