// PlayLens - app/mod.rs
//
// Application layer: wires input, the core state machine, and output
// channels together for one run.

pub mod run;
