//! Change-tracking bisimulation and pushdown supervisor synthesis for
//! discrete-event systems.
//!
//! `automaton` and `grammar` hold the data model; `bisim` is the
//! strong/delayed/weak partition-refinement engine; `topo` supports it by
//! forbidding silent-event cycles; `pushdown`, `lr1`, and `synth` together
//! implement the pushdown supervisor-synthesis pipeline, from DPDA
//! normalisation through LR(1) parser construction and back down to a
//! controller automaton.

pub mod automaton;
pub mod bisim;
pub mod cancel;
pub mod error;
pub mod grammar;
pub mod lr1;
pub mod pushdown;
pub mod synth;
pub mod topo;
