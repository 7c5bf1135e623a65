//! Workspace test suite: IR core data structures and the AArch32
//! VFP translator, the latter checked by running its output on a
//! small IR interpreter.

#[cfg(test)]
mod frontend;
