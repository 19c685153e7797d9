//! Audio Graph Contract
//!
//! The processing chain is out of scope beyond its wiring surface: opaque
//! node handles, two-ended pluggable components, and a graph that can
//! connect and disconnect node pairs.

/// Opaque handle to a node in the processing graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(u64);

impl NodeRef {
    /// Wrap a graph-assigned node identifier
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The underlying identifier
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A two-ended processing component (gain, pan, filter, analysis)
///
/// Node internals are external collaborators; the Device only wires
/// inputs to outputs.
pub trait AudioComponent: Send {
    /// The component's input node
    fn input(&self) -> NodeRef;

    /// The component's output node
    fn output(&self) -> NodeRef;
}

/// The shared processing graph the Device wires sources into
pub trait AudioGraph: Send {
    /// Connect `from`'s output to `to`'s input
    fn connect(&mut self, from: NodeRef, to: NodeRef);

    /// Break the connection between `from` and `to`
    fn disconnect(&mut self, from: NodeRef, to: NodeRef);

    /// The graph's final destination node
    fn destination(&self) -> NodeRef;

    /// Resume the graph if the host suspended it
    ///
    /// Hosts may refuse to start audio before a user gesture; sources call
    /// this before starting playback.
    fn resume_if_suspended(&mut self);
}
