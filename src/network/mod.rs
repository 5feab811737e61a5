pub mod network;
pub mod reader;
pub mod spec;
pub mod writer;

pub use network::Network;
pub use spec::{LayerSpec, NetworkSpec, NeuronSpec};
