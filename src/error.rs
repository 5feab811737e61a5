use std::io;

/// Contract violations detected while building or driving a `Network`.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum NetworkError {
    #[display("a network needs an input layer and at least one more layer, got {layers}")]
    TooFewLayers { layers: usize },
    #[display("layer {layer} has no neurons")]
    EmptyLayer { layer: usize },
    #[display("expected parameters for {expected} layers, got {found}")]
    LayerCount { expected: usize, found: usize },
    #[display("layer {layer} expects {expected} neurons, got {found}")]
    NeuronCount {
        layer: usize,
        expected: usize,
        found: usize,
    },
    #[display("neuron {neuron} of layer {layer} needs {expected} weights, got {found}")]
    WeightCount {
        layer: usize,
        neuron: usize,
        expected: usize,
        found: usize,
    },
    #[display("input has {found} values but the input layer has {expected} neurons")]
    InputSize { expected: usize, found: usize },
    #[display("expected output has {found} values but the output layer has {expected} neurons")]
    OutputSize { expected: usize, found: usize },
    #[display("layer index {layer} is out of range")]
    LayerOutOfRange { layer: usize },
    #[display("neuron {neuron} is out of range for layer {layer}")]
    NeuronOutOfRange { layer: usize, neuron: usize },
    #[display("the input layer has no weights or activation")]
    InputLayerParameters,
    #[display("expected {expected} parameters, got {found}")]
    ParameterCount { expected: usize, found: usize },
    #[display("batch size must be at least 1")]
    ZeroBatchSize,
    #[display("parents have different topologies: {left:?} vs {right:?}")]
    TopologyMismatch { left: Vec<usize>, right: Vec<usize> },
}

/// What went wrong on a line of a network text file.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum ParseErrorKind {
    #[display("unknown command '{command}'")]
    UnknownCommand { command: String },
    #[display("invalid definition, expected 'def layer'")]
    InvalidDefinition,
    #[display("invalid close, expected 'end layer'")]
    InvalidClose,
    #[display("new layer defined before the previous one was closed")]
    NestedLayer,
    #[display("'{command}' used outside of a layer definition")]
    OutsideLayer { command: String },
    #[display("neuron count already set for this layer")]
    DuplicateNeuronCount,
    #[display("'neuron' line before the layer's 'neurons' line")]
    NeuronBeforeCount,
    #[display("layer closed without a 'neurons' line")]
    MissingNeuronCount,
    #[display("layer must have at least one neuron")]
    EmptyLayer,
    #[display("neuron index {index} is out of range for a layer of {size}")]
    NeuronOutOfRange { index: usize, size: usize },
    #[display("the input layer cannot carry neuron parameters")]
    InputLayerParameters,
    #[display("expected {expected} weights, got {found}")]
    WeightCount { expected: usize, found: usize },
    #[display("weight index {index} is out of range for {size} weights")]
    WeightOutOfRange { index: usize, size: usize },
    #[display("neuron {neuron} has no weights")]
    MissingWeights { neuron: usize },
    #[display("malformed '{command}' line")]
    Malformed { command: String },
    #[display("invalid number '{token}'")]
    InvalidNumber { token: String },
    #[display("unknown activation '{name}'")]
    UnknownActivation { name: String },
    #[display("unknown neuron field '{field}'")]
    UnknownField { field: String },
    #[display("unfinished layer definition")]
    UnclosedLayer,
    #[display("no layers defined")]
    Empty,
}

/// A grammar violation in a network text file, tagged with its 1-based line.
#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
#[display("line {line}: {kind}")]
pub struct ParseError {
    pub line: usize,
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(line: usize, kind: ParseErrorKind) -> Self {
        ParseError { line, kind }
    }
}

/// Failure while saving or loading a network.
#[derive(Debug, derive_more::Display, derive_more::Error, derive_more::From)]
pub enum PersistError {
    #[display("i/o error: {_0}")]
    Io(io::Error),
    #[display("parse error: {_0}")]
    Parse(ParseError),
    #[display("json error: {_0}")]
    Json(serde_json::Error),
    #[display("invalid network: {_0}")]
    Network(NetworkError),
}

/// Invalid genetic trainer setup or a failure inside a generation.
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum GeneticError {
    #[display("population size must be at least 1")]
    EmptyPopulation,
    #[display("top-k must be between 1 and the population size {population}, got {top_k}")]
    InvalidTopK { top_k: usize, population: usize },
    #[display("mutation rate must be within [0, 1], got {rate}")]
    InvalidMutationRate { rate: f64 },
    #[display("mutation magnitude must be finite and non-negative, got {magnitude}")]
    InvalidMutationMagnitude { magnitude: f64 },
    #[display("at least one generation must be run")]
    NoGenerations,
    #[display("{_0}")]
    Network(NetworkError),
}

impl From<NetworkError> for GeneticError {
    fn from(err: NetworkError) -> Self {
        GeneticError::Network(err)
    }
}
