use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::activation::activation::ActivationFunction;
use crate::error::{ParseError, ParseErrorKind, PersistError};
use crate::network::network::Network;
use crate::network::spec::{LayerSpec, NetworkSpec, NeuronSpec};

/// A layer between its `def layer` and `end layer` lines.
struct OpenLayer {
    size: Option<usize>,
    neurons: Vec<PendingNeuron>,
}

#[derive(Default)]
struct PendingNeuron {
    bias: f64,
    weights: Option<Vec<f64>>,
    activation: ActivationFunction,
}

/// Line-by-line builder for the network text format.
///
/// Blank lines and lines starting with `#` are skipped. Any other line must
/// be a known command in a valid position; the first violation aborts the
/// read.
#[derive(Default)]
struct Parser {
    input_size: Option<usize>,
    layers: Vec<LayerSpec>,
    open: Option<OpenLayer>,
}

impl Parser {
    fn previous_size(&self) -> Option<usize> {
        match self.layers.last() {
            Some(layer) => Some(layer.neurons.len()),
            None => self.input_size,
        }
    }

    fn feed(&mut self, line: &str) -> Result<(), ParseErrorKind> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = tokens.split_first() else {
            return Ok(());
        };
        if command.starts_with('#') {
            return Ok(());
        }

        match command {
            "def" => self.define(args),
            "neurons" => self.set_size(args),
            "neuron" => self.set_neuron(args),
            "end" => self.close(args),
            _ => Err(ParseErrorKind::UnknownCommand { command: command.to_string() }),
        }
    }

    fn define(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        if args != ["layer"] {
            return Err(ParseErrorKind::InvalidDefinition);
        }
        if self.open.is_some() {
            return Err(ParseErrorKind::NestedLayer);
        }
        self.open = Some(OpenLayer { size: None, neurons: Vec::new() });
        Ok(())
    }

    fn set_size(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        let layer = self.open.as_mut()
            .ok_or_else(|| ParseErrorKind::OutsideLayer { command: "neurons".into() })?;
        if layer.size.is_some() {
            return Err(ParseErrorKind::DuplicateNeuronCount);
        }
        let [count] = args else {
            return Err(ParseErrorKind::Malformed { command: "neurons".into() });
        };
        let size: usize = parse_number(count)?;
        if size == 0 {
            return Err(ParseErrorKind::EmptyLayer);
        }
        layer.size = Some(size);
        layer.neurons = (0..size).map(|_| PendingNeuron::default()).collect();
        Ok(())
    }

    fn set_neuron(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        let fan_in = self.previous_size();
        let layer = self.open.as_mut()
            .ok_or_else(|| ParseErrorKind::OutsideLayer { command: "neuron".into() })?;
        let size = layer.size.ok_or(ParseErrorKind::NeuronBeforeCount)?;
        let fan_in = fan_in.ok_or(ParseErrorKind::InputLayerParameters)?;

        let [index, field, values @ ..] = args else {
            return Err(ParseErrorKind::Malformed { command: "neuron".into() });
        };
        let index: usize = parse_number(index)?;
        let neuron = layer.neurons.get_mut(index)
            .ok_or(ParseErrorKind::NeuronOutOfRange { index, size })?;

        match *field {
            "bias" => {
                let [bias] = values else {
                    return Err(ParseErrorKind::Malformed { command: "neuron bias".into() });
                };
                neuron.bias = parse_number(bias)?;
            }
            "weights" => {
                if values.len() != fan_in {
                    return Err(ParseErrorKind::WeightCount { expected: fan_in, found: values.len() });
                }
                let weights = values.iter()
                    .map(|token| parse_number(token))
                    .collect::<Result<Vec<f64>, _>>()?;
                neuron.weights = Some(weights);
            }
            "weight" => {
                let [weight_index, weight] = values else {
                    return Err(ParseErrorKind::Malformed { command: "neuron weight".into() });
                };
                let weight_index: usize = parse_number(weight_index)?;
                let weight: f64 = parse_number(weight)?;
                let weights = neuron.weights.get_or_insert_with(|| vec![0.0; fan_in]);
                let slot = weights.get_mut(weight_index)
                    .ok_or(ParseErrorKind::WeightOutOfRange { index: weight_index, size: fan_in })?;
                *slot = weight;
            }
            "activation" => {
                neuron.activation = ActivationFunction::from_tokens(values)
                    .ok_or_else(|| ParseErrorKind::UnknownActivation { name: values.join(" ") })?;
            }
            other => return Err(ParseErrorKind::UnknownField { field: other.to_string() }),
        }
        Ok(())
    }

    fn close(&mut self, args: &[&str]) -> Result<(), ParseErrorKind> {
        if args != ["layer"] {
            return Err(ParseErrorKind::InvalidClose);
        }
        let layer = self.open.take()
            .ok_or_else(|| ParseErrorKind::OutsideLayer { command: "end".into() })?;
        let size = layer.size.ok_or(ParseErrorKind::MissingNeuronCount)?;

        if self.previous_size().is_none() {
            self.input_size = Some(size);
            return Ok(());
        }

        let neurons = layer.neurons.into_iter().enumerate()
            .map(|(i, n)| {
                let weights = n.weights.ok_or(ParseErrorKind::MissingWeights { neuron: i })?;
                Ok(NeuronSpec { bias: n.bias, weights, activation: n.activation })
            })
            .collect::<Result<Vec<_>, ParseErrorKind>>()?;
        self.layers.push(LayerSpec { neurons });
        Ok(())
    }

    fn finish(self) -> Result<NetworkSpec, ParseErrorKind> {
        if self.open.is_some() {
            return Err(ParseErrorKind::UnclosedLayer);
        }
        let input_size = self.input_size.ok_or(ParseErrorKind::Empty)?;
        Ok(NetworkSpec { input_size, layers: self.layers })
    }
}

fn parse_number<T: FromStr>(token: &str) -> Result<T, ParseErrorKind> {
    token.parse()
        .map_err(|_| ParseErrorKind::InvalidNumber { token: token.to_string() })
}

/// Parses a whole network from its text format.
impl FromStr for Network {
    type Err = PersistError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Network::read_text(text.as_bytes())
    }
}

impl Network {
    /// Reads the text format from any buffered byte source.
    pub fn read_text<R: BufRead>(reader: R) -> Result<Network, PersistError> {
        let mut parser = Parser::default();
        let mut line_count = 0;
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            line_count = i + 1;
            parser.feed(&line).map_err(|kind| ParseError::new(line_count, kind))?;
        }
        let spec = parser.finish().map_err(|kind| ParseError::new(line_count, kind))?;
        Ok(Network::from_spec(spec)?)
    }

    /// Loads a network saved with [`Network::save`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Network, PersistError> {
        let path = path.as_ref();
        let network = Network::read_text(BufReader::new(File::open(path)?))?;
        log::debug!("loaded {:?} network from {}", network.topology(), path.display());
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NetworkError;
    use approx::assert_abs_diff_eq;
    use rand::{rngs::StdRng, SeedableRng};

    fn parse_err(text: &str) -> ParseError {
        match text.parse::<Network>() {
            Err(PersistError::Parse(err)) => err,
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    const SMALL: &str = "\
def layer
neurons 2
end layer

def layer
neurons 1
neuron 0 bias 0.5
neuron 0 weights 0.25 -1.5
end layer
";

    #[test]
    fn reads_a_small_network() {
        let net: Network = SMALL.parse().unwrap();
        assert_eq!(net.topology(), vec![2, 1]);
        let neuron = &net.layers()[1].neurons()[0];
        assert_eq!(neuron.bias(), 0.5);
        assert_eq!(neuron.weights(), &[0.25, -1.5]);
        assert_eq!(neuron.activation(), ActivationFunction::Sigmoid);
    }

    #[test]
    fn round_trip_reproduces_outputs() {
        let mut original = Network::with_rng(&[3, 5, 4, 2], &mut StdRng::seed_from_u64(42)).unwrap();
        original.set_activation(2, 1, ActivationFunction::Linear { slope: 0.3 }).unwrap();
        original.set_layer_activation(3, ActivationFunction::Identity).unwrap();
        let mut restored: Network = original.to_string().parse().unwrap();

        assert_eq!(restored.to_spec(), original.to_spec());
        for probe in [[0.0, 0.0, 0.0], [1.0, -1.0, 0.5], [10.0, 3.3, -7.0]] {
            let a = original.forward_pass(&probe).unwrap();
            let b = restored.forward_pass(&probe).unwrap();
            for (x, y) in a.iter().zip(&b) {
                assert_abs_diff_eq!(x, y, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn read_text_from_a_byte_stream() {
        let net = Network::read_text(SMALL.as_bytes()).unwrap();
        assert_eq!(net.topology(), vec![2, 1]);
    }

    #[test]
    fn parse_and_read_text_agree_on_errors() {
        let text = "def layer\nneurons 1\nend layer\n# note\ndef layer\nneurons 1\nneuron 0 weights 1 2\n";
        let from_parse = parse_err(text);
        match Network::read_text(text.as_bytes()) {
            Err(PersistError::Parse(err)) => assert_eq!(err, from_parse),
            other => panic!("expected a parse error, got {:?}", other),
        }
        assert_eq!(from_parse, ParseError::new(7, ParseErrorKind::WeightCount { expected: 1, found: 2 }));
    }

    #[test]
    fn comments_blank_lines_and_single_weights() {
        let text = "\
# a tiny network
def layer
  neurons 1
end layer

def layer
neurons 1
neuron 0 weight 0 4
neuron 0 activation Identity
end layer
";
        let mut net: Network = text.parse().unwrap();
        assert_eq!(net.layers()[1].neurons()[0].bias(), 0.0);
        assert_eq!(net.forward_pass(&[2.0]).unwrap(), vec![8.0]);
    }

    #[test]
    fn wrong_weight_count() {
        let err = parse_err("def layer\nneurons 2\nend layer\ndef layer\nneurons 1\nneuron 0 weights 1\nend layer\n");
        assert_eq!(err, ParseError::new(6, ParseErrorKind::WeightCount { expected: 2, found: 1 }));
    }

    #[test]
    fn neuron_before_neurons() {
        let err = parse_err("def layer\nneurons 1\nend layer\ndef layer\nneuron 0 bias 1\n");
        assert_eq!(err, ParseError::new(5, ParseErrorKind::NeuronBeforeCount));
    }

    #[test]
    fn neurons_set_twice() {
        let err = parse_err("def layer\nneurons 1\nneurons 2\n");
        assert_eq!(err, ParseError::new(3, ParseErrorKind::DuplicateNeuronCount));
    }

    #[test]
    fn missing_end_layer() {
        let err = parse_err("def layer\nneurons 1\nend layer\ndef layer\nneurons 1\nneuron 0 weights 1\n");
        assert_eq!(err, ParseError::new(6, ParseErrorKind::UnclosedLayer));

        let err = parse_err("def layer\nneurons 1\ndef layer\n");
        assert_eq!(err, ParseError::new(3, ParseErrorKind::NestedLayer));
    }

    #[test]
    fn unknown_commands_and_fields() {
        let err = parse_err("layer 3\n");
        assert_eq!(err.kind, ParseErrorKind::UnknownCommand { command: "layer".into() });

        let err = parse_err("def network\n");
        assert_eq!(err.kind, ParseErrorKind::InvalidDefinition);

        let err = parse_err("def layer\nneurons 1\nend net\n");
        assert_eq!(err.kind, ParseErrorKind::InvalidClose);

        let err = parse_err("def layer\nneurons 1\nend layer\ndef layer\nneurons 1\nneuron 0 colour red\n");
        assert_eq!(err.kind, ParseErrorKind::UnknownField { field: "colour".into() });

        let err = parse_err("def layer\nneurons 1\nend layer\ndef layer\nneurons 1\nneuron 0 activation relu\n");
        assert_eq!(err.kind, ParseErrorKind::UnknownActivation { name: "relu".into() });
    }

    #[test]
    fn malformed_layers() {
        assert_eq!(parse_err("").kind, ParseErrorKind::Empty);
        assert_eq!(parse_err("neurons 3\n").kind, ParseErrorKind::OutsideLayer { command: "neurons".into() });
        assert_eq!(parse_err("def layer\nend layer\n").kind, ParseErrorKind::MissingNeuronCount);
        assert_eq!(parse_err("def layer\nneurons 0\n").kind, ParseErrorKind::EmptyLayer);
        assert_eq!(
            parse_err("def layer\nneurons x\n").kind,
            ParseErrorKind::InvalidNumber { token: "x".into() }
        );
        assert_eq!(
            parse_err("def layer\nneurons 2\nneuron 0 bias 1\n").kind,
            ParseErrorKind::InputLayerParameters
        );
        assert_eq!(
            parse_err("def layer\nneurons 1\nend layer\ndef layer\nneurons 2\nneuron 0 weights 1\nend layer\n"),
            ParseError::new(7, ParseErrorKind::MissingWeights { neuron: 1 })
        );
        assert_eq!(
            parse_err("def layer\nneurons 1\nend layer\ndef layer\nneurons 2\nneuron 5 bias 1\n").kind,
            ParseErrorKind::NeuronOutOfRange { index: 5, size: 2 }
        );
    }

    #[test]
    fn input_layer_alone_is_not_a_network() {
        match "def layer\nneurons 3\nend layer\n".parse::<Network>() {
            Err(PersistError::Network(err)) => {
                assert_eq!(err, NetworkError::TooFewLayers { layers: 1 })
            }
            other => panic!("expected a network error, got {:?}", other),
        }
    }
}
