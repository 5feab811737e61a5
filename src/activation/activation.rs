use serde::{Serialize, Deserialize};
use std::f64::consts::E;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivationFunction {
    /// Default activation of every non-input neuron.
    #[default]
    Sigmoid,
    Linear { slope: f64 },
    Identity,
}

impl ActivationFunction {
    /// Element-wise activation.
    pub fn compute(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => 1.0 / (1.0 + E.powf(-x)),
            ActivationFunction::Linear { slope } => slope * x,
            ActivationFunction::Identity => x,
        }
    }

    /// Derivative of the activation at the pre-activation value `x`.
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            ActivationFunction::Sigmoid => {
                let fx = self.compute(x);
                fx * (1.0 - fx)
            }
            ActivationFunction::Linear { slope } => *slope,
            ActivationFunction::Identity => 1.0,
        }
    }

    /// Name written after `activation` in the network text format.
    pub fn identifier(&self) -> &'static str {
        match self {
            ActivationFunction::Sigmoid => "sigmoid",
            ActivationFunction::Linear { .. } => "linear",
            ActivationFunction::Identity => "identity",
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, ActivationFunction::Sigmoid)
    }

    /// Rebuilds an activation from the tokens following `activation`,
    /// e.g. `["linear", "0.5"]`. Returns `None` for unknown names or a
    /// missing/invalid parameter.
    pub fn from_tokens(tokens: &[&str]) -> Option<ActivationFunction> {
        let (name, params) = tokens.split_first()?;
        match (name.to_ascii_lowercase().as_str(), params) {
            ("sigmoid", []) => Some(ActivationFunction::Sigmoid),
            ("identity", []) => Some(ActivationFunction::Identity),
            ("linear", [slope]) => slope
                .parse::<f64>()
                .ok()
                .map(|slope| ActivationFunction::Linear { slope }),
            _ => None,
        }
    }
}

/// Formats the activation as it appears in the text format.
impl fmt::Display for ActivationFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActivationFunction::Linear { slope } => write!(f, "{} {}", self.identifier(), slope),
            _ => f.write_str(self.identifier()),
        }
    }
}
