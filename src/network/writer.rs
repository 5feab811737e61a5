use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::PersistError;
use crate::network::network::Network;

/// Writes the network in its line-oriented text format:
///
/// ```text
/// def layer
/// neurons 2
/// end layer
///
/// def layer
/// neurons 1
/// neuron 0 bias 0.5
/// neuron 0 weights 0.25 -1.5
/// neuron 0 activation linear 2
/// end layer
/// ```
///
/// The input layer only records its size. Activation lines are written only
/// for non-sigmoid neurons. Numbers use Rust's shortest round-trip form, so
/// reading the text back gives bit-identical parameters.
impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, layer) in self.layers().iter().enumerate() {
            if index > 0 {
                writeln!(f)?;
            }
            writeln!(f, "def layer")?;
            writeln!(f, "neurons {}", layer.size())?;

            if index > 0 {
                for (i, neuron) in layer.neurons().iter().enumerate() {
                    writeln!(f, "neuron {} bias {}", i, neuron.bias())?;
                    write!(f, "neuron {} weights", i)?;
                    for w in neuron.weights() {
                        write!(f, " {}", w)?;
                    }
                    writeln!(f)?;
                    if !neuron.activation().is_default() {
                        writeln!(f, "neuron {} activation {}", i, neuron.activation())?;
                    }
                }
            }
            writeln!(f, "end layer")?;
        }
        Ok(())
    }
}

impl Network {
    /// Writes the text format to any byte sink.
    pub fn write_text<W: Write>(&self, mut writer: W) -> Result<(), PersistError> {
        write!(writer, "{}", self)?;
        writer.flush()?;
        Ok(())
    }

    /// Saves the text format to `path`, replacing any existing file.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistError> {
        let path = path.as_ref();
        let file = File::create(path)?;
        self.write_text(BufWriter::new(file))?;
        log::debug!("saved {:?} network to {}", self.topology(), path.display());
        Ok(())
    }
}
