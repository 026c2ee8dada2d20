//! Line-oriented text model format.
//!
//! ```text
//! # layers
//! <layer_count>
//! # activation
//! <name>
//! # weights
//! <rows> <cols>
//! <row0 values...>
//! ...
//! # biases
//! <count>
//! <values...>
//! ```
//!
//! The activation/weights/biases block repeats once per layer. Floats are
//! written with Rust's shortest round-trip formatting, so a load reproduces
//! the saved parameters bit for bit.

use crate::{ActivationRegistry, Layer, Network, NnError};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

const LAYERS: &str = "# layers";
const ACTIVATION: &str = "# activation";
const WEIGHTS: &str = "# weights";
const BIASES: &str = "# biases";

impl Network {
    /// # Errors
    ///
    /// Propagates I/O failures from `out`.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<(), NnError> {
        writeln!(out, "{LAYERS}")?;
        writeln!(out, "{}", self.len())?;
        for layer in self.layers() {
            writeln!(out, "{ACTIVATION}")?;
            writeln!(out, "{}", layer.activation().name())?;

            writeln!(out, "{WEIGHTS}")?;
            writeln!(out, "{} {}", layer.out_dim(), layer.in_dim())?;
            for row in layer.weights().data.chunks(layer.in_dim()) {
                write_values(&mut out, row)?;
            }

            writeln!(out, "{BIASES}")?;
            writeln!(out, "{}", layer.out_dim())?;
            write_values(&mut out, layer.biases().data())?;
        }
        out.flush()?;
        Ok(())
    }

    /// Parses a model written by [`Network::write_to`].
    ///
    /// # Errors
    ///
    /// [`NnError::Parse`] for malformed input, [`NnError::UnknownActivation`]
    /// for names missing from `registry`, and the usual layer/chain errors.
    pub fn read_from<R: BufRead>(input: R, registry: &ActivationRegistry) -> Result<Self, NnError> {
        let mut lines = Lines::new(input);
        lines.expect_header(LAYERS)?;
        let layer_count: usize = lines.scalar()?;

        let mut net = Network::new();
        for _ in 0..layer_count {
            lines.expect_header(ACTIVATION)?;
            let (_, name) = lines.next_line()?;
            let activation = registry.get(name.trim())?;

            lines.expect_header(WEIGHTS)?;
            let (line, dims) = lines.next_line()?;
            let dims: Vec<usize> = parse_values(line, &dims)?;
            let [rows, cols] = dims[..] else {
                return Err(NnError::Parse {
                    line,
                    message: format!("expected `<rows> <cols>`, found {} values", dims.len()),
                });
            };
            if rows == 0 || cols == 0 {
                return Err(NnError::InvalidDimensions { in_dim: cols, out_dim: rows });
            }
            if rows.checked_mul(cols).is_none() {
                return Err(NnError::Parse {
                    line,
                    message: format!("weight matrix {rows} x {cols} is too large"),
                });
            }
            let mut weights = Vec::new();
            for _ in 0..rows {
                weights.extend(lines.row(cols)?);
            }

            lines.expect_header(BIASES)?;
            let count: usize = lines.scalar()?;
            let biases = if count == 0 { Vec::new() } else { lines.row(count)? };

            net.push(Layer::new(weights, biases, cols, rows, activation)?)?;
        }
        Ok(net)
    }

    /// Writes the model to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Propagates I/O failures.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), NnError> {
        let file = File::create(path)?;
        self.write_to(BufWriter::new(file))
    }

    /// # Errors
    ///
    /// See [`Network::read_from`].
    pub fn load(path: impl AsRef<Path>, registry: &ActivationRegistry) -> Result<Self, NnError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file), registry)
    }
}

fn write_values<W: Write>(out: &mut W, values: &[f32]) -> std::io::Result<()> {
    let mut first = true;
    for v in values {
        if !first {
            write!(out, " ")?;
        }
        write!(out, "{v}")?;
        first = false;
    }
    writeln!(out)
}

fn parse_values<T: FromStr>(line: usize, text: &str) -> Result<Vec<T>, NnError> {
    text.split_whitespace()
        .map(|token| {
            token.parse().map_err(|_| NnError::Parse {
                line,
                message: format!("invalid number `{token}`"),
            })
        })
        .collect()
}

/// Non-blank lines with 1-based line numbers.
struct Lines<R> {
    inner: std::io::Lines<R>,
    line: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(input: R) -> Self {
        Self { inner: input.lines(), line: 0 }
    }

    fn next_line(&mut self) -> Result<(usize, String), NnError> {
        for text in self.inner.by_ref() {
            self.line += 1;
            let text = text?;
            if !text.trim().is_empty() {
                return Ok((self.line, text));
            }
        }
        Err(NnError::Parse {
            line: self.line + 1,
            message: "unexpected end of file".into(),
        })
    }

    fn expect_header(&mut self, header: &str) -> Result<(), NnError> {
        let (line, text) = self.next_line()?;
        if text.trim() == header {
            Ok(())
        } else {
            Err(NnError::Parse {
                line,
                message: format!("expected `{header}`, found `{}`", text.trim()),
            })
        }
    }

    fn scalar<T: FromStr>(&mut self) -> Result<T, NnError> {
        let (line, text) = self.next_line()?;
        text.trim().parse().map_err(|_| NnError::Parse {
            line,
            message: format!("expected a single count, found `{}`", text.trim()),
        })
    }

    fn row(&mut self, expected: usize) -> Result<Vec<f32>, NnError> {
        let (line, text) = self.next_line()?;
        let values: Vec<f32> = parse_values(line, &text)?;
        if values.len() != expected {
            return Err(NnError::Parse {
                line,
                message: format!("expected {expected} values, found {}", values.len()),
            });
        }
        Ok(values)
    }
}
