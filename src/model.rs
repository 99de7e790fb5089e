use crate::{Error, Result};
use std::fmt;

/// Trip count used by the workers unless configured otherwise.
pub const DEFAULT_ITERATIONS: usize = 2_000_000;

/// Runner configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Number of loop iterations each worker performs. For the memory worker this is
    /// also the number of `i32` elements in its buffer.
    pub iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
        }
    }
}

impl Config {
    /// Create a configuration with the given trip count
    ///
    /// # Errors
    /// * when `iterations` doesn't fit in an `i32`, since the memory worker stores every
    ///   index as a signed 32-bit value
    pub fn with_iterations(iterations: usize) -> Result<Self> {
        if iterations > i32::MAX as usize {
            return Err(Error::InvalidIterations(iterations));
        }
        Ok(Self { iterations })
    }
}

/// The hardware resource a worker stresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Integer ALU
    Int,
    /// Floating-point unit
    Fp,
    /// Memory bandwidth and latency
    Mem,
}

impl Kind {
    /// All kinds, in the order workers are spawned and joined.
    pub const ALL: [Kind; 3] = [Kind::Int, Kind::Fp, Kind::Mem];

    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Fp => "fp",
            Kind::Mem => "mem",
        }
    }

    pub fn thread_name(&self) -> String {
        format!("{}-worker", self.as_str())
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value reported by a finished worker.
///
/// The `Display` form is the completion line the worker prints, e.g. `int done 239991808`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    Int(i64),
    Fp(f64),
    Mem(i64),
}

impl Outcome {
    pub fn kind(&self) -> Kind {
        match self {
            Outcome::Int(_) => Kind::Int,
            Outcome::Fp(_) => Kind::Fp,
            Outcome::Mem(_) => Kind::Mem,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Int(s) => write!(f, "int done {}", s),
            Outcome::Fp(x) => write!(f, "fp done {:.6}", x),
            Outcome::Mem(s) => write!(f, "mem done {}", s),
        }
    }
}

/// Values of all three workers, available once every worker has been joined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub int: i64,
    pub fp: f64,
    pub mem: i64,
}
