//! The three workload kernels.
//!
//! Every kernel is a single linear pass over `0..n`. Accumulators go through
//! `black_box` so the loops survive optimization.

use crate::{Error, Kind, Outcome, Result};
use log::debug;
use std::hint::black_box;

/// Multiplier of the floating-point recurrence.
pub const FP_GROWTH: f64 = 1.0000001;

/// Read stride (in elements) of the memory kernel's second pass.
pub const MEM_STRIDE: usize = 16;

/// Stress the integer ALU: accumulate `(i & 0xff) - (i & 0x0f)` for `i` in `0..n`.
pub fn int_intensive(n: usize) -> i64 {
    let mut s: i64 = 0;
    for i in 0..n as i64 {
        s = black_box(s + ((i & 0xff) - (i & 0x0f)));
    }
    s
}

/// Stress the FPU: iterate `x = x * FP_GROWTH + sin(i mod 10)` starting from `x = 1.0`.
pub fn fp_intensive(n: usize) -> f64 {
    let mut x: f64 = 1.0;
    for i in 0..n {
        x = black_box(x * FP_GROWTH + ((i % 10) as f64).sin());
    }
    x
}

/// Stress memory: fill a buffer of `n` `i32`s with their own index, then sum every
/// `MEM_STRIDE`th element.
///
/// The buffer is released before returning.
///
/// # Errors
/// * when `n` doesn't fit in an `i32`
/// * when the allocator refuses the buffer
pub fn mem_intensive(n: usize) -> Result<i64> {
    if n > i32::MAX as usize {
        return Err(Error::InvalidIterations(n));
    }

    let mut buf: Vec<i32> = Vec::new();
    buf.try_reserve_exact(n)
        .map_err(|source| Error::Alloc {
            elements: n,
            source,
        })?;
    debug!("Allocated {} bytes", n * std::mem::size_of::<i32>());

    for i in 0..n {
        buf.push(i as i32);
    }
    black_box(&buf);

    let s: i64 = buf
        .iter()
        .step_by(MEM_STRIDE)
        .map(|&v| black_box(v as i64))
        .sum();

    drop(buf);
    Ok(s)
}

/// Run the kernel for `kind` with `n` iterations.
pub fn run(kind: Kind, n: usize) -> Result<Outcome> {
    Ok(match kind {
        Kind::Int => Outcome::Int(int_intensive(n)),
        Kind::Fp => Outcome::Fp(fp_intensive(n)),
        Kind::Mem => Outcome::Mem(mem_intensive(n)?),
    })
}
