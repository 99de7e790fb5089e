use crate::workload;
use crate::{current_tid, Config, Error, Kind, Outcome, Report, Result};
use log::{debug, info, warn};
use std::io::Write;
use std::sync::{Mutex, MutexGuard};
use std::thread;

/// Line written once every worker has been joined.
pub const ALL_DONE: &str = "all done";

/// Runs the integer, floating-point and memory workers concurrently and reports completion.
pub struct WorkloadRunner {
    config: Config,
}

impl WorkloadRunner {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Start one thread per `Kind`, wait for all of them and write `all done`.
    ///
    /// Each worker writes its own completion line to `out` as soon as it finishes, so the
    /// first three lines come in completion order. Workers are joined in `Kind::ALL` order
    /// and every spawned worker is joined before this returns, whether or not one of them
    /// failed.
    ///
    /// # Return
    /// * `Report` holding the value computed by each worker
    ///
    /// # Errors
    /// * when a worker thread couldn't be spawned
    /// * when the memory worker couldn't allocate its buffer
    /// * when writing to `out` failed
    /// * when a worker panicked
    ///
    /// The first error in join order is returned and `all done` isn't written.
    pub fn run<W: Write + Send>(&self, out: W) -> Result<Report> {
        let out = Mutex::new(out);
        let n = self.config.iterations;

        let results = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(Kind::ALL.len());
            let mut spawn_err = None;
            for kind in Kind::ALL {
                let out = &out;
                let spawned = thread::Builder::new()
                    .name(kind.thread_name())
                    .spawn_scoped(scope, move || worker(kind, n, out));
                match spawned {
                    Ok(handle) => handles.push((kind, handle)),
                    Err(source) => {
                        spawn_err = Some(Error::Spawn { kind, source });
                        break;
                    }
                }
            }

            let mut results: Vec<Result<Outcome>> = handles
                .into_iter()
                .map(|(kind, handle)| {
                    handle
                        .join()
                        .unwrap_or(Err(Error::WorkerPanicked(kind)))
                })
                .collect();
            if let Some(err) = spawn_err {
                results.push(Err(err));
            }
            results
        });

        let mut int = None;
        let mut fp = None;
        let mut mem = None;
        for result in results {
            match result? {
                Outcome::Int(s) => int = Some(s),
                Outcome::Fp(x) => fp = Some(x),
                Outcome::Mem(s) => mem = Some(s),
            }
        }
        let report = match (int, fp, mem) {
            (Some(int), Some(fp), Some(mem)) => Report { int, fp, mem },
            _ => unreachable!("every kind is spawned unless spawning failed"),
        };
        info!("All {} workers finished", Kind::ALL.len());

        let mut out = lock(&out);
        writeln!(out, "{}", ALL_DONE)?;
        out.flush()?;
        Ok(report)
    }
}

fn worker<W: Write>(kind: Kind, n: usize, out: &Mutex<W>) -> Result<Outcome> {
    debug!("Worker {} started: tid={}", kind, tid_str());
    let outcome = workload::run(kind, n)?;

    let mut out = lock(out);
    writeln!(out, "{}", outcome)?;
    out.flush()?;
    debug!("Worker {} finished: tid={}", kind, tid_str());
    Ok(outcome)
}

fn lock<W>(out: &Mutex<W>) -> MutexGuard<'_, W> {
    out.lock().unwrap_or_else(|poisoned| {
        warn!("Recovering output lock poisoned by a panicked worker");
        poisoned.into_inner()
    })
}

fn tid_str() -> String {
    current_tid().map_or_else(|| "-".to_string(), |tid| tid.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload::{fp_intensive, int_intensive, mem_intensive};
    use std::io;

    const N: usize = 10_000;

    fn run_to_string(n: usize) -> (Result<Report>, String) {
        let runner = WorkloadRunner::new(Config::with_iterations(n).unwrap());
        let mut out: Vec<u8> = Vec::new();
        let res = runner.run(&mut out);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_run_report() {
        let (res, _) = run_to_string(N);
        let report = res.unwrap();
        assert_eq!(int_intensive(N), report.int);
        assert_eq!(mem_intensive(N).unwrap(), report.mem);
        assert!((fp_intensive(N) - report.fp).abs() <= report.fp.abs() * 1e-12);
    }

    #[test]
    fn test_run_output_lines() {
        for _ in 0..50 {
            let (res, out) = run_to_string(N);
            let report = res.unwrap();

            let lines: Vec<_> = out.lines().collect();
            assert_eq!(4, lines.len(), "output: {:?}", out);
            assert_eq!(ALL_DONE, lines[3]);

            let mut workers = lines[..3].to_vec();
            workers.sort();
            assert_eq!(
                vec![
                    format!("fp done {:.6}", report.fp),
                    format!("int done {}", report.int),
                    format!("mem done {}", report.mem),
                ],
                workers
            );
        }
    }

    #[test]
    fn test_run_zero_iterations() {
        let (res, out) = run_to_string(0);
        assert_eq!(
            Report {
                int: 0,
                fp: 1.0,
                mem: 0
            },
            res.unwrap()
        );
        assert!(out.ends_with("all done\n"));
        assert!(out.contains("fp done 1.000000\n"));
    }

    #[test]
    fn test_config() {
        let runner = WorkloadRunner::new(Config::default());
        assert_eq!(2_000_000, runner.config().iterations);
    }

    struct BrokenWriter;

    impl Write for BrokenWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_output_error() {
        let runner = WorkloadRunner::new(Config::with_iterations(N).unwrap());
        match runner.run(BrokenWriter) {
            Err(Error::Output(e)) => assert_eq!(io::ErrorKind::BrokenPipe, e.kind()),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    /// Rejects the memory worker's line and records everything else.
    struct RejectMemWriter(Vec<u8>);

    impl Write for RejectMemWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if buf.starts_with(b"mem") {
                return Err(io::Error::new(io::ErrorKind::Other, "rejected"));
            }
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_failed_worker_skips_all_done() {
        let runner = WorkloadRunner::new(Config::with_iterations(N).unwrap());
        let mut out = RejectMemWriter(Vec::new());
        assert!(matches!(runner.run(&mut out), Err(Error::Output(_))));

        let out = String::from_utf8(out.0).unwrap();
        assert_eq!(2, out.lines().count(), "output: {:?}", out);
        assert!(out.contains("int done "));
        assert!(out.contains("fp done "));
        assert!(!out.contains(ALL_DONE));
    }

    struct PanicWriter;

    impl Write for PanicWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            panic!("writer exploded");
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_run_worker_panic() {
        let runner = WorkloadRunner::new(Config::with_iterations(N).unwrap());
        match runner.run(PanicWriter) {
            Err(Error::WorkerPanicked(kind)) => assert_eq!(Kind::Int, kind),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
