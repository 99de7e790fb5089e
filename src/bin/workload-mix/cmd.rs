use std::io;
use std::process;
use workload_mix::WorkloadRunner;

#[derive(Default)]
pub struct Config {
    pub runner: workload_mix::Config,
}

pub fn workload_main(config: Config) {
    env_logger::init();

    let runner = WorkloadRunner::new(config.runner);
    if let Err(e) = runner.run(io::stdout()) {
        eprintln!("workload-mix: {}", e);
        process::exit(1);
    }
}
