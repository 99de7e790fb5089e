use clap::Command;

mod cmd;

fn main() {
    Command::new("workload-mix")
        .about("Run integer, floating-point and memory bound workloads on concurrent threads")
        .version(env!("CARGO_PKG_VERSION"))
        .get_matches();

    cmd::workload_main(cmd::Config::default());
}
