mod classify;
mod cli;
mod config;
mod filter;
mod fingers;
mod geometry;
mod hand;
mod logging;
mod matcher;
mod orientation;
mod pipeline;
mod stabilize;
#[cfg(test)]
mod testkit;

fn main() {
    logging::init();
    if let Err(e) = cli::run() {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}
