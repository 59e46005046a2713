mod actions;
mod cli;
mod config;
mod feedback;
mod input;
mod ipc;
mod logging;
mod replay;
mod screen;
mod tracker;

fn main() -> anyhow::Result<()> {
    logging::init();
    cli::run()
}
