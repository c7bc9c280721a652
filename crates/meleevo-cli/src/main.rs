mod command;
mod episode;
mod schema;
mod train;
mod util;

fn main() -> anyhow::Result<()> {
    env_logger::init();
    command::run()
}
