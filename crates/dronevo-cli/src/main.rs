mod command;
mod settings;
mod statistics;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
