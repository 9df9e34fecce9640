mod command;
mod record;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
