mod command;
mod load;
mod util;

fn main() -> anyhow::Result<()> {
    command::run()
}
