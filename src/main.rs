use anyhow::Result;

mod app;
mod logging;

fn main() -> Result<()> {
    let args = atomic_file::cli::parse();
    app::run(args)
}
