use std::io;

use anyhow::Result;
use tracing::info;

use arbiter_cli::Session;

fn main() -> Result<()> {
    // stdout carries the protocol; logs go to stderr
    tracing_subscriber::fmt().with_writer(io::stderr).init();
    info!(fen = arbiter_core::STARTING_FEN, "arbiter starting");

    let stdin = io::stdin();
    let mut session = Session::new(stdin.lock(), io::stdout().lock());
    session.run()?;
    Ok(())
}
