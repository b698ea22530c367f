// src/main.rs

use anyhow::Result;

fn main() -> Result<()> {
    repomap::commands::run_cli()
}
