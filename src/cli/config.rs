use anyhow::Result;

use crate::cli::context::CliContext;

pub fn cmd_config(ctx: &CliContext) -> Result<()> {
    match ctx.config_path() {
        Some(path) => println!("# source: {}", path.display()),
        None => println!("# source: built-in defaults"),
    }
    print!("{}", serde_yaml::to_string(ctx.config())?);
    Ok(())
}
