use clap::CommandFactory;
use clap_mangen::Man;
use std::{env, fs, io, path::Path};

#[path = "src/cli.rs"]
#[expect(
    dead_code,
    reason = "build script only renders the command definitions"
)]
mod cli;

const MAN_DIR: &str = "target/generated-man";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=src/cli.rs");
    for var in ["CARGO_PKG_VERSION", "CARGO_PKG_NAME", "CARGO_PKG_DESCRIPTION"] {
        println!("cargo:rerun-if-env-changed={var}");
    }

    let out_dir = Path::new(MAN_DIR);
    reset_dir(out_dir)?;

    let cmd = cli::Cli::command();
    let pkg = env::var("CARGO_PKG_NAME").unwrap_or_else(|_| cmd.get_name().to_owned());
    if cmd.get_name() != pkg {
        return Err(format!(
            "command is named `{}` but the package is `{pkg}`; man pages would not match the binary",
            cmd.get_name()
        )
        .into());
    }

    // One page for the tool, one per subcommand (`wirespec-build.1` etc.).
    render(out_dir, &pkg, cmd.clone())?;
    for sub in cmd.get_subcommands() {
        let page = format!("{pkg}-{}", sub.get_name());
        render(out_dir, &page, sub.clone())?;
    }
    Ok(())
}

fn reset_dir(dir: &Path) -> io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

fn render(dir: &Path, page: &str, cmd: clap::Command) -> io::Result<()> {
    let mut buf = Vec::new();
    Man::new(cmd).render(&mut buf)?;
    fs::write(dir.join(format!("{page}.1")), buf)
}
