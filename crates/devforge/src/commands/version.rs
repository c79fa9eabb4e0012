//! Version command

use anyhow::Result;
use serde::Serialize;

use crate::cli::VersionArgs;

#[derive(Debug, Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
    os: &'static str,
    arch: &'static str,
}

impl VersionInfo {
    fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            os: std::env::consts::OS,
            arch: std::env::consts::ARCH,
        }
    }

    fn display(&self) -> String {
        format!("{} {} ({}/{})", self.name, self.version, self.os, self.arch)
    }
}

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("{}", info.display());
    }

    Ok(())
}
