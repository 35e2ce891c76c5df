#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

use anyhow::Result;
use vergen::EmitBuilder;

fn main() -> Result<()> {
    if EmitBuilder::builder().all_git().emit().is_err() {
        // Builds from a source tarball have no git metadata to describe.
        println!("cargo:rustc-env=VERGEN_GIT_DESCRIBE=unknown");
    }

    return Ok(());
}
