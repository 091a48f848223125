//! Doctor command - check environment

use anyhow::Result;
use console::style;

use crate::config::{HarvestConfig, UserConfig, TOKEN_ENV};
use crate::external::is_tool_installed;

pub fn run(config: &HarvestConfig) -> Result<()> {
    println!("{}\n", style("ck-harvest doctor").bold());
    let mut failed = 0;

    let mut check = |ok: bool, label: &str, hint: &str| {
        if ok {
            println!("{} {}", style("✓").green(), label);
        } else {
            failed += 1;
            println!("{} {}", style("✗").red(), label);
            println!("  {}", hint);
        }
    };

    let java = &config.extraction.java;
    check(
        is_tool_installed(java, "-version"),
        &format!("Java: {}", java),
        "Install a JDK/JRE (11+) and make sure `java` is on PATH",
    );
    check(
        is_tool_installed("git", "--version"),
        "git",
        "Install git; repositories are fetched with `git clone`",
    );
    let jar = &config.extraction.jar;
    check(
        jar.is_file(),
        &format!("CK jar: {}", jar.display()),
        "git clone https://github.com/mauricioaniche/ck.git && cd ck && mvn clean package",
    );
    let has_token = UserConfig::load().map(|c| c.has_token()).unwrap_or(false);
    check(
        has_token,
        &format!("{} (needed by `discover` only)", TOKEN_ENV),
        "Set it in the environment or a .env file",
    );

    if failed == 0 {
        println!("\n{} All checks passed!", style("✓").green().bold());
        Ok(())
    } else {
        anyhow::bail!("{} check(s) failed", failed)
    }
}
