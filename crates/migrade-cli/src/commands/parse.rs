use anyhow::Result;
use colored::Colorize;
use migrade_core::ScriptInfo;

pub fn cmd_parse(paths: Vec<String>) -> Result<()> {
    for path in paths {
        match ScriptInfo::parse(&path) {
            None => println!("{} {}", path.bright_white(), "unmatched".yellow()),
            Some(info) => {
                let kind = if info.is_create() {
                    "create".green()
                } else {
                    "update".cyan()
                };
                let range = match (info.src_version(), info.dst_version()) {
                    (Some(src), Some(dst)) => format!(" {} -> {}", src, dst),
                    _ => String::new(),
                };
                println!(
                    "{} {} {}{}",
                    path.bright_white(),
                    kind,
                    info.full_plugin().bright_magenta(),
                    range
                );
            }
        }
    }
    Ok(())
}
