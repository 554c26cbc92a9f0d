use std::os::unix::process::CommandExt;

use color_eyre::eyre::Result;

use crate::config::runtime_dir;
use crate::logging::latest_log_file;

pub fn run(lines: usize, follow: bool) -> Result<()> {
    let Some(path) = latest_log_file() else {
        println!("No log files found in {:?}", runtime_dir());
        println!("Log files are written by the background daemon.");
        return Ok(());
    };

    let mut tail = std::process::Command::new("tail");
    tail.args(["-n", &lines.to_string()]);

    if follow {
        let err = tail.arg("-f").arg(&path).exec();
        return Err(err.into());
    }

    tail.arg(&path).status()?;
    Ok(())
}
