use color_eyre::eyre::Result;

use super::{connect, format_timestamp};

pub fn run() -> Result<()> {
    let mut client = connect()?;

    match client.get_report()? {
        Some(report) => {
            println!("{}", report.title);
            println!("{}", "-".repeat(40));
            println!("{}", report.compact);
            println!();
            println!("{}", report.expanded);
            println!();
            println!("Updated: {}", format_timestamp(report.published_at));
        }
        None => println!("No report published yet."),
    }

    let keys = client.get_module_keys()?;
    if !keys.is_empty() {
        println!("Reporting: {}", keys.join(", "));
    }

    let alerts = client.get_alerts()?;
    if !alerts.is_empty() {
        println!();
        println!("Recent alerts");
        println!("{}", "-".repeat(40));
        for alert in alerts.iter().rev() {
            println!(
                "{}  [{}] {}",
                format_timestamp(alert.timestamp),
                alert.module_key,
                alert.message
            );
        }
    }

    Ok(())
}
