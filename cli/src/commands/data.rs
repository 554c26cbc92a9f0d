use color_eyre::eyre::Result;
use ebox_protocol::ModuleData;

use super::connect;

pub fn run(key: Option<String>, json: bool) -> Result<()> {
    let mut client = connect()?;

    let data = match key {
        Some(key) => match client.get_module_data(&key)? {
            Some(data) => vec![data],
            None => {
                println!("No data for '{}'. The module may be disabled or not ticked yet.", key);
                return Ok(());
            }
        },
        None => client.get_all_data()?,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&data)?);
        return Ok(());
    }

    if data.is_empty() {
        println!("No module data yet.");
    }
    for module in &data {
        print!("{}", render(module));
    }
    Ok(())
}

fn render(module: &ModuleData) -> String {
    let width = module
        .points
        .iter()
        .map(|p| p.name.len())
        .max()
        .unwrap_or(0);

    let mut out = format!("[{}]\n", module.key);
    for point in &module.points {
        out.push_str(&format!("  {:<width$}  {}\n", point.name, point.value, width = width));
    }
    out
}
