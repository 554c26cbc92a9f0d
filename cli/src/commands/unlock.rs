use color_eyre::eyre::Result;

pub fn run() -> Result<()> {
    let total = super::connect()?.record_unlock()?;
    println!("Unlock recorded ({} this session).", total);
    Ok(())
}
