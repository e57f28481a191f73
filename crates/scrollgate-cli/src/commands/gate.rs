use scrollgate_core::Config;

pub fn run(url: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let active = config.gate.matches(url);
    let json = serde_json::json!({ "url": url, "active": active });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
