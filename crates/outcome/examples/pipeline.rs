use nebula_outcome::prelude::*;
use nebula_outcome::recover;

fn parse_port(raw: &str) -> Outcome<u16> {
    raw.trim()
        .parse::<u16>()
        .map_err(OutcomeError::external)
        .into()
}

fn main() -> Result<(), ConfigError> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    recover::install(RecoveryConfig::new().with_backtrace(false))?;

    println!("Outcome pipeline example");

    // Declared failure flows straight to the fail handler
    let port = Outcome::<&str>::ok("80a")
        .and_then(parse_port)
        .accept(|p| println!("   parsed port {p}"))
        .fail(|e| println!("   rejected: {e}"));
    println!("   {port}");

    // Panicking step is captured and logged
    let checked = parse_port("8080")
        .then(|p| {
            assert!(*p < 1024, "port {p} is not privileged");
            None
        })
        .fail(|e| println!("   captured: {e}"));
    println!("   {checked}");

    println!("   fallback port: {}", checked.unwrap_or(443));
    Ok(())
}
