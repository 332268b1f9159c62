use cellar::{Cellar, CellarError, Params};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    // Issuer and verifier only need to share the secret.
    let cellar = Cellar::builder("new-secret")
        .with_lifetime(900)
        .with_old_secrets(["older-secret"])
        .build();

    // A confirmation link bound to the address it was sent to
    let params = Params::new().with("email", "someone@example.com");
    let token = cellar.generate_with(None, &params)?;
    println!("Generated token: {token}");

    match cellar.verify(&token, &params) {
        Ok(parsed) => println!("✅ Token accepted, expires at {}", parsed.expiry),
        Err(e) => println!("❌ Token rejected: {e}"),
    }

    // Same token presented for a different address
    let other = Params::new().with("email", "attacker@example.com");
    match cellar.verify(&token, &other) {
        Err(CellarError::InvalidSignature) => println!("✅ Correctly rejected foreign params"),
        other => println!("❌ Unexpected result: {other:?}"),
    }

    // Tokens from before the rotation are still honoured
    let legacy = Cellar::new("older-secret").generate()?;
    println!(
        "Legacy token valid after rotation: {}",
        cellar.is_valid(&legacy, &Params::new())
    );

    Ok(())
}
