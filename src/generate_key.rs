// generate_key.rs
// Utility to generate a session signing secret

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Secret length in raw bytes before encoding; comfortably above the
/// 32-byte minimum enforced at configuration load.
const SECRET_BYTES: usize = 48;

fn main() {
    println!("Generating new session signing secret...\n");

    let mut bytes = [0u8; SECRET_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let secret = URL_SAFE_NO_PAD.encode(bytes);

    println!("Secret generated successfully!\n");
    println!("Add this to your .env file:");
    println!("─────────────────────────────────────────────────");
    println!("SESSION_SECRET={}", secret);
    println!("─────────────────────────────────────────────────");
    println!("\nIMPORTANT:");
    println!("  • Keep this secret secure and never commit it to version control");
    println!("  • Rotating the secret invalidates every outstanding session token");
}
