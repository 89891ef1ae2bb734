use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::debug;
use qcrypt_core::{decrypt_payload, encrypt_payload, load_key, save_key, QuantumKey};

#[derive(Parser)]
#[command(
    name = "qcrypt",
    author,
    version,
    about = "Quantum-metaphor deterministic file encryption (experimental)"
)]
struct Cli {
    #[arg(long, global = true)]
    debug: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a key of LENGTH bytes and write its container to KEY_PATH.
    Genkey {
        #[arg(value_name = "LENGTH")]
        length: u64,
        #[arg(value_name = "KEY_PATH")]
        key_path: PathBuf,
    },
    /// Encrypt INPUT under the key at KEY_PATH, writing a sealed container.
    Encrypt {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        #[arg(value_name = "KEY_PATH")]
        key_path: PathBuf,
    },
    /// Decrypt a sealed container back to the original plaintext.
    Decrypt {
        #[arg(value_name = "INPUT")]
        input: PathBuf,
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
        #[arg(value_name = "KEY_PATH")]
        key_path: PathBuf,
    },
    /// Print metadata for a stored key.
    Info {
        #[arg(value_name = "KEY_PATH")]
        key_path: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);
    match cli.command {
        Commands::Genkey { length, key_path } => cmd_genkey(length, key_path),
        Commands::Encrypt {
            input,
            output,
            key_path,
        } => cmd_encrypt(input, output, key_path),
        Commands::Decrypt {
            input,
            output,
            key_path,
        } => cmd_decrypt(input, output, key_path),
        Commands::Info { key_path } => cmd_info(key_path),
    }
}

fn init_logging(debug: bool) {
    // --debug only raises the default filter; an explicit RUST_LOG wins.
    let default_filter = if debug { "debug" } else { "info" };
    let _ = env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .try_init();
}

fn cmd_genkey(length: u64, key_path: PathBuf) -> Result<()> {
    let key = QuantumKey::generate(length)?;
    save_key(&key_path, &key)
        .with_context(|| format!("writing key to {}", key_path.display()))?;
    println!(
        "Generated {}-byte key and wrote it to {}",
        key.key_length,
        key_path.display()
    );
    println!("Fingerprint: {}", hex::encode(key.fingerprint()));
    Ok(())
}

fn cmd_encrypt(input: PathBuf, output: PathBuf, key_path: PathBuf) -> Result<()> {
    let key = load_key(&key_path)
        .with_context(|| format!("loading key from {}", key_path.display()))?;
    let plaintext =
        fs::read(&input).with_context(|| format!("reading plaintext from {}", input.display()))?;
    debug!(
        "encrypt cmd input_len={} key_length={}",
        plaintext.len(),
        key.key_length
    );
    let container = encrypt_payload(&key, &plaintext)?;
    fs::write(&output, &container)
        .with_context(|| format!("writing ciphertext to {}", output.display()))?;
    println!(
        "Encrypted {} bytes -> {} bytes ({})",
        plaintext.len(),
        container.len(),
        output.display()
    );
    Ok(())
}

fn cmd_decrypt(input: PathBuf, output: PathBuf, key_path: PathBuf) -> Result<()> {
    let key = load_key(&key_path)
        .with_context(|| format!("loading key from {}", key_path.display()))?;
    let container =
        fs::read(&input).with_context(|| format!("reading ciphertext from {}", input.display()))?;
    let plaintext = decrypt_payload(&key, &container)?;
    fs::write(&output, &plaintext)
        .with_context(|| format!("writing plaintext to {}", output.display()))?;
    println!(
        "Recovered {} bytes and wrote them to {}",
        plaintext.len(),
        output.display()
    );
    Ok(())
}

fn cmd_info(key_path: PathBuf) -> Result<()> {
    let key = load_key(&key_path)
        .with_context(|| format!("loading key from {}", key_path.display()))?;
    println!("Key length:        {} bytes", key.key_length);
    println!("Entangled pairs:   {}", key.pair_count());
    println!(
        "Lattice basis:     {}x{}",
        key.lattice_dim(),
        key.lattice_dim()
    );
    println!("Measurement bases: {} bytes", key.measurement_bases.len());
    println!("Created at:        {} (unix seconds)", key.created_at);
    println!("Checksum[..16]:    {}", hex::encode(&key.checksum[..16]));
    println!("Fingerprint:       {}", hex::encode(key.fingerprint()));
    Ok(())
}
