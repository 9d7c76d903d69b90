//! Divert example: list or rewrite call diversion rules on a voice gateway
//!
//! # Usage
//!
//! List the rules of rule-set 2:
//! ```bash
//! cargo run --example divert -- --host 192.0.2.10 --user cisco --password cisco --secret class
//! ```
//!
//! Point rule 1 at a new destination:
//! ```bash
//! cargo run --example divert -- --host 192.0.2.10 --user cisco --password cisco --set 1 970203
//! ```
//!
//! Set `RUST_LOG=debug` to watch the session.

use std::env;
use std::time::Duration;

use vgdivert::{DeviceDescriptor, DiversionDriver, DriverOptions, HostKeyVerification, TransportKind};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut device = DeviceDescriptor::new(&args.host, &args.user, &args.password)
        .with_transport(args.transport);
    if let Some(port) = args.port {
        device = device.with_port(port);
    }
    if let Some(secret) = &args.secret {
        device = device.with_secret(secret);
    }

    let options = DriverOptions::default()
        .with_timeout(Duration::from_secs(args.timeout))
        .with_rule_set(&args.rule_set)
        .with_host_key_verification(HostKeyVerification::AcceptNew);
    let driver = DiversionDriver::new(options);

    println!(
        "Reading voice translation-rule {} from {}:{}...",
        args.rule_set,
        device.host,
        device.resolved_port()
    );
    let rules = driver.list_rules(&device).await?;

    println!("{}", "-".repeat(50));
    for rule in &rules {
        println!(
            "rule {:>3}  {:<20} -> {}",
            rule.id(),
            rule.source_pattern(),
            rule.destination_pattern()
        );
    }
    println!("{}", "-".repeat(50));

    let Some((rule_id, destination)) = &args.set else {
        return Ok(());
    };

    // Writes must resend the source exactly as the device holds it
    let Some(rule) = rules.iter().find(|r| r.id() == rule_id) else {
        eprintln!("Error: rule {} not found in rule-set {}", rule_id, args.rule_set);
        std::process::exit(1);
    };

    println!(
        "\nDiverting rule {} ({}) to {}...",
        rule.id(),
        rule.source_pattern(),
        destination
    );
    let output = driver
        .apply_rule_change(&device, rule.id(), rule.raw_source_pattern(), destination)
        .await?;
    println!("{}", output);
    println!("Done!");

    Ok(())
}

/// Simple argument parser
struct Args {
    host: String,
    port: Option<u16>,
    user: String,
    password: String,
    secret: Option<String>,
    transport: TransportKind,
    rule_set: String,
    timeout: u64,
    set: Option<(String, String)>,
}

impl Args {
    fn parse() -> Self {
        let args: Vec<String> = env::args().collect();
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: None,
            user: env::var("USER").unwrap_or_else(|_| "cisco".to_string()),
            password: String::new(),
            secret: None,
            transport: TransportKind::Telnet,
            rule_set: "2".to_string(),
            timeout: 30,
            set: None,
        };

        let mut i = 1;
        while i < args.len() {
            let value = |offset: usize| args.get(i + offset).cloned().unwrap_or_default();
            match args[i].as_str() {
                "--host" | "-h" => {
                    parsed.host = value(1);
                    i += 1;
                }
                "--port" | "-p" => {
                    parsed.port = value(1).parse().ok();
                    i += 1;
                }
                "--user" | "-u" => {
                    parsed.user = value(1);
                    i += 1;
                }
                "--password" | "-P" => {
                    parsed.password = value(1);
                    i += 1;
                }
                "--secret" | "-s" => {
                    parsed.secret = Some(value(1));
                    i += 1;
                }
                "--ssh" => parsed.transport = TransportKind::Ssh,
                "--rule-set" | "-r" => {
                    parsed.rule_set = value(1);
                    i += 1;
                }
                "--timeout" | "-t" => {
                    parsed.timeout = value(1).parse().unwrap_or(30);
                    i += 1;
                }
                "--set" => {
                    parsed.set = Some((value(1), value(2)));
                    i += 2;
                }
                "--help" => {
                    Self::print_help();
                    std::process::exit(0);
                }
                other => {
                    eprintln!("Unknown argument: {}", other);
                }
            }
            i += 1;
        }

        parsed
    }

    fn print_help() {
        println!(
            r#"vgdivert divert example

USAGE:
    cargo run --example divert -- [OPTIONS]

OPTIONS:
    -h, --host <HOST>          Gateway address [default: localhost]
    -p, --port <PORT>          Port [default: 23, or 22 with --ssh]
    -u, --user <USER>          Username [default: $USER]
    -P, --password <PASS>      Login password
    -s, --secret <SECRET>      Enable secret [default: login password]
        --ssh                  Connect over SSH instead of telnet
    -r, --rule-set <N>         Translation-rule block [default: 2]
    -t, --timeout <SECS>       Timeout [default: 30]
        --set <ID> <DEST>      Point rule ID at a new destination
        --help                 Print this help message"#
        );
    }
}
