use anyhow::Error;
use clap::Parser;
use dns_lib::{CloudflareProvider, DdnsError, DnsProvider, local_ip};
use log::info;

/// Update a Cloudflare DNS record with the local LAN IP address
#[derive(Parser, Debug)]
#[command(name = "lan-ddns", version)]
struct Args {
    /// Cloudflare API token
    #[arg(short = 't', long, env = "CF_API_TOKEN")]
    token: Option<String>,

    /// Top-level domain name (Zone name), e.g. 'example.com'
    #[arg(short = 'd', long, env = "CF_ZONE_NAME")]
    domain: Option<String>,

    /// Subdomain name (Record name), e.g. 'home' for 'home.example.com'
    #[arg(short = 's', long, env = "CF_RECORD_NAME")]
    subdomain: Option<String>,

    /// Look for IP within a subnet, e.g. '192.168.1.0/24'
    #[arg(long, env = "IP_SUBNET")]
    subnet: Option<String>,
}

/// 每次运行只做一轮同步，周期执行交给外部的定时器
fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    // 必填项在发起任何网络请求之前校验
    let token = args
        .token
        .ok_or_else(|| DdnsError::Config("token is required".to_string()))?;
    let domain = args
        .domain
        .ok_or_else(|| DdnsError::Config("top level domain is required".to_string()))?;
    let subdomain = args.subdomain.unwrap_or_else(|| "*".to_string());

    let ip = local_ip(args.subnet.as_deref())?;
    println!("local IP address: {ip}");

    let provider = CloudflareProvider::connect(token, &domain, &subdomain)?;
    let outcome = provider.ensure_record(&ip.to_string())?;
    info!("reconcile finished: {outcome}");
    println!("DNS record {outcome}");
    Ok(())
}
