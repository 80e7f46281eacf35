//! Retry domain binding for tenants stuck in PENDING
//!
//! Runs the bind step once for every PENDING tenant and reports the outcome.
//! Safe to re-run: a domain that is already bound counts as success.
//!
//! Usage:
//!   cargo run --bin resume-pending
//!   cargo run --bin resume-pending -- --dry-run

use std::env;
use std::sync::Arc;

use anyhow::Context;
use subsite_api::{
    config::Config,
    hosting::VercelClient,
    provisioning::ProvisioningWorkflow,
    routing::ReservedNames,
    store,
};
use subsite_shared::TenantStatus;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let dry_run = env::args().skip(1).any(|arg| arg == "--dry-run");

    let config = Config::from_env().context("invalid configuration")?;
    if config.database_url.is_none() {
        eprintln!("Error: DATABASE_URL must be set; in-memory stores have no pending tenants");
        std::process::exit(1);
    }

    let stores = store::connect(&config).await.context("failed to connect")?;
    let pending: Vec<_> = stores
        .tenants
        .list_tenants()
        .await
        .context("failed to list tenants")?
        .into_iter()
        .filter(|tenant| tenant.status == TenantStatus::Pending)
        .collect();

    if pending.is_empty() {
        println!("No pending tenants.");
        return Ok(());
    }

    if dry_run {
        for tenant in &pending {
            println!("{}  {}.{}", tenant.id, tenant.subdomain, config.root_domain);
        }
        println!("\n{} pending tenant(s); dry run, nothing bound.", pending.len());
        return Ok(());
    }

    let hosting = VercelClient::new(&config.hosting, &config.root_domain)
        .context("failed to initialise hosting client")?;
    let workflow = ProvisioningWorkflow::new(
        stores.tenants,
        stores.content,
        Arc::new(hosting),
        ReservedNames::new(&config.reserved_subdomains),
        config.root_domain.clone(),
        config.hosting.timeout,
    );

    let mut failed = 0usize;
    for tenant in &pending {
        match workflow.resume_binding(tenant.id).await {
            Ok(result) => println!("ok      {}  {}", tenant.subdomain, result.url),
            Err(e) => {
                failed += 1;
                println!("failed  {}  {}", tenant.subdomain, e);
            }
        }
    }

    println!(
        "\n{} bound, {} still pending.",
        pending.len() - failed,
        failed
    );

    if failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}
