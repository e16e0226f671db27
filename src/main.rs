use clap::{Parser, Subcommand};
use error_chain::ChainedError;
use kube::{Client, CustomResourceExt};
use log::info;
use provider_zpa::apis::{
    application_segment::ApplicationSegment, provider_config::ProviderConfig,
    segment_group::SegmentGroup,
};
use provider_zpa::controller::{application_segment, segment_group};
use provider_zpa::errors::*;
use provider_zpa::manager::{Manager, Settings};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "provider-zpa", about = "Reconciles ZPA application segments and segment groups")]
struct Cli {
    /// Seconds between observations of a healthy resource.
    #[arg(long, env = "ZPA_POLL_INTERVAL", default_value_t = 60, global = true)]
    poll_interval: u64,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the controllers against the current cluster (default).
    Run,
    /// Print the CustomResourceDefinitions as YAML.
    Crdgen,
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let res = match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            run(Settings {
                poll_interval: Duration::from_secs(cli.poll_interval),
            })
            .await
        }
        Command::Crdgen => crdgen(),
    };

    if let Err(e) = res {
        eprintln!("{}", e.display_chain());
        std::process::exit(1);
    }
}

fn crdgen() -> Result<()> {
    for crd in [
        ApplicationSegment::crd(),
        SegmentGroup::crd(),
        ProviderConfig::crd(),
    ] {
        print!("---\n{}", serde_yaml::to_string(&crd)?);
    }
    Ok(())
}

async fn run(settings: Settings) -> Result<()> {
    // Read the environment to find config for kube client.
    // Note that this tries an in-cluster configuration first,
    // then falls back on a kubeconfig file.
    let client = Client::try_default().await?;

    let (apps, apps_drainer) = Manager::new::<ApplicationSegment, _>(
        client.clone(),
        application_segment::Connector::new(client.clone()),
        settings.clone(),
    )
    .await?;
    let (groups, groups_drainer) = Manager::new::<SegmentGroup, _>(
        client.clone(),
        segment_group::Connector::new(client),
        settings,
    )
    .await?;

    info!("controllers started");
    tokio::select! {
        _ = futures::future::join(apps_drainer, groups_drainer) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("shutting down");
            apps.shutdown();
            groups.shutdown();
        }
    }

    Ok(())
}
