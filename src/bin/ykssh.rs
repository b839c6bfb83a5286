use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use tracing::debug;

use ykssh::api::{ConfigMode, SecretSource, SetupRequest};

#[derive(Parser, Debug)]
#[command(name = "ykssh")]
#[command(about = "Set up a YubiKey with SSH keys", version)]
pub struct Cli {
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate SSH keys on a security key and print them in authorized_keys format
    Setup {
        /// Reader name of the security key. Required if several are connected
        #[arg(long)]
        card: Option<String>,

        /// Overwrite any existing keys
        #[arg(long)]
        reset_security_key: bool,

        /// Set the PIN/PUK of the device (6-8 digits). Will be prompted interactively if not provided
        #[arg(long)]
        pin: Option<u64>,

        /// Create two additional keys with touch policies always and never
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        all_touch_policies: bool,
    },

    /// List connected security keys
    List,
}

impl Commands {
    fn setup_request(
        card: Option<String>,
        reset_security_key: bool,
        pin: Option<u64>,
        all_touch_policies: bool,
    ) -> SetupRequest {
        SetupRequest {
            card,
            overwrite: reset_security_key,
            secret: pin.map_or(SecretSource::Interactive, SecretSource::Supplied),
            mode: if all_touch_policies {
                ConfigMode::AllTouchPolicies
            } else {
                ConfigMode::SingleSlot
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout only carries keys, logs go to stderr
    tracing_subscriber::fmt()
        .with_max_level(cli.verbosity)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Setup {
            card,
            reset_security_key,
            pin,
            all_touch_policies,
        } => {
            let request =
                Commands::setup_request(card, reset_security_key, pin, all_touch_policies);
            debug!("Setup request: {:?}", request);

            let configured = ykssh::setup(&request, |identity| println!("{}", identity))
                .context("security key setup failed")?;
            debug!("{} key(s) generated", configured);
        }
        Commands::List => {
            let devices = ykssh::list_devices().context("couldn't list security keys")?;
            for device in devices {
                println!("{}\t{}", device.name, device.serial);
            }
        }
    }

    Ok(())
}
