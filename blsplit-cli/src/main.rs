use std::{num::NonZeroUsize, path::PathBuf};

use anyhow::{ensure, Context};
use blsplit::{
    ciphersuite::{MinPk, MinSig},
    signing,
    trusted_dealer::{DealerBuilder, Split, SubsetSelection},
    wallet, Ciphersuite, Identifier, KeyShare, SecretScalar, VerificationVector,
};
use clap::{Parser, Subcommand, ValueEnum};
use rand_core::OsRng;
use zeroize::Zeroizing;

mod config;
mod store;

use config::FileConfig;
use store::FsStore;

#[derive(Parser)]
#[command(name = "blsplit")]
#[command(about = "Splits a BLS master key into threshold key shares held in participants' wallets")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, default_value = "./config.json")]
    config: PathBuf,

    #[arg(long, global = true, value_enum, default_value_t = Suite::MinPk)]
    ciphersuite: Suite,

    /// Message signed while validating the split
    #[arg(long, global = true, default_value = "abc")]
    message: String,

    /// Number of random subsets of `t` participants to recover from. By default, every subset is
    /// checked when there are at most 64 of them.
    #[arg(long, global = true)]
    subsets: Option<NonZeroUsize>,
}

#[derive(Subcommand)]
enum Commands {
    /// Split the master key and import the key shares into participants' wallets
    Split {
        /// Master private key, 64 hex characters
        #[arg(long, env = "MASTER_PRIVATE_KEY", hide_env_values = true)]
        master_private_key: String,
    },
    /// Load key shares back from the wallets and check that they recover the master key
    Check {
        /// Name of the account, required if wallets hold more than one
        #[arg(long)]
        account: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Suite {
    /// Public keys in G1, signatures in G2
    MinPk,
    /// Public keys in G2, signatures in G1
    MinSig,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blsplit=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = FileConfig::load(&cli.config)?;
    let selection = match cli.subsets {
        Some(count) => SubsetSelection::Random(count),
        None => SubsetSelection::Auto,
    };
    let msg = cli.message.as_bytes();

    match cli.command {
        Commands::Split { master_private_key } => {
            let master_private_key = Zeroizing::new(master_private_key);
            match cli.ciphersuite {
                Suite::MinPk => split::<MinPk>(&config, &master_private_key, msg, selection),
                Suite::MinSig => split::<MinSig>(&config, &master_private_key, msg, selection),
            }
        }
        Commands::Check { account } => match cli.ciphersuite {
            Suite::MinPk => check::<MinPk>(&config, account.as_deref(), msg, selection),
            Suite::MinSig => check::<MinSig>(&config, account.as_deref(), msg, selection),
        },
    }
}

fn split<C: Ciphersuite>(
    config: &FileConfig,
    master_private_key: &str,
    msg: &[u8],
    selection: SubsetSelection,
) -> anyhow::Result<()> {
    let master_secret = parse_master_secret::<C>(master_private_key)?;
    let master_public_key = C::public_key(&master_secret);
    let master_sig = signing::sign_with_secret::<C>(&master_secret, msg);
    ensure!(
        signing::verify::<C>(&master_sig, &master_public_key, msg),
        "signature of the master key doesn't verify"
    );
    tracing::info!(
        ciphersuite = C::NAME,
        master_public_key = %hex::encode(C::serialize_public_key(&master_public_key)),
        "master key self-check passed"
    );

    let mut rng = OsRng;
    let split = DealerBuilder::<C>::from_config(&config.dealer_config())
        .set_master_secret(master_secret)
        .split(&mut rng)
        .context("split master key")?
        .validate(msg, selection, &mut rng)
        .context("validate split")?;

    let store = FsStore::new(&config.output_dir, &config.wallet_name, C::NAME);
    let accounts = wallet::provision(&split, &config.participants, |participant| {
        store.open(participant)
    })
    .context("provision wallets")?;

    for path in &accounts {
        tracing::debug!(path = %path.display(), "account written");
    }
    tracing::info!(
        account = %split.account_name(),
        output_dir = %config.output_dir.display(),
        "wallets provisioned"
    );
    Ok(())
}

fn check<C: Ciphersuite>(
    config: &FileConfig,
    account: Option<&str>,
    msg: &[u8],
    selection: SubsetSelection,
) -> anyhow::Result<()> {
    let store = FsStore::new(&config.output_dir, &config.wallet_name, C::NAME);

    let mut verification_vector: Option<VerificationVector<C>> = None;
    let mut key_shares = Vec::with_capacity(config.participants.len());
    for participant in &config.participants {
        let stored = store
            .load_account(participant.id, account)
            .with_context(|| format!("load account of participant {}", participant.id))?;
        ensure!(
            stored.ciphersuite == C::NAME,
            "account of participant {} uses ciphersuite {}",
            participant.id,
            stored.ciphersuite
        );
        ensure!(
            stored.participant == participant.id,
            "wallet of participant {} holds account of participant {}",
            participant.id,
            stored.participant
        );

        let vv = VerificationVector::<C>::from_bytes(&stored.verification_vector_bytes()?)
            .with_context(|| format!("verification vector of participant {}", participant.id))?;
        ensure!(
            u32::from(vv.threshold()) == stored.threshold,
            "threshold of participant {} doesn't match its verification vector",
            participant.id
        );
        match &verification_vector {
            None => verification_vector = Some(vv),
            Some(expected) => ensure!(
                *expected == vv,
                "verification vector of participant {} differs from others",
                participant.id
            ),
        }

        let secret = C::deserialize_secret_scalar(&stored.secret_share_bytes()?)
            .with_context(|| format!("secret share of participant {}", participant.id))?;
        let id = Identifier::new(participant.id)?;
        key_shares.push(KeyShare {
            id,
            public: C::public_key(&secret),
            secret,
        });
    }

    let verification_vector = verification_vector.context("no participants")?;
    ensure!(
        verification_vector.threshold() == config.threshold,
        "stored threshold {} differs from configured {}",
        verification_vector.threshold(),
        config.threshold
    );

    let split = Split::from_parts(verification_vector, key_shares)?
        .validate(msg, selection, &mut OsRng)
        .context("stored key shares don't recover the master key")?;

    tracing::info!(
        account = %split.account_name(),
        master_public_key = %hex::encode(C::serialize_public_key(&split.master_public_key())),
        "stored key shares are valid"
    );
    Ok(())
}

fn parse_master_secret<C: Ciphersuite>(encoded: &str) -> anyhow::Result<SecretScalar> {
    let encoded = encoded.trim();
    ensure!(
        encoded.len() == 64,
        "master private key must be exactly 64 hex characters, got {}",
        encoded.len()
    );
    let mut bytes = Zeroizing::new([0u8; 32]);
    hex::decode_to_slice(encoded, bytes.as_mut_slice())
        .context("master private key is not valid hex")?;
    C::deserialize_secret_scalar(bytes.as_slice())
        .context("master private key is not a canonical scalar")
}
