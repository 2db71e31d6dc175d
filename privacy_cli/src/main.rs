use std::sync::Arc;

use clap::{Parser, Subcommand};

use privacy_client::{Client, FileKeyStore, ReadMessagesOptions, SearchQuery};
use privacy_core::channel::MessageContent;
use privacy_core::identity::{Profile, ProfileUpdate};
use privacy_core::error::BoxError;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the privacy_server deployment.
    #[arg(short, long, env = "PRIVACY_ENDPOINT", default_value = "http://127.0.0.1:8787")]
    endpoint: String,

    /// Path to the local credentials file holding this agent's private keys.
    #[arg(short, long, env = "PRIVACY_CREDENTIALS_PATH", default_value = "privacy-credentials.json")]
    credentials: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new agent identity and persist its keys locally.
    Register {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long, value_delimiter = ',')]
        capabilities: Vec<String>,
    },

    /// Print the DID of the locally stored identity, if any.
    Whoami,

    /// Forget the locally stored identity.
    Logout,

    /// Search the agent directory.
    Search {
        #[arg(long, value_delimiter = ',')]
        capabilities: Vec<String>,
        #[arg(long)]
        min_reputation: Option<u8>,
        #[arg(long)]
        nft_contract: Option<String>,
        #[arg(long)]
        nft_schema: Option<String>,
    },

    /// Update this agent's own profile.
    UpdateProfile {
        #[arg(long)]
        display_name: Option<String>,
        #[arg(long, value_delimiter = ',')]
        capabilities: Option<Vec<String>>,
    },

    /// Attach a verified-credential claim to this agent.
    AddCredential {
        #[arg(long)]
        contract: String,
        #[arg(long)]
        asset_id: String,
        #[arg(long)]
        schema: Option<String>,
    },

    /// Create a channel and invite one or more agents into it.
    CreateChannel {
        #[arg(long, value_delimiter = ',')]
        invite: Vec<String>,
        #[arg(long)]
        name: Option<String>,
    },

    /// List channels this agent participates in.
    Channels,

    /// Join an open-access channel.
    Join { channel_id: String },

    /// Leave a channel.
    Leave { channel_id: String },

    /// List this agent's pending invitations.
    Invitations,

    /// Accept an invitation, unwrapping and caching its channel key.
    Accept { invitation_id: String },

    /// Reject an invitation.
    Reject { invitation_id: String },

    /// Send a text message into a channel.
    Send {
        channel_id: String,
        text: String,
    },

    /// Fetch and decrypt messages from a channel.
    Read {
        channel_id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let key_store = Arc::new(FileKeyStore::new(cli.credentials.clone()));
    let client = Client::new(cli.endpoint.clone(), key_store)?;

    match cli.command {
        Commands::Register { display_name, capabilities } => {
            let profile = Profile { display_name, capabilities, metadata: None };
            let agent = client.register(profile).await?;
            println!("registered {}", agent.did);
        }

        Commands::Whoami => match client.did().await {
            Some(did) => println!("{did}"),
            None => println!("no identity stored at {}", cli.credentials),
        },

        Commands::Logout => {
            client.logout().await?;
            println!("credentials cleared");
        }

        Commands::Search { capabilities, min_reputation, nft_contract, nft_schema } => {
            let query = SearchQuery { capabilities, min_reputation, nft_contract, nft_schema };
            for agent in client.search(query).await? {
                println!("{}\treputation {}", agent.did, agent.reputation);
            }
        }

        Commands::UpdateProfile { display_name, capabilities } => {
            let update = ProfileUpdate { display_name, capabilities, metadata: None };
            let agent = client.update_profile(update).await?;
            println!("{}", serde_json::to_string_pretty(&agent)?);
        }

        Commands::AddCredential { contract, asset_id, schema } => {
            let agent = client.add_credential(contract, asset_id, schema).await?;
            println!("{}", serde_json::to_string_pretty(&agent)?);
        }

        Commands::CreateChannel { invite, name } => {
            let metadata = name.map(|name| privacy_core::channel::ChannelMetadata {
                name: Some(name),
                ..Default::default()
            });
            let (channel, invitations) = client.create_channel(&invite, None, metadata).await?;
            println!("created channel {}", channel.id);
            for invitation in invitations {
                println!("  invited {} ({})", invitation.invitee, invitation.id);
            }
        }

        Commands::Channels => {
            for channel in client.list_channels().await? {
                println!("{}\t{} participant(s)", channel.id, channel.participants.len());
            }
        }

        Commands::Join { channel_id } => {
            client.join_channel(&channel_id).await?;
            println!("joined {channel_id}");
        }

        Commands::Leave { channel_id } => {
            client.leave_channel(&channel_id).await?;
            println!("left {channel_id}");
        }

        Commands::Invitations => {
            for invitation in client.list_invitations().await? {
                println!("{}\tchannel {}\tfrom {}", invitation.id, invitation.channel_id, invitation.inviter);
            }
        }

        Commands::Accept { invitation_id } => {
            let invitation = client.accept_invitation(&invitation_id).await?;
            println!("joined channel {}", invitation.channel_id);
        }

        Commands::Reject { invitation_id } => {
            client.reject_invitation(&invitation_id).await?;
            println!("rejected {invitation_id}");
        }

        Commands::Send { channel_id, text } => {
            let message = client
                .send_message(&channel_id, &MessageContent::Text { text })
                .await?;
            println!("sent {}", message.id);
        }

        Commands::Read { channel_id, limit } => {
            let options = ReadMessagesOptions { limit, before: None, after: None };
            for decrypted in client.read_messages(&channel_id, options).await? {
                match decrypted.content {
                    MessageContent::Text { text } => {
                        println!("[{}] {}: {}", decrypted.envelope.timestamp, decrypted.envelope.sender, text)
                    }
                    other => println!(
                        "[{}] {}: {:?}",
                        decrypted.envelope.timestamp, decrypted.envelope.sender, other
                    ),
                }
            }
        }
    }

    Ok(())
}
